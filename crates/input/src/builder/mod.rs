//! Rebuilds typed input trees from raw request collections.
//!
//! - [`build_tree`] turns a query or form body [`RawParams`](crate::RawParams)
//!   into an [`InputTree`](crate::InputTree) of [`InputItem`](crate::InputItem)s
//! - [`build_file_tree`] zips the parallel upload collections of
//!   [`RawFiles`](crate::RawFiles) into [`InputFile`](crate::InputFile)s

mod file_tree;
mod tree;

pub use file_tree::build_file_tree;
pub use tree::build_tree;
