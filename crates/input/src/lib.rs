//! Request input trees for the micro web framework
//!
//! Query strings, form bodies and file uploads reach a server as flat,
//! bracket-keyed collections: `user[address][city]=Berlin`, or one collection
//! per upload metadata field (`name`, `type`, `size`, `tmp_path`, `error`)
//! that only line up by position. This crate rebuilds them into typed trees
//! and offers one lookup API over all of them.
//!
//! # Components
//!
//! - [`InputItem`] and [`InputFile`]: immutable leaves for scalars and uploads
//! - [`InputTree`] / [`InputNode`]: the reconstructed trees
//! - [`builder`]: the tree builders for scalar collections and parallel upload collections
//! - [`InputSource`]: the raw inputs of one request, [`HttpInputSource`] adapts `http::Request<Bytes>`
//! - [`InputStore`]: builds the query, body and file trees once per request and answers lookups
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use http::Request;
//! use micro_input::{HttpInputSource, InputNode, InputStore, RawFiles, UploadedFile};
//!
//! let request = Request::post("/profile?tab=photos")
//!     .header("content-type", "application/x-www-form-urlencoded")
//!     .body(Bytes::from_static(b"user[name]=Zava&user[tags][]=rust"))
//!     .unwrap();
//!
//! let mut files = RawFiles::new();
//! files.insert("photo[]", UploadedFile::new("a.png", "/tmp/upload-a").with_size(512));
//! files.insert("photo[]", UploadedFile::new("b.png", "/tmp/upload-b").with_size(1024));
//!
//! let input = InputStore::new(&HttpInputSource::from(request).with_files(files)).unwrap();
//!
//! assert_eq!(input.text("tab"), Some("photos"));
//! assert!(input.find_body("user").and_then(InputNode::as_tree).is_some());
//! assert_eq!(input.find_file("photo").and_then(InputNode::as_files).map(<[_]>::len), Some(2));
//! ```
//!
//! # Errors
//!
//! Client input never fails: missing keys, blank values and undecodable
//! bodies degrade to absent values. Only upload metadata collections that do
//! not share one shape are rejected with an [`InputError`].

pub mod builder;

mod config;
mod error;
mod file;
mod item;
mod raw;
mod source;
mod store;
mod tree;
mod upload;

pub use config::InputConfig;
pub use config::InputConfigBuilder;
pub use error::InputError;
pub use error::UploadError;
pub use file::InputFile;
pub use item::InputItem;
pub use raw::DEFAULT_MAX_DEPTH;
pub use raw::Iter as RawIter;
pub use raw::RawParams;
pub use raw::RawValue;
pub use source::HttpInputSource;
pub use source::InputSource;
pub use store::Channel;
pub use store::InputStore;
pub use store::InputValue;
pub use tree::InputNode;
pub use tree::InputTree;
pub use upload::RawFiles;
pub use upload::UploadedFile;
