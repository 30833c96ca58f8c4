//! The per-request input store.
//!
//! [`InputStore`] builds the query, body and file trees once from an
//! [`InputSource`] and answers every lookup from them afterwards.
//!
//! # Example
//! ```
//! use bytes::Bytes;
//! use http::Request;
//! use micro_input::{Channel, HttpInputSource, InputStore};
//!
//! let request = Request::put("/users/7?notify=1")
//!     .body(Bytes::from_static(b"name=+Zava+&email="))
//!     .unwrap();
//! let input = InputStore::new(&HttpInputSource::from(request)).unwrap();
//!
//! assert_eq!(input.text("name"), Some("Zava"));
//! assert_eq!(input.text_or("email", "none"), "none");
//! assert!(input.exists("email"));
//! assert!(input.resolve_in("notify", &[Channel::Body]).is_none());
//! ```

use crate::builder::{build_file_tree, build_tree};
use crate::raw::RawParams;
use crate::{InputConfig, InputError, InputFile, InputNode, InputSource, InputTree};
use bytes::Bytes;
use http::Method;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Where an input was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Query,
    Body,
    File,
}

impl Channel {
    /// All channels in probe order.
    pub const ALL: [Channel; 3] = [Channel::Query, Channel::Body, Channel::File];
}

/// A resolved input with blank scalars filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputValue<'a> {
    /// The trimmed value of a non-blank scalar.
    Text(&'a str),
    /// A sub-tree or uploaded files, passed through unchanged.
    Node(&'a InputNode),
}

impl<'a> InputValue<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            InputValue::Text(text) => Some(text),
            InputValue::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&'a InputNode> {
        match *self {
            InputValue::Node(node) => Some(node),
            InputValue::Text(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&'a InputFile> {
        self.as_node()?.as_file()
    }
}

#[derive(Debug, Clone)]
pub struct InputStore {
    method: Method,
    raw_body: Bytes,
    raw_query: RawParams,
    raw_form: RawParams,
    json_body: bool,
    query: InputTree,
    body: InputTree,
    files: InputTree,
}

impl InputStore {
    /// Builds the store with the default [`InputConfig`].
    ///
    /// # Errors
    ///
    /// See [`InputStore::with_config`].
    pub fn new<S: InputSource + ?Sized>(source: &S) -> Result<Self, InputError> {
        Self::with_config(source, &InputConfig::default())
    }

    /// Reads the raw inputs from `source` once and builds the three trees.
    ///
    /// The raw body is read a single time and kept for [`InputStore::all`].
    /// When the runtime parsed no body and the method is one of the configured
    /// form body methods, the raw body is form-decoded here.
    ///
    /// # Errors
    ///
    /// Fails only when the upload metadata collections do not share one shape,
    /// see [`build_file_tree`].
    pub fn with_config<S: InputSource + ?Sized>(source: &S, config: &InputConfig) -> Result<Self, InputError> {
        let method = source.method();
        let raw_body = source.raw_body();
        let raw_query = source.query();

        let mut raw_form = source.body();
        if raw_form.is_empty() && config.is_form_body_method(&method) && !raw_body.is_empty() {
            raw_form = RawParams::from_urlencoded_with_depth(&String::from_utf8_lossy(&raw_body), config.max_depth());
        }

        let files = build_file_tree(&source.files())?;
        let query = build_tree(&raw_query);
        let body = build_tree(&raw_form);

        debug!(
            method = %method,
            query = query.len(),
            body = body.len(),
            files = files.len(),
            "built request input trees"
        );

        Ok(Self { json_body: config.is_json_body_method(&method), method, raw_body, raw_query, raw_form, query, body, files })
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request payload as it was read from the request.
    #[inline]
    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    pub fn query(&self) -> &InputTree {
        &self.query
    }

    pub fn body(&self) -> &InputTree {
        &self.body
    }

    pub fn files(&self) -> &InputTree {
        &self.files
    }

    pub fn find_query(&self, key: &str) -> Option<&InputNode> {
        self.query.get(key)
    }

    pub fn find_body(&self, key: &str) -> Option<&InputNode> {
        self.body.get(key)
    }

    pub fn find_file(&self, key: &str) -> Option<&InputNode> {
        self.files.get(key)
    }

    pub fn find(&self, channel: Channel, key: &str) -> Option<&InputNode> {
        match channel {
            Channel::Query => self.find_query(key),
            Channel::Body => self.find_body(key),
            Channel::File => self.find_file(key),
        }
    }

    /// The first node present under `key`, probing query, body, then files.
    ///
    /// A present node may hold an empty value.
    pub fn resolve(&self, key: &str) -> Option<&InputNode> {
        self.resolve_in(key, &Channel::ALL)
    }

    /// Like [`InputStore::resolve`] restricted to `channels`.
    ///
    /// The probe order stays query, body, files whatever order `channels` lists.
    pub fn resolve_in(&self, key: &str, channels: &[Channel]) -> Option<&InputNode> {
        Channel::ALL
            .into_iter()
            .filter(|channel| channels.contains(channel))
            .find_map(|channel| self.find(channel, key))
    }

    /// Resolves `key`, treating blank scalars as absent.
    ///
    /// Scalars come back trimmed, sub-trees and files unchanged.
    pub fn value(&self, key: &str) -> Option<InputValue<'_>> {
        self.value_in(key, &Channel::ALL)
    }

    pub fn value_in(&self, key: &str, channels: &[Channel]) -> Option<InputValue<'_>> {
        match self.resolve_in(key, channels)? {
            InputNode::Item(item) if item.is_blank() => None,
            InputNode::Item(item) => Some(InputValue::Text(item.trimmed())),
            node => Some(InputValue::Node(node)),
        }
    }

    /// The trimmed text of a non-blank scalar under `key`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.value(key)?.as_text()
    }

    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.text(key).unwrap_or(default)
    }

    /// True when any channel holds a node under `key`, blank scalars included.
    pub fn exists(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    /// Query and body merged into one flat mapping, query values win.
    ///
    /// For the configured JSON body methods a payload starting with `{` is
    /// decoded as a JSON object and replaces the form body. A payload that
    /// fails to decode counts as an empty body.
    pub fn all(&self) -> Map<String, Value> {
        let mut output = self.body_map();
        output.extend(self.raw_query.to_json());
        output
    }

    /// [`InputStore::all`] restricted to `keys`.
    pub fn only<S: AsRef<str>>(&self, keys: &[S]) -> Map<String, Value> {
        self.all().into_iter().filter(|(key, _)| keys.iter().any(|k| k.as_ref() == key.as_str())).collect()
    }

    fn body_map(&self) -> Map<String, Value> {
        if self.json_body {
            let payload = String::from_utf8_lossy(&self.raw_body);
            let payload = payload.trim();
            if payload.starts_with('{') {
                return serde_json::from_str::<Map<String, Value>>(payload).unwrap_or_else(|e| {
                    warn!(cause = %e, "can't decode json body, using empty body");
                    Map::new()
                });
            }
        }
        self.raw_form.to_json()
    }
}
