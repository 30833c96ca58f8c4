//! Input decoding configuration.
//!
//! ```
//! use http::Method;
//! use micro_input::InputConfig;
//!
//! let config = InputConfig::builder()
//!     .max_depth(8)
//!     .json_body_methods([Method::POST, Method::PUT])
//!     .build();
//!
//! assert!(config.is_json_body_method(&Method::PUT));
//! ```

use crate::raw::DEFAULT_MAX_DEPTH;
use http::Method;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    max_depth: usize,
    #[serde(with = "method_list")]
    form_body_methods: Vec<Method>,
    #[serde(with = "method_list")]
    json_body_methods: Vec<Method>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            form_body_methods: vec![Method::PUT, Method::PATCH, Method::DELETE],
            json_body_methods: vec![Method::POST],
        }
    }
}

impl InputConfig {
    pub fn builder() -> InputConfigBuilder {
        InputConfigBuilder::new()
    }

    /// Bracket nesting accepted when form-decoding a payload.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Methods whose raw payload is form-decoded when the runtime parsed no body.
    pub fn is_form_body_method(&self, method: &Method) -> bool {
        self.form_body_methods.contains(method)
    }

    /// Methods whose raw payload is probed for a JSON object by [`InputStore::all`](crate::InputStore::all).
    pub fn is_json_body_method(&self, method: &Method) -> bool {
        self.json_body_methods.contains(method)
    }
}

#[derive(Debug)]
pub struct InputConfigBuilder {
    config: InputConfig,
}

impl InputConfigBuilder {
    fn new() -> Self {
        Self { config: InputConfig::default() }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn form_body_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.config.form_body_methods = methods.into_iter().collect();
        self
    }

    pub fn json_body_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.config.json_body_methods = methods.into_iter().collect();
        self
    }

    pub fn build(self) -> InputConfig {
        self.config
    }
}

mod method_list {
    use http::Method;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Method>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|name| Method::from_bytes(name.to_ascii_uppercase().as_bytes()).map_err(D::Error::custom))
            .collect()
    }
}
