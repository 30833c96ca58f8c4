//! The request side of input reconstruction.
//!
//! An [`InputSource`] hands over one request's raw inputs. [`HttpInputSource`]
//! adapts an `http::Request<Bytes>` whose body was already read in full.

use crate::raw::RawParams;
use crate::{InputConfig, RawFiles};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, Request};
use mime::Mime;

/// Raw inputs of one request.
///
/// [`InputStore`](crate::InputStore) calls every method at most once while it
/// is built, so implementations may hand out their data by value.
#[cfg_attr(test, mockall::automock)]
pub trait InputSource {
    fn method(&self) -> Method;

    /// The decoded query string.
    fn query(&self) -> RawParams;

    /// The body as parsed by the runtime, empty when it parsed none.
    fn body(&self) -> RawParams;

    /// The materialized request payload.
    fn raw_body(&self) -> Bytes;

    fn files(&self) -> RawFiles;
}

/// An [`InputSource`] over a buffered `http` request.
///
/// The query string is always decoded, the body only when it is sent as
/// `application/x-www-form-urlencoded`. Multipart payloads are left to the
/// runtime, which attaches the resulting upload metadata with [`HttpInputSource::with_files`].
#[derive(Debug, Clone)]
pub struct HttpInputSource {
    method: Method,
    query: RawParams,
    body: RawParams,
    raw_body: Bytes,
    files: RawFiles,
}

impl HttpInputSource {
    pub fn new(request: Request<Bytes>, config: &InputConfig) -> Self {
        let (parts, raw_body) = request.into_parts();

        let query = parts
            .uri
            .query()
            .map(|query| RawParams::from_urlencoded_with_depth(query, config.max_depth()))
            .unwrap_or_default();

        let body = if is_form_urlencoded(&parts.headers) {
            RawParams::from_urlencoded_with_depth(&String::from_utf8_lossy(&raw_body), config.max_depth())
        } else {
            RawParams::new()
        };

        Self { method: parts.method, query, body, raw_body, files: RawFiles::new() }
    }

    pub fn with_files(mut self, files: RawFiles) -> Self {
        self.files = files;
        self
    }
}

impl From<Request<Bytes>> for HttpInputSource {
    fn from(request: Request<Bytes>) -> Self {
        Self::new(request, &InputConfig::default())
    }
}

impl InputSource for HttpInputSource {
    fn method(&self) -> Method {
        self.method.clone()
    }

    fn query(&self) -> RawParams {
        self.query.clone()
    }

    fn body(&self) -> RawParams {
        self.body.clone()
    }

    fn raw_body(&self) -> Bytes {
        self.raw_body.clone()
    }

    fn files(&self) -> RawFiles {
        self.files.clone()
    }
}

fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok())
        .is_some_and(|mime| mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UploadedFile;
    use crate::raw::RawValue;

    fn request(method: Method, uri: &str, content_type: Option<&str>, body: &'static str) -> Request<Bytes> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Bytes::from_static(body.as_bytes())).unwrap()
    }

    #[test]
    fn query_and_form_body() {
        let source = HttpInputSource::from(request(
            Method::POST,
            "/users?page=2&sort[by]=name",
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            "name=Zava&tags[]=rust",
        ));

        assert_eq!(source.method(), Method::POST);
        assert_eq!(source.query().lookup(&["sort", "by"]).and_then(RawValue::as_scalar), Some("name"));
        assert_eq!(source.body().lookup(&["tags", "0"]).and_then(RawValue::as_scalar), Some("rust"));
        assert_eq!(source.raw_body(), Bytes::from_static(b"name=Zava&tags[]=rust"));
    }

    #[test]
    fn other_content_types_leave_body_unparsed() {
        let source = HttpInputSource::from(request(Method::POST, "/users", Some("application/json"), r#"{"name":"Zava"}"#));

        assert!(source.query().is_empty());
        assert!(source.body().is_empty());
        assert_eq!(source.raw_body(), Bytes::from_static(br#"{"name":"Zava"}"#));

        let source = HttpInputSource::from(request(Method::PUT, "/users", None, "name=Zava"));
        assert!(source.body().is_empty());
    }

    #[test]
    fn configured_depth_applies_to_query() {
        let config = InputConfig::builder().max_depth(1).build();
        let source = HttpInputSource::new(request(Method::GET, "/?a[b][c]=1&d[e]=2", None, ""), &config);

        assert!(!source.query().contains_key("a"));
        assert!(source.query().contains_key("d"));
    }

    #[test]
    fn attached_files() {
        let mut files = RawFiles::new();
        files.insert("avatar", UploadedFile::new("me.png", "/tmp/1"));

        let source = HttpInputSource::from(request(Method::POST, "/", Some("multipart/form-data; boundary=x"), ""))
            .with_files(files.clone());

        assert!(source.body().is_empty());
        assert_eq!(source.files(), files);
    }
}
