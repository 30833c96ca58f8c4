use crate::raw::{DEFAULT_MAX_DEPTH, RawParams, RawValue, normalize_base};

/// Upload metadata as parallel collections, one per metadata field.
///
/// All five collections are keyed identically by form field: `name[avatar]`
/// holds the client file name of the `avatar` upload, `size[avatar]` its size
/// and so on. Multi-file fields nest the same way in every collection, e.g.
/// `name[photo][0]`, `name[photo][1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFiles {
    name: RawParams,
    mime_type: RawParams,
    size: RawParams,
    tmp_path: RawParams,
    error: RawParams,
}

/// The metadata of one upload as a multipart parser produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    filename: String,
    mime_type: String,
    size: Option<u64>,
    tmp_path: String,
    error_code: i32,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, tmp_path: impl Into<String>) -> Self {
        Self { filename: filename.into(), mime_type: String::new(), size: None, tmp_path: tmp_path.into(), error_code: 0 }
    }

    /// An upload the transport rejected, only the error code is known.
    pub fn failed(error_code: i32) -> Self {
        Self { filename: String::new(), mime_type: String::new(), size: None, tmp_path: String::new(), error_code }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_error_code(mut self, error_code: i32) -> Self {
        self.error_code = error_code;
        self
    }
}

impl RawFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles the collections handed over by the server runtime.
    ///
    /// The collections must share one key shape, [`build_file_tree`](crate::builder::build_file_tree)
    /// reports any path missing from one of them.
    pub fn from_parts(name: RawParams, mime_type: RawParams, size: RawParams, tmp_path: RawParams, error: RawParams) -> Self {
        Self { name, mime_type, size, tmp_path, error }
    }

    /// Records one upload under a bracket-encoded field key such as `photo[]`.
    ///
    /// Returns `false` when the key is dropped, see [`RawParams::insert_encoded`].
    pub fn insert(&mut self, key: &str, file: UploadedFile) -> bool {
        self.insert_with_depth(key, file, DEFAULT_MAX_DEPTH)
    }

    pub fn insert_with_depth(&mut self, key: &str, file: UploadedFile, max_depth: usize) -> bool {
        // append segments resolve against the name collection, the others follow its keys
        let key = self.resolve_append_segments(key);

        self.name.insert_encoded(&key, file.filename, max_depth)
            && self.mime_type.insert_encoded(&key, file.mime_type, max_depth)
            && self.size.insert_encoded(&key, file.size.map(|size| size.to_string()).unwrap_or_default(), max_depth)
            && self.tmp_path.insert_encoded(&key, file.tmp_path, max_depth)
            && self.error.insert_encoded(&key, file.error_code.to_string(), max_depth)
    }

    #[inline]
    pub fn name(&self) -> &RawParams {
        &self.name
    }

    #[inline]
    pub fn mime_type(&self) -> &RawParams {
        &self.mime_type
    }

    #[inline]
    pub fn size(&self) -> &RawParams {
        &self.size
    }

    #[inline]
    pub fn tmp_path(&self) -> &RawParams {
        &self.tmp_path
    }

    #[inline]
    pub fn error(&self) -> &RawParams {
        &self.error
    }

    /// True when no upload field was submitted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Rewrites every `[]` in `key` to the concrete index the name collection assigns.
    fn resolve_append_segments(&self, key: &str) -> String {
        let Some(open) = key.find('[') else {
            return key.to_owned();
        };

        let mut resolved = key[..open].to_owned();
        let mut level = self.name.get(&normalize_base(resolved.trim_start_matches(' '))).and_then(RawValue::as_map);
        let mut rest = &key[open..];

        while let Some(stripped) = rest.strip_prefix('[') {
            let Some(close) = stripped.find(']') else {
                break;
            };
            let segment = if close == 0 {
                level.map_or(0, RawParams::next_index).to_string()
            } else {
                stripped[..close].to_owned()
            };
            level = level.and_then(|params| params.get(&segment)).and_then(RawValue::as_map);
            resolved.push('[');
            resolved.push_str(&segment);
            resolved.push(']');
            rest = &stripped[close + 1..];
        }

        resolved.push_str(rest);
        resolved
    }
}
