use crate::UploadError;
use std::path::Path;

/// Metadata of one uploaded file.
///
/// Only a reference to the temporary storage is kept, the file content is owned
/// by the server runtime and never opened here. The error code is always set,
/// even for failed uploads whose other fields may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputFile {
    index: String,
    error_code: i32,
    tmp_path: Option<String>,
    mime_type: Option<String>,
    size: Option<u64>,
    filename: Option<String>,
}

impl InputFile {
    pub fn new(index: impl Into<String>, error_code: i32) -> Self {
        Self { index: index.into(), error_code, tmp_path: None, mime_type: None, size: None, filename: None }
    }

    pub fn with_tmp_path(mut self, tmp_path: impl Into<String>) -> Self {
        self.tmp_path = Some(tmp_path.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// The key of this file within its parent level, e.g. `avatar` or `0`.
    #[inline]
    pub fn index(&self) -> &str {
        &self.index
    }

    #[inline]
    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    #[inline]
    pub fn has_error(&self) -> bool {
        self.error_code != 0
    }

    pub fn upload_error(&self) -> Option<UploadError> {
        UploadError::from_code(self.error_code)
    }

    /// Location of the uploaded content in the runtime's temporary storage.
    pub fn tmp_path(&self) -> Option<&Path> {
        self.tmp_path.as_deref().map(Path::new)
    }

    /// The mime type declared by the client, not verified against the content.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// The file name on the client side.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Lower-cased extension of the client file name.
    pub fn extension(&self) -> Option<String> {
        let filename = self.filename.as_deref()?;
        Path::new(filename).extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase)
    }
}
