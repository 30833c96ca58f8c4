use thiserror::Error;

/// Violated preconditions of the input builders.
///
/// Client data never produces one of these: malformed query strings, bodies or
/// uploads degrade to absent values. These variants mean the server runtime
/// handed over upload metadata that does not line up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("file metadata '{field}' has no entry matching '{path}'")]
    FileShapeMismatch { field: &'static str, path: String },

    #[error("invalid file metadata '{field}' at '{path}': {reason}")]
    InvalidFileMetadata { field: &'static str, path: String, reason: String },
}

impl InputError {
    pub fn file_shape_mismatch<S: ToString>(field: &'static str, path: S) -> Self {
        Self::FileShapeMismatch { field, path: path.to_string() }
    }

    pub fn invalid_file_metadata<P: ToString, R: ToString>(field: &'static str, path: P, reason: R) -> Self {
        Self::InvalidFileMetadata { field, path: path.to_string(), reason: reason.to_string() }
    }
}

/// Transport-level upload failures, as reported by the multipart layer.
///
/// A failed upload is data, not an error of this crate: it is carried on the
/// [`InputFile`](crate::InputFile) and left to validators.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    #[error("the uploaded file exceeds the server size limit")]
    IniSize,
    #[error("the uploaded file exceeds the form size limit")]
    FormSize,
    #[error("the uploaded file was only partially uploaded")]
    Partial,
    #[error("no file was uploaded")]
    NoFile,
    #[error("missing a temporary folder")]
    NoTmpDir,
    #[error("failed to write file to disk")]
    CantWrite,
    #[error("an extension stopped the file upload")]
    Extension,
    #[error("unknown upload error code {0}")]
    Unknown(i32),
}

impl UploadError {
    /// Maps a transport error code, `0` means success and has no error.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(Self::IniSize),
            2 => Some(Self::FormSize),
            3 => Some(Self::Partial),
            4 => Some(Self::NoFile),
            6 => Some(Self::NoTmpDir),
            7 => Some(Self::CantWrite),
            8 => Some(Self::Extension),
            other => Some(Self::Unknown(other)),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::IniSize => 1,
            Self::FormSize => 2,
            Self::Partial => 3,
            Self::NoFile => 4,
            Self::NoTmpDir => 6,
            Self::CantWrite => 7,
            Self::Extension => 8,
            Self::Unknown(code) => code,
        }
    }
}
