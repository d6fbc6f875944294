//! Fehler-Typ der Crate: jeder OpenCL-Statuscode wird zu einem `Result`.

use opencl3::error_codes::CL_DEVICE_NOT_FOUND;

#[derive(thiserror::Error, Debug)]
pub enum ClError {
    #[error("OpenCL API error: {0}")]
    Api(i32),
    #[error("no OpenCL platform available")]
    NoPlatform,
    #[error("no {kind} device found on platform {platform}")]
    NoDevice { kind: String, platform: String },
    #[error("program build failed:\n{0}")]
    Build(String),
    #[error("Invalid buffer size: {0}")]
    InvalidSize(usize),
    #[error("length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("trace output failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ClError {
    /// Roher OpenCL-Statuscode, falls der Fehler vom Treiber kommt
    pub fn code(&self) -> Option<i32> {
        match self {
            ClError::Api(code) => Some(*code),
            _ => None,
        }
    }

    /// `true` wenn der Treiber keine passenden Geräte gemeldet hat
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, ClError::Api(code) if *code == CL_DEVICE_NOT_FOUND)
            || matches!(self, ClError::NoDevice { .. } | ClError::NoPlatform)
    }
}

impl From<opencl3::error_codes::ClError> for ClError {
    #[inline]
    fn from(err: opencl3::error_codes::ClError) -> Self {
        ClError::Api(err.0)
    }
}

impl From<i32> for ClError {
    #[inline]
    fn from(code: i32) -> Self {
        ClError::Api(code)
    }
}
