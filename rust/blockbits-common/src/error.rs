use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Status code of the fixed engine taxonomy this error belongs to.
    pub fn status(&self) -> StatusCode {
        self.0.status()
    }

    pub fn code(&self) -> i32 {
        self.status().code()
    }

    pub fn bad_alloc(context: impl Into<String>) -> Error {
        Error(
            ErrorKind::BadAlloc {
                context: context.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn index_out_of_range(index: u64, size: u64) -> Error {
        Error(ErrorKind::IndexOutOfRange { index, size }.into())
    }

    pub fn inverted_interval(left: u64, right: u64) -> Error {
        Error(ErrorKind::InvertedInterval { left, right }.into())
    }

    pub fn dest_buffer_too_small(required: usize, capacity: usize) -> Error {
        Error(ErrorKind::DestBufferTooSmall { required, capacity }.into())
    }

    pub fn unexpected_end(element: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnexpectedEnd {
                element: element.into(),
            }
            .into(),
        )
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn checksum_mismatch(element: impl Into<String>) -> Error {
        Error(
            ErrorKind::ChecksumMismatch {
                element: element.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("allocation failed: {context}")]
    BadAlloc { context: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("index {index} is out of range for size {size}")]
    IndexOutOfRange { index: u64, size: u64 },

    #[error("inverted interval [{left}, {right}]")]
    InvertedInterval { left: u64, right: u64 },

    #[error("destination buffer is too small: required {required}, capacity {capacity}")]
    DestBufferTooSmall { required: usize, capacity: usize },

    #[error("unexpected end of input while reading '{element}'")]
    UnexpectedEnd { element: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("checksum mismatch for '{element}'")]
    ChecksumMismatch { element: String },

    #[error("IO error for '{context}': {source}'")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::BadAlloc { .. } => StatusCode::BadAlloc,
            ErrorKind::InvalidArgument { .. }
            | ErrorKind::InvertedInterval { .. }
            | ErrorKind::InvalidFormat { .. }
            | ErrorKind::ChecksumMismatch { .. } => StatusCode::BadArgument,
            ErrorKind::IndexOutOfRange { .. }
            | ErrorKind::DestBufferTooSmall { .. }
            | ErrorKind::UnexpectedEnd { .. }
            | ErrorKind::Io { .. } => StatusCode::Range,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(e: std::collections::TryReserveError) -> Self {
        Error::bad_alloc(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

/// Outcome codes exposed to callers that speak plain integers.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok = 0,
    BadAlloc = 1,
    BadArgument = 2,
    Range = 3,
}

impl StatusCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<StatusCode> {
        match code {
            0 => Some(StatusCode::Ok),
            1 => Some(StatusCode::BadAlloc),
            2 => Some(StatusCode::BadArgument),
            3 => Some(StatusCode::Range),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            StatusCode::Ok => "All correct",
            StatusCode::BadAlloc => "Allocation error",
            StatusCode::BadArgument => "Invalid or missing function argument",
            StatusCode::Range => "Incorrect range or index",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::bad_alloc("block").code(), 1);
        assert_eq!(Error::invalid_arg("op", "unknown").code(), 2);
        assert_eq!(Error::inverted_interval(5, 3).code(), 2);
        assert_eq!(Error::index_out_of_range(10, 10).code(), 3);
        assert_eq!(Error::dest_buffer_too_small(100, 10).code(), 3);
        assert_eq!(Error::unexpected_end("header").code(), 3);
        assert_eq!(Error::checksum_mismatch("blob").code(), 2);
        assert_eq!(Error::invalid_format("blob", "magic").code(), 2);
    }

    #[test]
    fn test_status_codes() {
        for code in 0..4 {
            let status = StatusCode::from_code(code).unwrap();
            assert_eq!(status.code(), code);
            assert!(!status.message().is_empty());
        }
        assert_eq!(StatusCode::from_code(4), None);
        assert_eq!(StatusCode::from_code(-1), None);
        assert_eq!(StatusCode::Range.to_string(), "Incorrect range or index");
    }

    #[test]
    fn test_try_reserve_maps_to_bad_alloc() {
        let mut v = Vec::<u64>::new();
        let err: Error = v.try_reserve(usize::MAX).unwrap_err().into();
        assert_eq!(err.status(), StatusCode::BadAlloc);
    }
}
