use std::fmt;
use std::io;

use bytesync_frame::FrameError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => FAILURE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::NoSync
        | FrameError::BadLength { .. }
        | FrameError::BadCrc { .. }
        | FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::InvalidArgument(_) => CliError::new(USAGE, format!("{context}: {err}")),
        FrameError::BufferFull { .. } | FrameError::ConnectionClosed => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        FrameError::NoMemory { .. } => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_errors_map_to_exit_codes() {
        assert_eq!(frame_error("x", FrameError::NoSync).code, DATA_INVALID);
        assert_eq!(
            frame_error("x", FrameError::BadCrc { stored: 1, computed: 2 }).code,
            DATA_INVALID
        );
        assert_eq!(
            frame_error("x", FrameError::InvalidArgument("bad".into())).code,
            USAGE
        );
        assert_eq!(frame_error("x", FrameError::ConnectionClosed).code, FAILURE);
    }

    #[test]
    fn io_errors_keep_context() {
        let err = io_error(
            "failed reading input.bin",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.starts_with("failed reading input.bin: "));

        let err = frame_error("read", FrameError::Io(io::Error::from(io::ErrorKind::PermissionDenied)));
        assert_eq!(err.code, PERMISSION_DENIED);
    }
}
