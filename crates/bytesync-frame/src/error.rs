/// Errors that can occur while buffering, validating, or encoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The caller violated an operation's contract (zero capacity, oversized
    /// consume, undersized output buffer, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A write would push the ring buffer past its capacity. Nothing was written.
    #[error("buffer full ({requested} bytes requested, {free} free)")]
    BufferFull { requested: usize, free: usize },

    /// The span does not start with the sync pattern.
    #[error("no sync pattern (expected 0xAA 0x55)")]
    NoSync,

    /// The declared frame length is below the minimum or above the configured maximum.
    #[error("bad frame length {length} (allowed 9..={max})")]
    BadLength { length: usize, max: usize },

    /// The trailing CRC does not match the covered bytes.
    #[error("crc mismatch (stored {stored:#06x}, computed {computed:#06x})")]
    BadCrc { stored: u16, computed: u16 },

    /// Backing storage for the ring buffer could not be allocated.
    #[error("unable to allocate {capacity} byte buffer")]
    NoMemory { capacity: usize },

    /// The payload does not fit in a single frame.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

/// Boundary error codes shared with the C ABI.
pub const BS_SUCCESS: i32 = 0;
pub const BS_ERR_INVALID_ARG: i32 = -1;
pub const BS_ERR_BUFFER_FULL: i32 = -2;
pub const BS_ERR_NO_SYNC: i32 = -3;
pub const BS_ERR_BAD_CRC: i32 = -4;
pub const BS_ERR_BAD_LENGTH: i32 = -5;
pub const BS_ERR_NO_MEMORY: i32 = -6;

impl FrameError {
    /// The boundary error code for this error.
    ///
    /// Encoding and I/O failures have no dedicated code; they report as
    /// `BS_ERR_BAD_LENGTH` and `BS_ERR_INVALID_ARG` respectively.
    pub fn code(&self) -> i32 {
        match self {
            FrameError::InvalidArgument(_) => BS_ERR_INVALID_ARG,
            FrameError::BufferFull { .. } => BS_ERR_BUFFER_FULL,
            FrameError::NoSync => BS_ERR_NO_SYNC,
            FrameError::BadLength { .. } | FrameError::PayloadTooLarge { .. } => {
                BS_ERR_BAD_LENGTH
            }
            FrameError::BadCrc { .. } => BS_ERR_BAD_CRC,
            FrameError::NoMemory { .. } => BS_ERR_NO_MEMORY,
            FrameError::Io(_) | FrameError::ConnectionClosed => BS_ERR_INVALID_ARG,
        }
    }

    /// True for stream corruption the de-framer recovers from by resyncing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameError::NoSync | FrameError::BadLength { .. } | FrameError::BadCrc { .. }
        )
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FrameError::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
