use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use bytesync_frame::{FrameConfig, FrameError, FrameReader};
use tracing::info;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input: Box<dyn Read> = match args.file.as_deref() {
        None => Box::new(io::stdin().lock()),
        Some(path) if path == Path::new("-") => Box::new(io::stdin().lock()),
        Some(path) => Box::new(File::open(path).map_err(|err| {
            io_error(&format!("failed opening {}", path.display()), err)
        })?),
    };
    let chunk = usize::try_from(args.chunk_size).unwrap_or(usize::MAX);

    let config = FrameConfig {
        max_frame_len: args.max_frame_len,
        buffer_capacity: args.capacity,
    };
    let mut reader = FrameReader::with_config(Chunked::new(input, chunk), config)
        .map_err(|err| frame_error("invalid configuration", err))?;

    let mut printed = 0usize;
    loop {
        if args.count.is_some_and(|limit| printed >= limit) {
            break;
        }

        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("decode failed", err)),
        };

        if let Some(types) = &args.types {
            if !types.contains(&frame.msg_type) {
                continue;
            }
        }

        print_frame(&frame, format);
        printed += 1;
    }

    let stats = reader.stats();
    info!(
        frames = stats.frames,
        printed,
        resyncs = stats.resyncs,
        bytes_discarded = stats.bytes_discarded,
        bad_length = stats.bad_length,
        bad_crc = stats.bad_crc,
        "decode finished"
    );

    Ok(SUCCESS)
}

/// Caps every read at `chunk` bytes to emulate a slow or packetized link.
struct Chunked<R> {
    inner: R,
    chunk: usize,
}

impl<R: Read> Chunked<R> {
    fn new(inner: R, chunk: usize) -> Self {
        Self { inner, chunk }
    }
}

impl<R: Read> Read for Chunked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..len])
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn chunked_caps_each_read() {
        let mut reader = Chunked::new(Cursor::new(vec![7u8; 10]), 3);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}
