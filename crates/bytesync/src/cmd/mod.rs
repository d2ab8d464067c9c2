use std::fs;
use std::path::{Path, PathBuf};

use bytesync_frame::{DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_FRAME_LEN, MAX_FRAME_LEN};
use clap::{Args, Subcommand};

use crate::exit::{io_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod crc;
pub mod decode;
pub mod encode;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode frames from a file or stdin.
    Decode(DecodeArgs),
    /// Build a single frame.
    Encode(EncodeArgs),
    /// Compute the CRC-16/CCITT-FALSE of some bytes.
    Crc(CrcArgs),
    /// Strictly validate one complete frame.
    Validate(ValidateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args),
        Command::Crc(args) => crc::run(args, format),
        Command::Validate(args) => validate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file. Reads stdin when omitted or "-".
    pub file: Option<PathBuf>,
    /// Largest read issued to the input, in bytes.
    #[arg(long, default_value_t = 4096, value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: u64,
    /// Largest accepted frame, sync through CRC.
    #[arg(
        long,
        env = "BYTESYNC_MAX_FRAME_LEN",
        default_value_t = DEFAULT_MAX_FRAME_LEN
    )]
    pub max_frame_len: usize,
    /// Ring buffer capacity in bytes.
    #[arg(
        long,
        env = "BYTESYNC_BUFFER_CAPACITY",
        default_value_t = DEFAULT_BUFFER_CAPACITY
    )]
    pub capacity: usize,
    /// Only print frames of these message types (comma-separated, decimal or 0x-hex).
    #[arg(long, value_delimiter = ',', value_parser = parse_u8)]
    pub types: Option<Vec<u8>>,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Message type.
    #[arg(long = "type", short = 't', default_value = "0", value_parser = parse_u8)]
    pub msg_type: u8,
    /// Sequence number.
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub seq: u8,
    /// Flags byte.
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub flags: u8,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Print the frame as hex instead of raw bytes.
    #[arg(long)]
    pub hex_output: bool,
}

#[derive(Args, Debug)]
pub struct CrcArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Frame bytes as hex.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub hex: Option<String>,
    /// Read the frame from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Largest accepted frame, sync through CRC.
    #[arg(long, env = "BYTESYNC_MAX_FRAME_LEN", default_value_t = MAX_FRAME_LEN)]
    pub max_frame_len: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Payload source shared by commands that take input bytes.
#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// UTF-8 string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex payload (whitespace and a 0x prefix are ignored).
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    /// Resolve the payload bytes. No source means an empty payload.
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        if let Some(hex) = &self.hex {
            return parse_hex(hex);
        }
        if let Some(path) = &self.file {
            return read_file(path);
        }
        Ok(Vec::new())
    }
}

pub fn read_file(path: &Path) -> CliResult<Vec<u8>> {
    fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}

/// Decode hex text, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: Vec<u8> = body.bytes().filter(|b| !b.is_ascii_whitespace()).collect();

    if digits.len() % 2 != 0 {
        return Err(CliError::usage("hex input has an odd number of digits"));
    }

    digits
        .chunks(2)
        .map(|pair| match (hex_digit(pair[0]), hex_digit(pair[1])) {
            (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
            _ => Err(CliError::usage(format!(
                "invalid hex digit in {:?}",
                String::from_utf8_lossy(pair)
            ))),
        })
        .collect()
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Parse a byte given as decimal or `0x` hex.
pub fn parse_u8(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse::<u8>(),
    };
    parsed.map_err(|_| format!("expected a byte value (0-255 or 0x00-0xff), got {input:?}"))
}
