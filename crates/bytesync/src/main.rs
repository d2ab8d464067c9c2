mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "bytesync",
    version,
    about = "Decode, build and check sync-framed byte streams"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "BYTESYNC_LOG_LEVEL",
        default_value = "info",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from([
            "bytesync",
            "decode",
            "capture.bin",
            "--chunk-size",
            "1",
            "--types",
            "0x10,32",
            "--count",
            "3",
        ])
        .expect("decode args should parse");

        let Command::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(args.chunk_size, 1);
        assert_eq!(args.types, Some(vec![0x10, 32]));
        assert_eq!(args.count, Some(3));
    }

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from([
            "bytesync",
            "encode",
            "-t",
            "0x20",
            "--seq",
            "255",
            "--data",
            "hello",
            "--hex-output",
        ])
        .expect("encode args should parse");

        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.msg_type, 0x20);
        assert_eq!(args.seq, 255);
        assert!(args.hex_output);
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "bytesync", "crc", "--hex", "aa55", "--data", "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_zero_chunk_size() {
        assert!(Cli::try_parse_from(["bytesync", "decode", "--chunk-size", "0"]).is_err());
    }

    #[test]
    fn validate_requires_input() {
        assert!(Cli::try_parse_from(["bytesync", "validate"]).is_err());
    }
}
