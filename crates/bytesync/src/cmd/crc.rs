use bytesync_frame::crc16_ccitt;
use serde::Serialize;

use crate::cmd::CrcArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct CrcOutput {
    crc: String,
    value: u16,
    length: usize,
}

pub fn run(args: CrcArgs, format: OutputFormat) -> CliResult<i32> {
    let data = args.payload.resolve()?;
    let crc = crc16_ccitt(&data);

    match format {
        OutputFormat::Json => {
            let out = CrcOutput {
                crc: format_crc(crc),
                value: crc,
                length: data.len(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => {
            println!("{}", format_crc(crc));
        }
    }
    Ok(SUCCESS)
}

fn format_crc(crc: u16) -> String {
    format!("0x{crc:04X}")
}
