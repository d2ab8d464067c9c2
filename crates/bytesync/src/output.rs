use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use bytesync_frame::OwnedFrame;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    sequence: u8,
    msg_type: u8,
    flags: u8,
    length: u16,
    crc: String,
    payload_size: usize,
    payload: String,
    payload_hex: String,
}

impl From<&OwnedFrame> for FrameOutput {
    fn from(frame: &OwnedFrame) -> Self {
        Self {
            sequence: frame.sequence,
            msg_type: frame.msg_type,
            flags: frame.flags,
            length: frame.length,
            crc: format!("{:#06x}", frame.crc),
            payload_size: frame.payload.len(),
            payload: payload_preview(&frame.payload),
            payload_hex: to_hex(&frame.payload),
        }
    }
}

pub fn print_frame(frame: &OwnedFrame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput::from(frame);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SEQ", "TYPE", "FLAGS", "SIZE", "CRC", "PAYLOAD"])
                .add_row(vec![
                    frame.sequence.to_string(),
                    format!("{:#04x}", frame.msg_type),
                    format!("{:#04x}", frame.flags),
                    frame.payload.len().to_string(),
                    format!("{:#06x}", frame.crc),
                    payload_preview(&frame.payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "seq={} type={:#04x} flags={:#04x} size={} crc={:#06x} payload={}",
                frame.sequence,
                frame.msg_type,
                frame.flags,
                frame.payload.len(),
                frame.crc,
                payload_preview(&frame.payload)
            );
        }
        OutputFormat::Raw => {
            print_raw(&frame.payload);
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if !text.chars().any(char::is_control) => text.to_string(),
        _ => format!("<binary {} bytes>", payload.len()),
    }
}
