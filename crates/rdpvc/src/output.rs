use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rdpvc_frame::ChunkFlags;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
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

/// One chunk as it appears on the wire or after validation.
#[derive(Debug, Serialize)]
pub struct ChunkOutput {
    pub index: usize,
    pub channel: u16,
    pub channel_name: String,
    pub total_length: u32,
    pub flags: u32,
    pub flag_names: String,
    pub chunk_size: usize,
    /// Full unit (envelope + body) for emitted chunks, body for inspected ones.
    pub hex: String,
}

impl ChunkOutput {
    pub fn new(
        index: usize,
        channel: u16,
        channel_name: &str,
        total_length: u32,
        flags: ChunkFlags,
        chunk_size: usize,
        bytes: &[u8],
    ) -> Self {
        Self {
            index,
            channel,
            channel_name: channel_name.to_string(),
            total_length,
            flags: flags.bits(),
            flag_names: flags.to_string(),
            chunk_size,
            hex: hex::encode(bytes),
        }
    }
}

#[derive(Serialize)]
struct ChunkListOutput<'a> {
    role: &'a str,
    unit_count: usize,
    units: &'a [ChunkOutput],
}

pub fn print_chunks(chunks: &[ChunkOutput], role: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ChunkListOutput {
                role,
                unit_count: chunks.len(),
                units: chunks,
            };
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
                .set_header(vec!["#", "CHANNEL", "TOTAL", "FLAGS", "SIZE"]);
            for chunk in chunks {
                table.add_row(vec![
                    chunk.index.to_string(),
                    format!("{} ({})", chunk.channel, chunk.channel_name),
                    chunk.total_length.to_string(),
                    chunk.flag_names.clone(),
                    chunk.chunk_size.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for chunk in chunks {
                println!(
                    "#{} channel={} ({}) total={} flags={} size={}",
                    chunk.index,
                    chunk.channel,
                    chunk.channel_name,
                    chunk.total_length,
                    chunk.flag_names,
                    chunk.chunk_size
                );
            }
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout();
            for chunk in chunks {
                let _ = writeln!(out, "{}", chunk.hex);
            }
            let _ = out.flush();
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_output_serializes_flag_names() {
        let out = ChunkOutput::new(
            0,
            3,
            "cliprdr",
            5000,
            ChunkFlags::FIRST | ChunkFlags::SHOW_PROTOCOL,
            2,
            &[0xAB, 0xCD],
        );
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["flags"], 0x11);
        assert_eq!(json["flag_names"], "FIRST|SHOW_PROTOCOL");
        assert_eq!(json["hex"], "abcd");
    }
}
