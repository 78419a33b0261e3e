use std::fs;

use rdpvc_frame::channel::{is_valid_name, CHANNEL_NAME_LEN};
use rdpvc_frame::{
    chunk_count, decode_header, ChannelDescriptor, ChannelOptions, ChannelTable, ChunkConfig, ChunkWriter, Role,
};
use rdpvc_transport::{MemoryTransport, SentUnit, StreamCursor};
use tracing::debug;

use crate::cmd::{decode_hex, ChunkArgs};
use crate::exit::{recv_error, send_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_chunks, ChunkOutput, OutputFormat};

pub fn run(args: ChunkArgs, format: OutputFormat) -> CliResult<i32> {
    check_channel_name(&args.name)?;
    let payload = resolve_payload(&args)?;
    let role = Role::from(args.role);

    let mut options = ChannelOptions::INITIALIZED;
    if args.show_protocol {
        options = options | ChannelOptions::SHOW_PROTOCOL;
    }
    let channels =
        ChannelTable::new().with_channel(ChannelDescriptor::new(args.channel, &args.name, options));

    let config = ChunkConfig {
        max_chunk_size: args.max_chunk,
        role,
    };
    let mut writer = ChunkWriter::with_config(MemoryTransport::new(), config)
        .map_err(|err| send_error("invalid configuration", err))?;

    writer
        .send(&channels, args.channel, &payload)
        .map_err(|err| send_error("chunking failed", err))?;

    let units = writer.into_inner().take_sent();
    debug!(units = units.len(), payload_len = payload.len(), "payload chunked");
    let expected = chunk_count(payload.len(), args.max_chunk);
    if units.len() != expected {
        return Err(CliError::new(
            INTERNAL,
            format!("chunker emitted {} units, expected {expected}", units.len()),
        ));
    }

    let rows = units
        .iter()
        .enumerate()
        .map(|(index, unit)| describe_unit(index, unit, &args.name))
        .collect::<CliResult<Vec<_>>>()?;

    print_chunks(&rows, role.as_str(), format);
    Ok(SUCCESS)
}

fn check_channel_name(name: &str) -> CliResult<()> {
    if is_valid_name(name) {
        return Ok(());
    }
    Err(CliError::new(
        USAGE,
        format!("invalid channel name {name:?}: expected 1 to {CHANNEL_NAME_LEN} ASCII characters"),
    ))
}

fn resolve_payload(args: &ChunkArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(hex) = &args.hex {
        return decode_hex(hex);
    }
    if let Some(path) = &args.file {
        return fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(Vec::new())
}

fn describe_unit(index: usize, unit: &SentUnit, channel_name: &str) -> CliResult<ChunkOutput> {
    let mut cursor = StreamCursor::new(&unit.bytes);
    let header = decode_header(&mut cursor).map_err(|err| {
        let err = recv_error("emitted unit did not decode", err);
        CliError::new(INTERNAL, err.message)
    })?;

    Ok(ChunkOutput::new(
        index,
        unit.channel_id,
        channel_name,
        header.total_length,
        header.flags,
        cursor.remaining_len(),
        &unit.bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::RoleArg;

    fn args() -> ChunkArgs {
        ChunkArgs {
            channel: 3,
            name: "cliprdr".to_string(),
            show_protocol: false,
            max_chunk: 4,
            role: RoleArg::Initiator,
            data: None,
            hex: None,
            file: None,
        }
    }

    #[test]
    fn test_payload_from_hex() {
        let args = ChunkArgs {
            hex: Some("0102".to_string()),
            ..args()
        };
        assert_eq!(resolve_payload(&args).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_missing_payload_is_empty() {
        assert!(resolve_payload(&args()).unwrap().is_empty());
    }

    #[test]
    fn test_channel_name_must_fit_name_field() {
        assert!(check_channel_name("cliprdr").is_ok());
        assert_eq!(check_channel_name("").unwrap_err().code, USAGE);
        assert_eq!(check_channel_name("clipboard").unwrap_err().code, USAGE);
    }

    #[test]
    fn test_describe_unit_reports_body_size() {
        let unit = SentUnit {
            channel_id: 3,
            security_flags: 0,
            bytes: vec![0x0A, 0, 0, 0, 0x03, 0, 0, 0, b'h', b'i'].into(),
        };
        let row = describe_unit(0, &unit, "cliprdr").unwrap();
        assert_eq!(row.total_length, 10);
        assert_eq!(row.chunk_size, 2);
        assert_eq!(row.flag_names, "FIRST|LAST");
    }

    #[test]
    fn test_describe_unit_rejects_short_unit() {
        let unit = SentUnit {
            channel_id: 3,
            security_flags: 0,
            bytes: vec![0x01, 0x02].into(),
        };
        let err = describe_unit(0, &unit, "cliprdr").unwrap_err();
        assert_eq!(err.code, INTERNAL);
    }
}
