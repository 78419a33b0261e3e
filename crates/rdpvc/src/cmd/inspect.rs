use std::sync::mpsc;

use rdpvc_frame::{
    ChannelData, ChannelDescriptor, ChannelOptions, ChannelTable, ChunkFlags, ChunkReader,
    ConsumerError, PeerChunkReader, PeerDispatch, Role,
};
use rdpvc_transport::StreamCursor;
use tracing::debug;

use crate::cmd::{decode_hex, InspectArgs};
use crate::exit::{recv_error, CliResult, SUCCESS};
use crate::output::{print_chunks, print_raw, ChunkOutput, OutputFormat};

const INSPECT_CHANNEL_NAME: &str = "vc";

/// A chunk as the consumer saw it, copied out of the borrowed unit.
#[derive(Debug)]
struct Delivered {
    channel_id: u16,
    flags: ChunkFlags,
    total_length: u32,
    data: Vec<u8>,
}

impl Delivered {
    fn from_chunk(chunk: &ChannelData<'_>) -> Self {
        Self {
            channel_id: chunk.channel_id,
            flags: chunk.flags,
            total_length: chunk.total_length,
            data: chunk.data.to_vec(),
        }
    }
}

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let unit = decode_hex(&args.unit)?;
    let role = Role::from(args.role);

    let delivered = validate(&unit, &args, role)?;
    debug!(
        channel_id = args.channel,
        unit_len = unit.len(),
        delivered = delivered.len(),
        %role,
        "unit inspected"
    );

    if matches!(format, OutputFormat::Raw) {
        for chunk in &delivered {
            print_raw(&chunk.data);
        }
        return Ok(SUCCESS);
    }

    let rows: Vec<ChunkOutput> = delivered
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            ChunkOutput::new(
                index,
                chunk.channel_id,
                INSPECT_CHANNEL_NAME,
                chunk.total_length,
                chunk.flags,
                chunk.data.len(),
                &chunk.data,
            )
        })
        .collect();

    print_chunks(&rows, role.as_str(), format);
    Ok(SUCCESS)
}

fn validate(unit: &[u8], args: &InspectArgs, role: Role) -> CliResult<Vec<Delivered>> {
    let (tx, rx) = mpsc::channel();
    let handler = move |chunk: ChannelData<'_>| {
        tx.send(Delivered::from_chunk(&chunk))
            .map_err(|_| ConsumerError::new("inspect collector closed"))
    };

    let mut cursor = StreamCursor::new(unit);
    match role {
        Role::Initiator => {
            let declared = args.declared_length.unwrap_or(unit.len());
            let mut reader = ChunkReader::new(handler);
            reader
                .process(&mut cursor, args.channel, declared)
                .map_err(|err| recv_error("unit rejected", err))?;
        }
        Role::Listener => {
            let channels = ChannelTable::new().with_channel(ChannelDescriptor::new(
                args.channel,
                INSPECT_CHANNEL_NAME,
                ChannelOptions::INITIALIZED,
            ));
            let mut reader = PeerChunkReader::new(PeerDispatch::forwarding(handler));
            reader
                .process_peer(&channels, &mut cursor, args.channel)
                .map_err(|err| recv_error("unit rejected", err))?;
        }
    }

    Ok(rx.try_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::RoleArg;
    use crate::exit::DATA_INVALID;

    fn inspect_args(unit: &str, role: RoleArg) -> InspectArgs {
        InspectArgs {
            unit: unit.to_string(),
            channel: 1004,
            role,
            declared_length: None,
        }
    }

    // total_length=5, FIRST|LAST, body "hello"
    const HELLO_UNIT: &str = "05000000 03000000 68656c6c6f";

    #[test]
    fn test_initiator_delivers_body() {
        let args = inspect_args(HELLO_UNIT, RoleArg::Initiator);
        let unit = decode_hex(&args.unit).unwrap();
        let delivered = validate(&unit, &args, Role::Initiator).unwrap();

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].channel_id, 1004);
        assert_eq!(delivered[0].total_length, 5);
        assert_eq!(delivered[0].flags, ChunkFlags::FIRST | ChunkFlags::LAST);
        assert_eq!(delivered[0].data, b"hello");
    }

    #[test]
    fn test_initiator_rejects_wrong_declared_length() {
        let args = InspectArgs {
            declared_length: Some(20),
            ..inspect_args(HELLO_UNIT, RoleArg::Initiator)
        };
        let unit = decode_hex(&args.unit).unwrap();
        let err = validate(&unit, &args, Role::Initiator).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn test_listener_forwards_through_table() {
        let args = inspect_args(HELLO_UNIT, RoleArg::Listener);
        let unit = decode_hex(&args.unit).unwrap();
        let delivered = validate(&unit, &args, Role::Listener).unwrap();

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].data, b"hello");
    }

    #[test]
    fn test_short_unit_is_data_invalid() {
        let args = inspect_args("0500", RoleArg::Listener);
        let unit = decode_hex(&args.unit).unwrap();
        let err = validate(&unit, &args, Role::Listener).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }
}
