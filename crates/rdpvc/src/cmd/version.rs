use rdpvc_frame::channel::{CLIPRDR, DRDYNVC, RAIL, RDPDR, RDPSND};
use rdpvc_frame::{
    ChunkConfig, ChunkFlags, CHANNEL_CHUNK_MAX_LENGTH, HEADER_SIZE, MAX_TOTAL_LENGTH,
};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("rdpvc {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        for line in framing_summary() {
            println!("{line}");
        }
    }
    Ok(SUCCESS)
}

/// Wire parameters this build chunks and validates with.
fn framing_summary() -> Vec<String> {
    let defaults = ChunkConfig::default();
    let all_flags = ChunkFlags::FIRST
        | ChunkFlags::LAST
        | ChunkFlags::SHOW_PROTOCOL
        | ChunkFlags::SUSPEND
        | ChunkFlags::RESUME
        | ChunkFlags::SHADOW_PERSISTENT
        | ChunkFlags::PACKET_COMPRESSED
        | ChunkFlags::PACKET_AT_FRONT
        | ChunkFlags::PACKET_FLUSHED;

    vec![
        format!("header_size: {HEADER_SIZE}"),
        format!("default_chunk: {}", defaults.max_chunk_size),
        format!("max_chunk: {CHANNEL_CHUNK_MAX_LENGTH}"),
        format!("max_total_length: {MAX_TOTAL_LENGTH}"),
        format!("default_role: {}", defaults.role),
        format!("chunk_flags: {all_flags}"),
        format!("known_channels: {}", [CLIPRDR, RDPDR, RDPSND, DRDYNVC, RAIL].join(",")),
    ]
}
