use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use rdpvc_frame::{Role, CHANNEL_CHUNK_LENGTH};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod chunk;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chunk a payload and print the units that would go on the wire.
    Chunk(ChunkArgs),
    /// Validate one received unit and print what the consumer would see.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Chunk(args) => chunk::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Operating role of the local side.
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum RoleArg {
    /// Client side; may set SHOW_PROTOCOL, validates against the unit length.
    #[default]
    Initiator,
    /// Server side; dispatches through the channel table.
    Listener,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Initiator => Role::Initiator,
            RoleArg::Listener => Role::Listener,
        }
    }
}

#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// Channel to send on.
    #[arg(long, short = 'c')]
    pub channel: u16,
    /// Channel name recorded in the local channel table.
    #[arg(long, default_value = "vc")]
    pub name: String,
    /// Mark the channel with the SHOW_PROTOCOL option.
    #[arg(long)]
    pub show_protocol: bool,
    /// Negotiated maximum chunk size in bytes.
    #[arg(long, default_value_t = CHANNEL_CHUNK_LENGTH)]
    pub max_chunk: usize,
    /// Local role.
    #[arg(long, value_enum, default_value_t = RoleArg::Initiator)]
    pub role: RoleArg,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex-encoded payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Hex-encoded unit: 8-byte envelope followed by the chunk body.
    pub unit: String,
    /// Channel the unit arrived on.
    #[arg(long, short = 'c')]
    pub channel: u16,
    /// Local role.
    #[arg(long, value_enum, default_value_t = RoleArg::Initiator)]
    pub role: RoleArg,
    /// Unit length declared by the outer framing (initiator role).
    /// Defaults to the decoded unit length.
    #[arg(long)]
    pub declared_length: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn decode_hex(input: &str) -> CliResult<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(&compact).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_ignores_whitespace() {
        assert_eq!(decode_hex("de ad\nbe ef").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_decode_hex_rejects_odd_length() {
        let err = decode_hex("abc").unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn test_role_arg_maps_to_role() {
        assert_eq!(Role::from(RoleArg::Listener), Role::Listener);
        assert_eq!(Role::from(RoleArg::default()), Role::Initiator);
    }
}
