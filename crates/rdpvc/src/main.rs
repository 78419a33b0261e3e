mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "rdpvc", version, about = "RDP virtual-channel framing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level for rdpvc events (stderr). Overridden by RDPVC_LOG.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
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
    fn test_parses_chunk_subcommand() {
        let cli = Cli::try_parse_from([
            "rdpvc",
            "chunk",
            "--channel",
            "1004",
            "--max-chunk",
            "1600",
            "--data",
            "hello",
        ])
        .expect("chunk args should parse");

        assert!(matches!(cli.command, Command::Chunk(_)));
    }

    #[test]
    fn test_rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "rdpvc",
            "chunk",
            "--channel",
            "3",
            "--hex",
            "00ff",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_parses_inspect_subcommand() {
        let cli = Cli::try_parse_from([
            "rdpvc",
            "inspect",
            "0500000003000000616263",
            "--channel",
            "3",
            "--role",
            "listener",
        ])
        .expect("inspect args should parse");
        assert!(matches!(cli.command, Command::Inspect(_)));
    }
}
