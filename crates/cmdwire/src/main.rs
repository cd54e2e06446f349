mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::{Command, Context, WireOrder};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "cmdwire", version, about = "Binary command protocol inspector")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// JSON descriptor document overlaid on the built-in table.
    #[arg(long, value_name = "PATH", env = "CMDWIRE_TABLE", global = true)]
    table: Option<PathBuf>,

    /// Byte order of command buffers.
    #[arg(long, value_name = "ORDER", default_value = "little", global = true)]
    byte_order: WireOrder,

    /// Reject command buffers with bytes after the last argument.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let ctx = Context {
        format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
        table_path: cli.table,
        byte_order: cli.byte_order,
        strict: cli.strict,
    };

    match cmd::run(cli.command, &ctx) {
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
    fn parses_decode_with_hex() {
        let cli = Cli::try_parse_from(["cmdwire", "decode", "--hex", "01000100"])
            .expect("decode args should parse");
        assert!(matches!(cli.command, Command::Decode(_)));
        assert_eq!(cli.byte_order, WireOrder::Little);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn rejects_conflicting_decode_inputs() {
        let err = Cli::try_parse_from([
            "cmdwire",
            "decode",
            "--hex",
            "01000100",
            "--file",
            "/tmp/buffer.bin",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn decode_requires_an_input() {
        let err = Cli::try_parse_from(["cmdwire", "decode"]).expect_err("input is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "cmdwire",
            "stream",
            "/tmp/capture.bin",
            "--byte-order",
            "big",
            "--strict",
            "--format",
            "pretty",
        ])
        .expect("stream args should parse");

        assert!(matches!(cli.command, Command::Stream(_)));
        assert_eq!(cli.byte_order, WireOrder::Big);
        assert!(cli.strict);
        assert_eq!(cli.format, Some(OutputFormat::Pretty));
    }
}
