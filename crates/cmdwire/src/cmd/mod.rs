use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Subcommand, ValueEnum};
use cmdwire_decoder::DecoderConfig;
use cmdwire_frame::{ByteOrder, DEFAULT_MAX_PAYLOAD};
use cmdwire_table::{CommandTable, TableConfig};

use crate::exit::{table_error, CliResult};
use crate::output::OutputFormat;

pub mod commands;
pub mod decode;
pub mod stream;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a single command buffer.
    Decode(DecodeArgs),
    /// Decode every command in a capture of link frames.
    Stream(StreamArgs),
    /// List the command descriptor table.
    Commands(CommandsArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Byte order of command buffers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum WireOrder {
    #[default]
    Little,
    Big,
}

impl From<WireOrder> for ByteOrder {
    fn from(order: WireOrder) -> Self {
        match order {
            WireOrder::Little => ByteOrder::Little,
            WireOrder::Big => ByteOrder::Big,
        }
    }
}

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub format: OutputFormat,
    pub table_path: Option<PathBuf>,
    pub byte_order: WireOrder,
    pub strict: bool,
}

impl Context {
    /// Built-in table, overlaid with the `--table` document when given.
    pub fn load_table(&self) -> CliResult<Arc<CommandTable>> {
        let Some(path) = &self.table_path else {
            return Ok(cmdwire_table::builtin_shared());
        };

        let overlay = CommandTable::from_file(path)
            .map_err(|err| table_error(&format!("load {}", path.display()), err))?;
        let mut table = cmdwire_table::builtin();
        table.set_config(TableConfig {
            allow_override: true,
            ..TableConfig::default()
        });
        table
            .extend(overlay)
            .map_err(|err| table_error("merge command table", err))?;
        tracing::debug!(path = %path.display(), commands = table.len(), "command table ready");
        Ok(Arc::new(table))
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            byte_order: self.byte_order.into(),
            reject_trailing_bytes: self.strict,
        }
    }
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, ctx),
        Command::Stream(args) => stream::run(args, ctx),
        Command::Commands(args) => commands::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Command buffer as hex (whitespace allowed).
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub hex: Option<String>,
    /// Read the command buffer from a binary file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Capture file holding back-to-back link frames.
    pub path: PathBuf,
    /// Largest frame payload accepted, in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
    /// Print only the closing summary.
    #[arg(long)]
    pub summary_only: bool,
}

#[derive(Args, Debug)]
pub struct CommandsArgs {
    /// Only list commands of this feature id.
    #[arg(long, value_name = "ID")]
    pub feature: Option<u8>,
    /// Print the table as a JSON document loadable with --table.
    #[arg(long, conflicts_with = "feature")]
    pub export: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
