use std::io::IsTerminal;

use clap::ValueEnum;
use cmdwire_decoder::{DecodedCommand, DecodedValue, ListFlags, StatsSnapshot};
use cmdwire_table::{ArgumentTypeTag, CommandDescriptor, CommandIdentity};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
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
struct ArgumentOutput<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    type_tag: ArgumentTypeTag,
    value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    enumerator: Option<&'a str>,
}

#[derive(Serialize)]
struct ListFlagsOutput {
    bits: u8,
    first: bool,
    last: bool,
    empty: bool,
    remove: bool,
}

#[derive(Serialize)]
struct CommandOutput<'a> {
    schema_id: &'static str,
    identity: CommandIdentity,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    list_flags: Option<ListFlagsOutput>,
    arguments: Vec<ArgumentOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame: Option<FrameContext>,
}

/// Where a command came from when it was read out of a capture.
#[derive(Serialize, Clone, Copy, Debug)]
pub struct FrameContext {
    pub index: usize,
    pub buffer_id: u8,
    pub sequence: u8,
}

fn json_value(value: &DecodedValue) -> serde_json::Value {
    match value {
        DecodedValue::U8(v) => (*v).into(),
        DecodedValue::I8(v) => (*v).into(),
        DecodedValue::U16(v) => (*v).into(),
        DecodedValue::I16(v) => (*v).into(),
        DecodedValue::U32(v) => (*v).into(),
        DecodedValue::I32(v) => (*v).into(),
        DecodedValue::U64(v) => (*v).into(),
        DecodedValue::I64(v) => (*v).into(),
        DecodedValue::Float(v) => serde_json::Number::from_f64(f64::from(*v))
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        DecodedValue::Double(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        DecodedValue::String(v) => v.clone().into(),
        DecodedValue::Enum(v) => (*v).into(),
    }
}

fn flags_output(flags: ListFlags) -> ListFlagsOutput {
    ListFlagsOutput {
        bits: flags.bits(),
        first: flags.is_first(),
        last: flags.is_last(),
        empty: flags.is_empty(),
        remove: flags.is_remove(),
    }
}

fn flags_label(flags: ListFlags) -> String {
    let mut names = Vec::new();
    if flags.is_first() {
        names.push("first");
    }
    if flags.is_last() {
        names.push("last");
    }
    if flags.is_empty() {
        names.push("empty");
    }
    if flags.is_remove() {
        names.push("remove");
    }
    format!("0x{:02x} {}", flags.bits(), names.join(","))
        .trim_end()
        .to_string()
}

fn arguments<'a>(
    command: &'a DecodedCommand,
    descriptor: &'a CommandDescriptor,
) -> Vec<ArgumentOutput<'a>> {
    descriptor
        .arguments
        .iter()
        .zip(&command.values)
        .map(|(argument, value)| ArgumentOutput {
            name: &argument.name,
            type_tag: value.type_tag(),
            value: json_value(value),
            enumerator: match value {
                DecodedValue::Enum(code) => argument.enumerator_name(*code),
                _ => None,
            },
        })
        .collect()
}

fn value_label(argument: &ArgumentOutput<'_>) -> String {
    match argument.enumerator {
        Some(name) => format!("{name} ({})", argument.value),
        None => argument.value.to_string(),
    }
}

/// Render one decoded command. The descriptor supplies argument names.
pub fn print_command(
    command: &DecodedCommand,
    descriptor: &CommandDescriptor,
    frame: Option<FrameContext>,
    format: OutputFormat,
) {
    let out = CommandOutput {
        schema_id: "https://schemas.3leaps.dev/cmdwire/cli/v1/decoded-command.schema.json",
        identity: command.identity,
        name: &descriptor.name,
        list_flags: command.list_flags.map(flags_output),
        arguments: arguments(command, descriptor),
        frame,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut heading = format!("{} ({})", out.name, out.identity);
            if let Some(flags) = command.list_flags {
                heading.push_str(&format!(" flags={}", flags_label(flags)));
            }
            println!("{heading}");
            if out.arguments.is_empty() {
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ARGUMENT", "TYPE", "VALUE"]);
            for argument in &out.arguments {
                table.add_row(vec![
                    argument.name.to_string(),
                    argument.type_tag.to_string(),
                    value_label(argument),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = format!("{} ({})", out.name, out.identity);
            if let Some(ctx) = out.frame {
                line = format!("#{} buf={} seq={} {line}", ctx.index, ctx.buffer_id, ctx.sequence);
            }
            if let Some(flags) = command.list_flags {
                line.push_str(&format!(" [{}]", flags_label(flags)));
            }
            for argument in &out.arguments {
                line.push_str(&format!(" {}={}", argument.name, value_label(argument)));
            }
            println!("{line}");
        }
    }
}

#[derive(Serialize)]
struct DescriptorOutput<'a> {
    identity: CommandIdentity,
    name: &'a str,
    list_item: bool,
    arguments: Vec<String>,
}

fn signature(descriptor: &CommandDescriptor) -> Vec<String> {
    descriptor
        .arguments
        .iter()
        .map(|argument| format!("{}: {}", argument.name, argument.type_tag))
        .collect()
}

/// Render a list of descriptors.
pub fn print_descriptors<'a>(
    descriptors: impl IntoIterator<Item = &'a CommandDescriptor>,
    format: OutputFormat,
) {
    let rows: Vec<DescriptorOutput<'_>> = descriptors
        .into_iter()
        .map(|descriptor| DescriptorOutput {
            identity: descriptor.identity,
            name: &descriptor.name,
            list_item: descriptor.is_list_item,
            arguments: signature(descriptor),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "NAME", "LIST", "ARGUMENTS"]);
            for row in &rows {
                table.add_row(vec![
                    row.identity.to_string(),
                    row.name.to_string(),
                    if row.list_item { "yes" } else { "" }.to_string(),
                    row.arguments.join(", "),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                let marker = if row.list_item { " [list]" } else { "" };
                println!(
                    "{:<10} {}{marker}({})",
                    row.identity.to_string(),
                    row.name,
                    row.arguments.join(", ")
                );
            }
        }
    }
}

/// Totals for one pass over a capture.
#[derive(Serialize, Debug, Default, Clone, Copy)]
pub struct StreamSummary {
    pub frames: u64,
    pub skipped_frames: u64,
    #[serde(flatten)]
    pub commands: StatsSnapshot,
    pub envelope_error: bool,
}

pub fn print_summary(summary: &StreamSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct SummaryOutput<'a> {
                schema_id: &'static str,
                summary: &'a StreamSummary,
            }
            let out = SummaryOutput {
                schema_id: "https://schemas.3leaps.dev/cmdwire/cli/v1/stream-summary.schema.json",
                summary,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let stats = summary.commands;
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COUNTER", "VALUE"]);
            for (name, value) in [
                ("frames", summary.frames),
                ("skipped frames", summary.skipped_frames),
                ("decoded", stats.decoded),
                ("unknown", stats.unknown),
                ("truncated", stats.truncated),
                ("malformed", stats.malformed),
            ] {
                table.add_row(vec![name.to_string(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let stats = summary.commands;
            println!(
                "frames={} skipped={} decoded={} unknown={} truncated={} malformed={}{}",
                summary.frames,
                summary.skipped_frames,
                stats.decoded,
                stats.unknown,
                stats.truncated,
                stats.malformed,
                if summary.envelope_error {
                    " (stopped at corrupt envelope)"
                } else {
                    ""
                }
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_label_lists_set_bits() {
        let flags = ListFlags::from_bits(ListFlags::FIRST | ListFlags::REMOVE);
        assert_eq!(flags_label(flags), "0x09 first,remove");
        assert_eq!(flags_label(ListFlags::from_bits(0)), "0x00");
    }

    #[test]
    fn enum_arguments_carry_enumerator_names() {
        let table = cmdwire_table::builtin();
        let descriptor = table
            .lookup_name("ardrone3.PilotingState.FlyingStateChanged")
            .unwrap();
        let known = DecodedCommand::new(descriptor.identity, vec![DecodedValue::Enum(3)]);
        let unknown = DecodedCommand::new(descriptor.identity, vec![DecodedValue::Enum(99)]);

        let known_args = arguments(&known, descriptor);
        assert_eq!(known_args[0].enumerator, Some("flying"));
        assert_eq!(value_label(&known_args[0]), "flying (3)");

        let unknown_args = arguments(&unknown, descriptor);
        assert_eq!(unknown_args[0].enumerator, None);
        assert_eq!(value_label(&unknown_args[0]), "99");
    }

    #[test]
    fn float_values_become_json_numbers() {
        assert_eq!(json_value(&DecodedValue::Float(0.5)), serde_json::json!(0.5));
        assert_eq!(json_value(&DecodedValue::Double(f64::NAN)), serde_json::Value::Null);
        assert_eq!(json_value(&DecodedValue::Enum(-1)), serde_json::json!(-1));
    }
}
