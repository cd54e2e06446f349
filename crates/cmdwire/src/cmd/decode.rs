use cmdwire_decoder::decode_with_config;

use crate::cmd::{Context, DecodeArgs};
use crate::exit::{decode_error, io_error, usage_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::print_command;

pub fn run(args: DecodeArgs, ctx: &Context) -> CliResult<i32> {
    let buffer = read_buffer(&args)?;
    let table = ctx.load_table()?;

    let command = decode_with_config(&table, &buffer, &ctx.decoder_config())
        .map_err(|err| decode_error("decode", err))?;
    let descriptor = table.lookup(command.identity).ok_or_else(|| {
        CliError::new(INTERNAL, format!("descriptor for {} vanished", command.identity))
    })?;

    print_command(&command, descriptor, None, ctx.format);
    Ok(SUCCESS)
}

fn read_buffer(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(path) = &args.file {
        return std::fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err));
    }

    let text = args.hex.as_deref().unwrap_or_default();
    parse_hex(text)
}

fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let digits: String = text.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits.as_str());
    hex::decode(digits).map_err(|err| usage_error(format!("invalid --hex value: {err}")))
}
