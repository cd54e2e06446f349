use crate::cmd::{CommandsArgs, Context};
use crate::exit::{table_error, usage_error, CliResult, SUCCESS};
use crate::output::print_descriptors;

pub fn run(args: CommandsArgs, ctx: &Context) -> CliResult<i32> {
    let table = ctx.load_table()?;

    if args.export {
        let json = table
            .to_json()
            .map_err(|err| table_error("export command table", err))?;
        println!("{json}");
        return Ok(SUCCESS);
    }

    if let Some(feature) = args.feature {
        if !table.features().iter().any(|(id, _)| *id == feature) {
            return Err(usage_error(format!("no commands for feature {feature}")));
        }
    }

    let selected = table
        .iter()
        .filter(|descriptor| args.feature.is_none_or(|id| descriptor.identity.feature_id == id));
    print_descriptors(selected, ctx.format);
    Ok(SUCCESS)
}
