use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("cmdwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let table = cmdwire_table::builtin_shared();
    println!("name: cmdwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("CMDWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("CMDWIRE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "builtin_table: {} commands in {} features",
        table.len(),
        table.features().len()
    );

    Ok(SUCCESS)
}
