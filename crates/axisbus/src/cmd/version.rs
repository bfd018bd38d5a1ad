use axisbus_transport::{SendGate, DEFAULT_BAUD_RATE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("axisbus {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: axisbus");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("AXISBUS_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("baud_rate: {DEFAULT_BAUD_RATE}");
    println!(
        "min_send_spacing_ms: {}",
        SendGate::DEFAULT_MIN_SPACING.as_millis()
    );
    println!(
        "features: robot={}, async={}, cli=true",
        cfg!(feature = "robot"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
