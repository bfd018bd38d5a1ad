use axisbus_transport::list_ports;

use crate::cmd::PortsArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_ports, OutputFormat};

pub fn run(args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let mut ports = list_ports().map_err(|err| transport_error("port enumeration failed", err))?;
    if let Some(needle) = &args.find {
        ports.retain(|p| p.matches(needle));
    }
    print_ports(&ports, format);
    Ok(SUCCESS)
}
