use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use axisbus_robot::VelocitySnapshot;
use axisbus_transport::PortInfo;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
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
struct VelocityOutput<'a> {
    port: &'a str,
    timestamp: String,
    velocity: VelocitySnapshot,
}

pub fn print_velocity(snapshot: &VelocitySnapshot, port: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = VelocityOutput {
                port,
                timestamp: now_unix_millis(),
                velocity: *snapshot,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SLAVE", "VELOCITY"]);
            for (slave, velocity) in snapshot.iter() {
                table.add_row(vec![slave.to_string(), velocity.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line = snapshot
                .iter()
                .map(|(slave, velocity)| format!("{slave}={velocity}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{port} {line}");
        }
    }
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'static str,
    description: String,
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    let rows: Vec<PortOutput<'_>> = ports
        .iter()
        .map(|p| PortOutput {
            name: &p.name,
            kind: p.kind.as_str(),
            description: p.description(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "KIND", "DESCRIPTION"]);
            for row in rows {
                table.add_row(vec![row.name.to_string(), row.kind.to_string(), row.description]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if rows.is_empty() {
                println!("no serial ports found");
            }
            for row in rows {
                println!("{:<16} {:<10} {}", row.name, row.kind, row.description);
            }
        }
    }
}

fn now_unix_millis() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
