use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::SerialStream;

/// Line speed every slave on the bus is configured for.
pub const DEFAULT_BAUD_RATE: u32 = 38_400;

/// USB adapter descriptions the bench rigs are known to report.
pub const DEFAULT_PORT_DESCRIPTIONS: &[&str] = &["ATEN USB to Serial", "USB-Serial Controller"];

/// Settings applied when opening the serial device.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate. Default: 38400.
    pub baud_rate: u32,
    /// How long a read waits for data before reporting nothing available.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(10),
        }
    }
}

/// Open a serial device by path (e.g. `/dev/ttyUSB0`, `COM13`).
pub fn open(path: &str, config: &SerialConfig) -> Result<SerialStream> {
    let port = serialport::new(path, config.baud_rate)
        .timeout(config.read_timeout)
        .open()
        .map_err(|source| TransportError::Open {
            port: path.to_string(),
            source,
        })?;

    info!(port = path, baud = config.baud_rate, "opened serial port");
    Ok(SerialStream::from_port(port, path))
}

/// Kind of attached port, as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Usb,
    Pci,
    Bluetooth,
    Unknown,
}

impl PortKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PortKind::Usb => "usb",
            PortKind::Pci => "pci",
            PortKind::Bluetooth => "bluetooth",
            PortKind::Unknown => "unknown",
        }
    }
}

/// An attached serial port and whatever the OS knows about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub kind: PortKind,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl PortInfo {
    /// Human-readable description, `manufacturer product` when known.
    pub fn description(&self) -> String {
        match (&self.manufacturer, &self.product) {
            (Some(m), Some(p)) => format!("{m} {p}"),
            (Some(m), None) => m.clone(),
            (None, Some(p)) => p.clone(),
            (None, None) => String::new(),
        }
    }

    /// Whether the description contains `needle`, ignoring ASCII case.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim();
        if needle.is_empty() {
            return false;
        }
        self.description()
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    }
}

impl From<serialport::SerialPortInfo> for PortInfo {
    fn from(info: serialport::SerialPortInfo) -> Self {
        match info.port_type {
            serialport::SerialPortType::UsbPort(usb) => Self {
                name: info.port_name,
                kind: PortKind::Usb,
                manufacturer: usb.manufacturer,
                product: usb.product,
            },
            serialport::SerialPortType::PciPort => Self {
                name: info.port_name,
                kind: PortKind::Pci,
                manufacturer: None,
                product: None,
            },
            serialport::SerialPortType::BluetoothPort => Self {
                name: info.port_name,
                kind: PortKind::Bluetooth,
                manufacturer: None,
                product: None,
            },
            serialport::SerialPortType::Unknown => Self {
                name: info.port_name,
                kind: PortKind::Unknown,
                manufacturer: None,
                product: None,
            },
        }
    }
}

/// Enumerate serial ports attached to this machine.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(PortInfo::from).collect())
}

/// Find the first attached port whose description matches one of `descriptions`.
///
/// Descriptions are tried in order, so earlier entries take priority.
pub fn find_port<S: AsRef<str>>(descriptions: &[S]) -> Result<String> {
    let ports = list_ports()?;
    select_port(&ports, descriptions)
}

fn select_port<S: AsRef<str>>(ports: &[PortInfo], descriptions: &[S]) -> Result<String> {
    for wanted in descriptions {
        if let Some(port) = ports.iter().find(|p| p.matches(wanted.as_ref())) {
            debug!(port = %port.name, description = wanted.as_ref(), "matched serial port");
            return Ok(port.name.clone());
        }
    }
    Err(TransportError::PortNotFound {
        descriptions: descriptions
            .iter()
            .map(|d| d.as_ref().to_string())
            .collect(),
    })
}
