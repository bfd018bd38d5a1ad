use std::fmt;
use std::str::FromStr;

/// A slave address that is not on the bus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown slave address {0:?} (expected 01, 02, 03, 04 or all)")]
pub struct AddressError(pub String);

/// One motor-control node on the line.
///
/// The bus carries exactly four slaves, `01` through `04`; nothing else can be
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlaveAddress(u8);

impl SlaveAddress {
    /// Every slave on the bus, in broadcast order.
    pub const ALL: [SlaveAddress; 4] = [Self(1), Self(2), Self(3), Self(4)];

    pub fn new(id: u8) -> Result<Self, AddressError> {
        match id {
            1..=4 => Ok(Self(id)),
            _ => Err(AddressError(format!("{id:02X}"))),
        }
    }

    pub fn id(self) -> u8 {
        self.0
    }

    /// Wire form: two uppercase hex digits.
    pub fn as_hex(self) -> &'static str {
        match self.0 {
            1 => "01",
            2 => "02",
            3 => "03",
            _ => "04",
        }
    }

    /// Position of this slave in [`SlaveAddress::ALL`].
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl FromStr for SlaveAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|addr| addr.as_hex() == s)
            .ok_or_else(|| AddressError(s.to_string()))
    }
}

impl fmt::Display for SlaveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_hex())
    }
}

/// Where a request goes: one slave, or each slave in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// One frame per slave, ascending.
    All,
    One(SlaveAddress),
}

impl Target {
    /// Concrete addresses this target expands to, in transmission order.
    pub fn addresses(self) -> Vec<SlaveAddress> {
        match self {
            Target::All => SlaveAddress::ALL.to_vec(),
            Target::One(addr) => vec![addr],
        }
    }
}

impl From<SlaveAddress> for Target {
    fn from(addr: SlaveAddress) -> Self {
        Target::One(addr)
    }
}

impl FromStr for Target {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Target::All);
        }
        s.parse().map(Target::One)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => f.write_str("all"),
            Target::One(addr) => fmt::Display::fmt(addr, f),
        }
    }
}
