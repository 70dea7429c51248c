//! Register address spaces and their textual conventions.
//!
//! Each namespace renders addresses differently when searching a log line and
//! when writing the annotation fragment, so both renderings live here.

use std::fmt;

/// Register address key. Its meaning depends on the [`Namespace`].
pub type RegisterAddress = u32;

/// The three hardware register address spaces known to the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// Image-processing engine registers, addressed as `(destination << 16) | register`
    Engio,
    /// Analog front-end timing generator registers (16-bit index)
    Adtg,
    /// Sensor CMOS registers
    Cmos,
}

impl Namespace {
    /// All namespaces, in annotation order
    pub const ALL: [Namespace; 3] = [Namespace::Engio, Namespace::Adtg, Namespace::Cmos];

    /// Prefix written in front of the bracketed address, if any
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Namespace::Engio => None,
            Namespace::Adtg => Some("ADTG"),
            Namespace::Cmos => Some("CMOS"),
        }
    }

    /// Renders the text searched for in an uppercased log line.
    pub fn search_pattern(self, address: RegisterAddress) -> String {
        match self {
            Namespace::Engio => format!("{:X}", address),
            Namespace::Adtg => format!("ADTG:[0X{:04X}", address),
            Namespace::Cmos => format!("CMOS:[0X{:X}", address),
        }
    }

    /// Renders one annotation fragment, e.g. `ADTG[8880]: Black level`.
    pub fn annotation(self, address: RegisterAddress, description: &str) -> String {
        match self.prefix() {
            None => format!("{:x}: {}", address, description),
            Some(prefix) => format!("{}[{:x}]: {}", prefix, address, description),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Engio => f.write_str("ENGIO"),
            Namespace::Adtg => f.write_str("ADTG"),
            Namespace::Cmos => f.write_str("CMOS"),
        }
    }
}

/// A single register definition after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterEntry {
    /// Address space the register lives in
    pub namespace: Namespace,
    /// Namespace-specific address (composed for ENGIO)
    pub address: RegisterAddress,
    /// Human-readable description
    pub description: String,
}

impl RegisterEntry {
    /// Creates a new register entry
    pub fn new(
        namespace: Namespace,
        address: RegisterAddress,
        description: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            address,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_search_patterns() {
        assert_eq!(Namespace::Engio.search_pattern(0xC0F0_8014), "C0F08014");
        assert_eq!(Namespace::Adtg.search_pattern(0x14), "ADTG:[0X0014");
        assert_eq!(Namespace::Cmos.search_pattern(0x3), "CMOS:[0X3");
    }

    #[test]
    fn test_annotation_format() {
        assert_eq!(
            Namespace::Engio.annotation(0xC0F0_8014, "DARK_LIMIT"),
            "c0f08014: DARK_LIMIT"
        );
        assert_eq!(Namespace::Adtg.annotation(0x8880, "desc"), "ADTG[8880]: desc");
        assert_eq!(Namespace::Cmos.annotation(0x6, "iso"), "CMOS[6]: iso");
    }
}
