//! Register table parsing.
//!
//! Builds the three namespace maps from firmware source text.
//!
//! ## Dispatch
//!
//! For every line recognized by [`parse_definition_line`]:
//!
//! 1. Destination token starting with `0x`: ENGIO, address is
//!    `(destination << 16) | register`
//! 2. Destination equal to the ADTG sentinel: ADTG, address is the register
//! 3. Destination equal to the CMOS sentinel: CMOS, address is the register
//! 4. Anything else belongs to a bus that is not modeled and is dropped
//!
//! A later definition of the same address replaces the earlier one.
//!
//! ```
//! use regnote_core::{Namespace, RegisterParser};
//!
//! let maps = RegisterParser::new().parse(r#"{0xC0F0, 0x8014, 0, "DARK_LIMIT_14_12"},"#);
//! assert_eq!(maps.lookup(Namespace::Engio, 0xC0F0_8014), Some("DARK_LIMIT_14_12"));
//! ```

mod definition;

use crate::error::{read_text, Result};
use crate::namespace::{Namespace, RegisterAddress, RegisterEntry};
use std::collections::BTreeMap;
use tracing::{debug, trace};

pub use definition::{parse_definition_line, parse_hex, Definition};

/// Destination token used by the source table for ADTG registers
pub const DEFAULT_ADTG_SENTINEL: &str = "DST_ADTG";

/// Destination token used by the source table for CMOS registers
pub const DEFAULT_CMOS_SENTINEL: &str = "DST_CMOS";

/// Address to description map for a single namespace.
///
/// Ordered by address; this is the order annotations are emitted in.
pub type RegisterMap = BTreeMap<RegisterAddress, String>;

/// The register database: one map per namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterMaps {
    /// ENGIO registers keyed by composed address
    pub engio: RegisterMap,
    /// ADTG registers keyed by register index
    pub adtg: RegisterMap,
    /// CMOS registers keyed by register index
    pub cmos: RegisterMap,
}

impl RegisterMaps {
    /// Creates an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the map of a namespace
    pub fn get(&self, namespace: Namespace) -> &RegisterMap {
        match namespace {
            Namespace::Engio => &self.engio,
            Namespace::Adtg => &self.adtg,
            Namespace::Cmos => &self.cmos,
        }
    }

    /// Returns the map of a namespace for modification
    pub fn get_mut(&mut self, namespace: Namespace) -> &mut RegisterMap {
        match namespace {
            Namespace::Engio => &mut self.engio,
            Namespace::Adtg => &mut self.adtg,
            Namespace::Cmos => &mut self.cmos,
        }
    }

    /// Inserts a definition, returning the description it replaced
    pub fn insert(
        &mut self,
        namespace: Namespace,
        address: RegisterAddress,
        description: impl Into<String>,
    ) -> Option<String> {
        self.get_mut(namespace).insert(address, description.into())
    }

    /// Looks up the description of a register
    pub fn lookup(&self, namespace: Namespace, address: RegisterAddress) -> Option<&str> {
        self.get(namespace).get(&address).map(String::as_str)
    }

    /// Total number of registers across all namespaces
    pub fn len(&self) -> usize {
        self.engio.len() + self.adtg.len() + self.cmos.len()
    }

    /// Returns true when no namespace holds a register
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates all registers: ENGIO, then ADTG, then CMOS, ascending address
    pub fn entries(&self) -> impl Iterator<Item = RegisterEntry> + '_ {
        Namespace::ALL.into_iter().flat_map(move |ns| {
            self.get(ns)
                .iter()
                .map(move |(&address, desc)| RegisterEntry::new(ns, address, desc.as_str()))
        })
    }
}

/// Configuration for the register parser
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Destination token that marks an ADTG definition
    pub adtg_sentinel: String,
    /// Destination token that marks a CMOS definition
    pub cmos_sentinel: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            adtg_sentinel: DEFAULT_ADTG_SENTINEL.to_string(),
            cmos_sentinel: DEFAULT_CMOS_SENTINEL.to_string(),
        }
    }
}

impl ParserConfig {
    /// Creates a new parser config with default sentinels
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ADTG destination sentinel
    pub fn adtg_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.adtg_sentinel = sentinel.into();
        self
    }

    /// Sets the CMOS destination sentinel
    pub fn cmos_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.cmos_sentinel = sentinel.into();
        self
    }
}

/// Builds [`RegisterMaps`] from definition source text
#[derive(Debug, Clone, Default)]
pub struct RegisterParser {
    config: ParserConfig,
}

impl RegisterParser {
    /// Creates a parser with the default sentinels
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom configuration
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Classifies one line. `None` for malformed lines and unmodeled buses.
    pub fn parse_line(&self, line: &str) -> Option<RegisterEntry> {
        let def = parse_definition_line(line)?;

        let Some(register) = parse_hex(def.register) else {
            trace!("Skipping definition with bad register token: {:?}", def.register);
            return None;
        };

        let (namespace, address) = if def.has_literal_destination() {
            let Some(destination) = parse_hex(def.destination) else {
                trace!("Skipping definition with bad destination: {:?}", def.destination);
                return None;
            };
            let Some(address) = compose_engio_address(destination, register) else {
                debug!(
                    "Skipping ENGIO definition {}:{} that does not fit 32 bits",
                    def.destination, def.register
                );
                return None;
            };
            (Namespace::Engio, address)
        } else if def.destination == self.config.adtg_sentinel {
            (Namespace::Adtg, register)
        } else if def.destination == self.config.cmos_sentinel {
            (Namespace::Cmos, register)
        } else {
            trace!("Ignoring definition for unmodeled bus {}", def.destination);
            return None;
        };

        Some(RegisterEntry::new(namespace, address, def.description))
    }

    /// Parses a sequence of lines into a fresh database
    pub fn parse_lines<'a, I>(&self, lines: I) -> RegisterMaps
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut maps = RegisterMaps::new();
        let mut replaced = 0usize;

        for line in lines {
            let Some(entry) = self.parse_line(line) else {
                continue;
            };
            if let Some(old) = maps.insert(entry.namespace, entry.address, entry.description) {
                trace!(
                    "{} register {:#x} redefined (was {:?})",
                    entry.namespace,
                    entry.address,
                    old
                );
                replaced += 1;
            }
        }

        debug!(
            "Parsed {} ENGIO, {} ADTG, {} CMOS registers ({} redefinitions)",
            maps.engio.len(),
            maps.adtg.len(),
            maps.cmos.len(),
            replaced
        );
        maps
    }

    /// Parses a whole source text
    pub fn parse(&self, source: &str) -> RegisterMaps {
        self.parse_lines(source.lines())
    }
}

/// Combines an ENGIO base and register offset into one address.
pub fn compose_engio_address(destination: u32, register: u32) -> Option<RegisterAddress> {
    if destination > 0xFFFF {
        return None;
    }
    Some((destination << 16) | register)
}

/// Reads a definition source file and parses it with default settings.
pub fn load_source_file(path: impl AsRef<std::path::Path>) -> Result<RegisterMaps> {
    let source = read_text(path.as_ref())?;
    Ok(RegisterParser::new().parse(&source))
}
