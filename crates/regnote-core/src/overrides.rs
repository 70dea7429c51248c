//! Merging of the hand-maintained ENGIO description file.
//!
//! The override file holds one `<0xADDRESS> <description>` pair per line.
//! Descriptions exported by the register dumper often end in `_0xC0F08014`
//! or `_C0F08014`; that suffix repeats the address and is dropped before
//! merging.
//!
//! Per address:
//! - new address: inserted as is
//! - same text as the parsed table (ignoring surrounding whitespace): kept
//! - different text: `"<override>; <existing>"`
//!
//! Merging must run on the complete ENGIO map, after the whole definition
//! source has been parsed.

use crate::error::{read_text, Result};
use crate::namespace::RegisterAddress;
use crate::registers::{RegisterMap, RegisterMaps};
use std::collections::btree_map::Entry;
use tracing::{debug, trace};

/// Separator placed between an override and the parsed description
pub const MERGE_SEPARATOR: &str = "; ";

/// One line of the override file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRecord {
    /// Composed ENGIO address
    pub address: RegisterAddress,
    /// Description as written in the file
    pub description: String,
}

/// Counters describing what a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Addresses that were not in the map yet
    pub inserted: usize,
    /// Addresses whose description was prefixed with the override
    pub concatenated: usize,
    /// Addresses whose description already matched
    pub unchanged: usize,
}

impl MergeStats {
    /// Number of override records applied
    pub fn total(&self) -> usize {
        self.inserted + self.concatenated + self.unchanged
    }
}

/// Matches `0x<hex> <description>`. Other lines yield `None`.
pub fn parse_override_line(line: &str) -> Option<OverrideRecord> {
    let rest = line.strip_prefix("0x")?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let (digits, tail) = rest.split_at(digits_end);
    let description = tail
        .strip_prefix([' ', '\t'])?
        .trim_start_matches([' ', '\t']);

    let Ok(address) = u32::from_str_radix(digits, 16) else {
        trace!("Skipping override with out-of-range address 0x{}", digits);
        return None;
    };

    Some(OverrideRecord {
        address,
        description: description.to_string(),
    })
}

/// Removes a trailing `_0xNNNNNNNN` and then a trailing `_NNNNNNNN` that
/// spell out `address`.
pub fn strip_generated_suffix(description: &str, address: RegisterAddress) -> &str {
    let prefixed = format!("_0x{:08X}", address);
    let description = strip_suffix_ignore_case(description, &prefixed).unwrap_or(description);

    let bare = format!("_{:08X}", address);
    strip_suffix_ignore_case(description, &bare).unwrap_or(description)
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    if !text.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = text.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Applies override records, in order, to an ENGIO map.
pub fn merge_overrides<I>(engio: &mut RegisterMap, records: I) -> MergeStats
where
    I: IntoIterator<Item = OverrideRecord>,
{
    let mut stats = MergeStats::default();

    for record in records {
        let description = strip_generated_suffix(&record.description, record.address);

        match engio.entry(record.address) {
            Entry::Vacant(slot) => {
                trace!("Override adds {:#010x}: {}", record.address, description);
                slot.insert(description.to_string());
                stats.inserted += 1;
            }
            Entry::Occupied(mut slot) => {
                if description.trim() == slot.get().trim() {
                    stats.unchanged += 1;
                    continue;
                }
                let merged = format!("{}{}{}", description, MERGE_SEPARATOR, slot.get());
                trace!("Override merges {:#010x}: {}", record.address, merged);
                slot.insert(merged);
                stats.concatenated += 1;
            }
        }
    }

    debug!(
        "Merged {} overrides: {} inserted, {} concatenated, {} unchanged",
        stats.total(),
        stats.inserted,
        stats.concatenated,
        stats.unchanged
    );
    stats
}

/// Parses override text and merges it into the ENGIO map of `maps`
pub fn merge_override_text(maps: &mut RegisterMaps, text: &str) -> MergeStats {
    merge_overrides(&mut maps.engio, text.lines().filter_map(parse_override_line))
}

/// Reads an override file and merges it into the ENGIO map of `maps`.
pub fn merge_override_file(
    maps: &mut RegisterMaps,
    path: impl AsRef<std::path::Path>,
) -> Result<MergeStats> {
    let path = path.as_ref();
    let text = read_text(path)?;
    Ok(merge_override_text(maps, &text))
}
