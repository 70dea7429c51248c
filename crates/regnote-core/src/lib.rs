//! # regnote-core
//!
//! A library for building a hardware register database from firmware source
//! tables and annotating diagnostic logs with it.
//!
//! This crate provides the core functionality for:
//! - Extracting ENGIO, ADTG and CMOS register definitions from C initializer tables
//! - Merging a hand-maintained ENGIO description file on top of them
//! - Appending register descriptions to log lines that mention known addresses
//!
//! ## Architecture
//!
//! Data flows one way, each stage finishing before the next starts:
//!
//! - [`registers`]: definition source text to [`RegisterMaps`]
//! - [`overrides`]: override file merged into the ENGIO map
//! - [`annotate`]: read-only matching of log lines against the maps
//! - [`namespace`]: address spaces and their textual conventions
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use regnote_core::{merge_override_text, Annotator, RegisterParser};
//!
//! let mut maps = RegisterParser::new().parse(r#"    {0xC0F0, 0x8014, 0, "DARK_LIMIT_14_12"},"#);
//! merge_override_text(&mut maps, "0xC0F08020 SHAD_MODE_0xC0F08020");
//!
//! let annotator = Annotator::new(&maps);
//! let out = annotator.annotate_line("[ENGIO] C0F08014 <- 0x3FFF");
//! assert!(out.ends_with(" ; c0f08014: DARK_LIMIT_14_12"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod annotate;
pub mod error;
pub mod namespace;
pub mod overrides;
pub mod registers;

// Re-export primary types for convenience
pub use annotate::{Annotator, AnnotatorConfig, DEFAULT_MIN_WIDTH};
pub use error::{Error, Result};
pub use namespace::{Namespace, RegisterAddress, RegisterEntry};
pub use overrides::{
    merge_override_file, merge_override_text, merge_overrides, MergeStats, OverrideRecord,
};
pub use registers::{load_source_file, ParserConfig, RegisterMap, RegisterMaps, RegisterParser};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Definition source read when no path is given
pub const DEFAULT_SOURCE_FILE: &str = "adtg_gui.c";

/// Override file read when no path is given
pub const DEFAULT_OVERRIDE_FILE: &str = "regs.txt";
