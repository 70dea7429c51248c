//! Log annotation.
//!
//! Every line is checked against all three maps. A register matches when its
//! namespace's search pattern occurs anywhere in the ASCII-uppercased line:
//!
//! | Namespace | Pattern          | Fragment          |
//! |-----------|------------------|-------------------|
//! | ENGIO     | `C0F08014`       | `c0f08014: desc`  |
//! | ADTG      | `ADTG:[0X8880`   | `ADTG[8880]: desc`|
//! | CMOS      | `CMOS:[0X6`      | `CMOS[6]: desc`   |
//!
//! Matching is plain substring containment, so an address can also hit
//! unrelated numbers in the line; every hit is reported.
//!
//! Fragments are ordered ENGIO, ADTG, CMOS and by ascending address within a
//! namespace. A line with at least one fragment is left-justified to the
//! minimum width and followed by `" ; "` and the fragments joined by `"; "`.
//! Other lines pass through untouched.

use crate::namespace::Namespace;
use crate::registers::RegisterMaps;
use std::borrow::Cow;
use std::io::{self, Write};

/// Default column the comment block starts at
pub const DEFAULT_MIN_WIDTH: usize = 80;

/// Configuration for the annotator
#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// Lines with annotations are padded to at least this many characters
    pub min_width: usize,
    /// Text placed between the padded line and the first fragment
    pub comment_marker: String,
    /// Text placed between fragments
    pub separator: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            comment_marker: " ; ".to_string(),
            separator: "; ".to_string(),
        }
    }
}

impl AnnotatorConfig {
    /// Creates a new annotator config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum width of annotated lines
    pub fn min_width(mut self, width: usize) -> Self {
        self.min_width = width;
        self
    }

    /// Sets the marker that opens the comment block
    pub fn comment_marker(mut self, marker: impl Into<String>) -> Self {
        self.comment_marker = marker.into();
        self
    }

    /// Sets the separator between fragments
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// Appends register descriptions to log lines. Borrows the maps read-only.
#[derive(Debug, Clone)]
pub struct Annotator<'a> {
    maps: &'a RegisterMaps,
    config: AnnotatorConfig,
}

impl<'a> Annotator<'a> {
    /// Creates an annotator with default formatting
    pub fn new(maps: &'a RegisterMaps) -> Self {
        Self::with_config(maps, AnnotatorConfig::default())
    }

    /// Creates an annotator with custom formatting
    pub fn with_config(maps: &'a RegisterMaps, config: AnnotatorConfig) -> Self {
        Self { maps, config }
    }

    /// Collects the annotation fragments for one line.
    pub fn annotations(&self, line: &str) -> Vec<String> {
        let upper = line.to_ascii_uppercase();
        let mut fragments = Vec::new();

        for namespace in Namespace::ALL {
            for (&address, description) in self.maps.get(namespace) {
                if upper.contains(&namespace.search_pattern(address)) {
                    fragments.push(namespace.annotation(address, description));
                }
            }
        }

        fragments
    }

    /// Builds the trailing comment block (`" ; a; b"`), if any register matches.
    pub fn comment(&self, line: &str) -> Option<String> {
        let fragments = self.annotations(line);
        if fragments.is_empty() {
            return None;
        }

        Some(format!(
            "{}{}",
            self.config.comment_marker,
            fragments.join(self.config.separator.as_str())
        ))
    }

    /// Annotates one line. Unmatched lines are returned borrowed and unchanged.
    pub fn annotate_line<'l>(&self, line: &'l str) -> Cow<'l, str> {
        match self.comment(line) {
            None => Cow::Borrowed(line),
            Some(comment) => Cow::Owned(format!(
                "{:<width$}{}",
                line,
                comment,
                width = self.config.min_width
            )),
        }
    }

    /// Writes one raw log line (without its `\n`) plus its comment block and
    /// a newline.
    ///
    /// Matching runs on a lossy UTF-8 view, but the bytes written are the
    /// original ones, so logs with binary noise pass through intact. An
    /// unmatched line is written back byte for byte, `\r` included. On an
    /// annotated line the `\r` moves behind the comment so the line keeps
    /// its CRLF ending. Returns whether the line was annotated.
    pub fn write_annotated<W: Write>(&self, out: &mut W, raw: &[u8]) -> io::Result<bool> {
        let (body, terminator): (&[u8], &[u8]) = match raw.strip_suffix(b"\r") {
            Some(body) => (body, b"\r\n"),
            None => (raw, b"\n"),
        };

        let text = String::from_utf8_lossy(body);
        let Some(comment) = self.comment(&text) else {
            out.write_all(raw)?;
            out.write_all(b"\n")?;
            return Ok(false);
        };

        let pad = self.config.min_width.saturating_sub(text.chars().count());
        out.write_all(body)?;
        write!(out, "{:pad$}{}", "", comment, pad = pad)?;
        out.write_all(terminator)?;

        Ok(true)
    }

    /// Lazily annotates a sequence of lines, one output per input, in order.
    pub fn annotate_lines<I, S>(&self, lines: I) -> impl Iterator<Item = String> + '_
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .map(move |line| self.annotate_line(line.as_ref()).into_owned())
    }
}
