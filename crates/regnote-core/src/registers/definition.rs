//! Matcher for the register definition literal.
//!
//! The firmware source describes its registers as rows of a C initializer
//! table. Only one shape is recognized:
//!
//! ```text
//!     {0xC0F0,   0x8014, 0, "DARK_LIMIT_14_12 (0x0000 - 0x0FFF)"},
//!     {DST_ADTG, 0x8882, 0, "Digital gain (per column maybe)"}, /* note */
//! ```
//!
//! Leading blanks, an opening brace, three comma-separated tokens
//! (destination, register, flag), a comma, a quoted description and a
//! closing brace. Everything after the last `"}` is ignored. Any other line
//! yields `None`; the source grammar is never parsed beyond this.

use std::borrow::Cow;

/// Fields recognized on a single definition line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition<'a> {
    /// Destination token, trimmed (`0xC0F0`, `DST_ADTG`, ...)
    pub destination: &'a str,
    /// Register token, trimmed
    pub register: &'a str,
    /// Flag token, trimmed. Recognized but not used.
    pub flag: &'a str,
    /// Description with escaped quotes resolved
    pub description: Cow<'a, str>,
}

impl Definition<'_> {
    /// True when the destination token is a literal ENGIO base address
    pub fn has_literal_destination(&self) -> bool {
        self.destination.starts_with("0x")
    }
}

/// Matches a line against the definition literal shape.
pub fn parse_definition_line(line: &str) -> Option<Definition<'_>> {
    let rest = line.trim_start_matches([' ', '\t']).strip_prefix('{')?;

    let mut fields = rest.splitn(4, ',');
    let destination = fields.next()?;
    let register = fields.next()?;
    let flag = fields.next()?;
    let tail = fields.next()?;

    let quoted = tail.trim_start_matches(' ').strip_prefix('"')?;
    let end = quoted.rfind("\"}")?;

    Some(Definition {
        destination: destination.trim(),
        register: register.trim(),
        flag: flag.trim(),
        description: unescape(&quoted[..end]),
    })
}

/// Parses a hexadecimal token, with or without a `0x` prefix.
pub fn parse_hex(token: &str) -> Option<u32> {
    let token = token.trim();
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    u32::from_str_radix(digits, 16).ok()
}

/// Resolves `\"` and `\\` inside a C string literal body.
fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engio_line() {
        let line = r#"    {0xC0F0,   0x8014, 0, "DARK_LIMIT_14_12"},"#;
        let def = parse_definition_line(line).unwrap();
        assert_eq!(def.destination, "0xC0F0");
        assert_eq!(def.register, "0x8014");
        assert_eq!(def.flag, "0");
        assert_eq!(def.description, "DARK_LIMIT_14_12");
        assert!(def.has_literal_destination());
    }

    #[test]
    fn test_trailing_comment_and_commas() {
        let line = r#"    {DST_ADTG, 0x8882, 0, "Digital gain (per column, maybe)"}, /* ? */"#;
        let def = parse_definition_line(line).unwrap();
        assert_eq!(def.destination, "DST_ADTG");
        assert_eq!(def.description, "Digital gain (per column, maybe)");
        assert!(!def.has_literal_destination());
    }

    #[test]
    fn test_escaped_quotes() {
        let def = parse_definition_line(r#"{DST_CMOS, 7, 0, "the \"dying\" cmos"},"#).unwrap();
        assert_eq!(def.description, r#"the "dying" cmos"#);
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(parse_definition_line("#define DST_ADTG 0x000F").is_none());
        assert!(parse_definition_line("    {DST_ADTG, 0x8882, \"no flag\"},").is_none());
        assert!(parse_definition_line("    {DST_ADTG, 0x8882, 0, unquoted},").is_none());
        assert!(parse_definition_line("    {DST_ADTG, 0x8882, 0, \"unterminated").is_none());
        assert!(parse_definition_line("").is_none());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex(" 0x8014 "), Some(0x8014));
        assert_eq!(parse_hex("0X7aec"), Some(0x7AEC));
        assert_eq!(parse_hex("7"), Some(7));
        assert_eq!(parse_hex("10"), Some(0x10));
        assert_eq!(parse_hex("0x"), None);
        assert_eq!(parse_hex("+5"), None);
        assert_eq!(parse_hex("DST_ADTG"), None);
        assert_eq!(parse_hex("0x100000000"), None);
    }
}
