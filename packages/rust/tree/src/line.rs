//! Line classifier for the mapping tree format.
//!
//! Nesting is encoded purely by leading tabs; the remainder of a line is a
//! space-separated record whose first token names its kind.

use crate::ParseError;

/// Kind of record a line holds, from its first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Class,
    Field,
    Method,
    Arg,
    /// Anything else (`COMMENT`, unknown extensions). Tolerated and skipped.
    Other,
}

/// One classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// Number of leading tab characters.
    pub depth: usize,
    /// Space-separated tokens after the indentation. Never empty.
    pub tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    pub fn kind(&self) -> RecordKind {
        match self.tokens[0] {
            "CLASS" => RecordKind::Class,
            "FIELD" => RecordKind::Field,
            "METHOD" => RecordKind::Method,
            "ARG" => RecordKind::Arg,
            _ => RecordKind::Other,
        }
    }

    /// Token at `index`, if present.
    pub fn token(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }
}

/// Number of leading tabs of a raw line, whether or not it holds a record.
pub fn depth_of(raw: &str) -> usize {
    raw.len() - raw.trim_start_matches('\t').len()
}

/// Classify one raw line. `line_no` is 1-based and only used for errors.
pub fn classify(raw: &str, line_no: usize) -> Result<Line<'_>, ParseError> {
    let raw = raw.strip_suffix('\r').unwrap_or(raw);
    let depth = depth_of(raw);
    let body = &raw[depth..];

    let tokens: Vec<&str> = body.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return Err(ParseError::new(line_no, "line has no tokens"));
    }

    Ok(Line { depth, tokens })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_counts_leading_tabs_only() {
        let line = classify("\t\tFIELD a b I", 1).unwrap();
        assert_eq!(line.depth, 2);
        assert_eq!(line.tokens, vec!["FIELD", "a", "b", "I"]);
        assert_eq!(line.kind(), RecordKind::Field);

        // Spaces are not indentation.
        let line = classify("  CLASS a", 1).unwrap();
        assert_eq!(line.depth, 0);
        assert_eq!(line.kind(), RecordKind::Class);
    }

    #[test]
    fn repeated_spaces_and_crlf_are_tolerated() {
        let line = classify("\tMETHOD  a b ()V\r", 3).unwrap();
        assert_eq!(line.tokens, vec!["METHOD", "a", "b", "()V"]);
    }

    #[test]
    fn empty_lines_are_malformed() {
        let err = classify("", 4).unwrap_err();
        assert_eq!(err.line, 4);
        assert!(classify("\t\t", 5).is_err());
        assert!(classify("   ", 6).is_err());
    }

    #[test]
    fn unknown_records_classify_as_other() {
        let line = classify("\tCOMMENT some text", 1).unwrap();
        assert_eq!(line.kind(), RecordKind::Other);
        assert_eq!(line.token(1), Some("some"));
        assert_eq!(line.token(9), None);
    }

    #[test]
    fn depth_is_known_without_tokens() {
        assert_eq!(depth_of(""), 0);
        assert_eq!(depth_of("\t\t"), 2);
        assert!(classify("\t\t", 4).is_err());
    }
}
