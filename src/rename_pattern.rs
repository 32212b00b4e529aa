//! Rename templates for bulk renaming.
//!
//! A template is literal text with two placeholders:
//! - `{}` is replaced by the entry's original name (extension included)
//! - `{n}` is replaced by the entry's zero-based position in the batch
//!
//! The template is parsed once, so text coming from an original name is never
//! re-read as a placeholder.
//!
//! # Examples
//!
//! ```
//! use dirsort::rename_pattern::RenamePattern;
//!
//! let pattern = RenamePattern::parse("holiday_{n}").unwrap();
//! assert_eq!(pattern.render("IMG_001.jpg", 3, Some("jpg")), "holiday_3.jpg");
//! ```

use crate::file_organizer::OrganizeError;
use std::fmt;

const NAME_PLACEHOLDER: &str = "{}";
const INDEX_PLACEHOLDER: &str = "{n}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Name,
    Index,
}

/// A parsed rename template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePattern {
    segments: Vec<Segment>,
}

impl RenamePattern {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::InvalidArgument` if the template is empty or contains a
    /// path separator.
    pub fn parse(pattern: &str) -> Result<Self, OrganizeError> {
        if pattern.is_empty() {
            return Err(OrganizeError::InvalidArgument(
                "rename pattern must not be empty".to_string(),
            ));
        }
        if pattern.chars().any(std::path::is_separator) {
            return Err(OrganizeError::InvalidArgument(format!(
                "rename pattern '{}' must not contain a path separator",
                pattern
            )));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            rest = &rest[open..];

            let placeholder = if rest.starts_with(NAME_PLACEHOLDER) {
                Some((Segment::Name, NAME_PLACEHOLDER.len()))
            } else if rest.starts_with(INDEX_PLACEHOLDER) {
                Some((Segment::Index, INDEX_PLACEHOLDER.len()))
            } else {
                None
            };

            match placeholder {
                Some((segment, len)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    rest = &rest[len..];
                }
                None => {
                    literal.push('{');
                    rest = &rest[1..];
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub fn has_name(&self) -> bool {
        self.segments.contains(&Segment::Name)
    }

    pub fn has_index(&self) -> bool {
        self.segments.contains(&Segment::Index)
    }

    /// Appends an index placeholder at the end of the template.
    pub fn with_index_suffix(mut self) -> Self {
        self.segments.push(Segment::Index);
        self
    }

    /// Renders the new name for one entry. `extension` (without its dot) is appended
    /// last, unchanged.
    pub fn render(&self, original_name: &str, index: usize, extension: Option<&str>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Name => out.push_str(original_name),
                Segment::Index => out.push_str(&index.to_string()),
            }
        }
        if let Some(extension) = extension {
            out.push('.');
            out.push_str(extension);
        }
        out
    }
}

impl fmt::Display for RenamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Name => f.write_str(NAME_PLACEHOLDER)?,
                Segment::Index => f.write_str(INDEX_PLACEHOLDER)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_then_index_then_extension() {
        let pattern = RenamePattern::parse("track_{}").unwrap().with_index_suffix();
        assert_eq!(pattern.render("a.txt", 0, Some("txt")), "track_a.txt0.txt");
        assert_eq!(pattern.render("b.txt", 1, Some("txt")), "track_b.txt1.txt");
    }

    #[test]
    fn test_index_placeholder() {
        let pattern = RenamePattern::parse("photo-{n}-final").unwrap();
        assert!(pattern.has_index());
        assert!(!pattern.has_name());
        assert_eq!(pattern.render("x.png", 12, Some("png")), "photo-12-final.png");
    }

    #[test]
    fn test_no_extension_appends_nothing() {
        let pattern = RenamePattern::parse("dir_{n}").unwrap();
        assert_eq!(pattern.render("holidays", 2, None), "dir_2");
    }

    #[test]
    fn test_unknown_braces_are_literal() {
        let pattern = RenamePattern::parse("{x}_{}_{").unwrap();
        assert_eq!(pattern.render("a", 0, None), "{x}_a_{");
        assert_eq!(pattern.to_string(), "{x}_{}_{");
    }

    #[test]
    fn test_placeholders_in_original_name_are_not_expanded() {
        let pattern = RenamePattern::parse("{}-{n}").unwrap();
        assert_eq!(pattern.render("{n}.txt", 5, Some("txt")), "{n}.txt-5.txt");
    }

    #[test]
    fn test_plain_pattern_has_no_placeholders() {
        let pattern = RenamePattern::parse("file").unwrap();
        assert!(!pattern.has_index());
        assert!(!pattern.has_name());
        assert_eq!(pattern.clone().with_index_suffix().render("a.md", 4, Some("md")), "file4.md");
        assert_eq!(pattern.render("a.md", 4, Some("md")), "file.md");
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(
            RenamePattern::parse(""),
            Err(OrganizeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_separator_rejected() {
        assert!(matches!(
            RenamePattern::parse("sub/{n}"),
            Err(OrganizeError::InvalidArgument(_))
        ));
    }
}
