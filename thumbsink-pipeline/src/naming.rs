//! Numbered file naming policy for the sink stage.

use crate::error::{PipelineError, Result};

/// A printf-style numbered filename template, e.g. `thumb-%05d.jpg`.
///
/// The template must contain exactly one `%d` or `%0<width>d` field. Each
/// rendered index is zero-padded to the field width, so successive indices
/// yield strictly increasing names with no gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    prefix: String,
    pad_width: usize,
    suffix: String,
}

impl NamingPolicy {
    /// Parse a template into a naming policy.
    pub fn parse(template: &str) -> Result<Self> {
        let start = template.find('%').ok_or_else(|| {
            PipelineError::InvalidConfig(format!(
                "naming template {template:?} has no %d index field"
            ))
        })?;

        let rest = &template[start + 1..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        let after_digits = &rest[digits.len()..];

        if !after_digits.starts_with('d') {
            return Err(PipelineError::InvalidConfig(format!(
                "naming template {template:?} has no %d index field"
            )));
        }
        if !digits.is_empty() && !digits.starts_with('0') {
            return Err(PipelineError::InvalidConfig(format!(
                "naming template {template:?}: index field must be %d or %0<width>d"
            )));
        }

        let suffix = &after_digits[1..];
        if suffix.contains('%') {
            return Err(PipelineError::InvalidConfig(format!(
                "naming template {template:?} has more than one field"
            )));
        }

        Ok(Self {
            prefix: template[..start].to_string(),
            pad_width: digits.parse().unwrap_or(0),
            suffix: suffix.to_string(),
        })
    }

    /// Render the filename for an index.
    pub fn render(&self, index: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.suffix,
            width = self.pad_width
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template() {
        let policy = NamingPolicy::parse("thumb-%05d.jpg").unwrap();
        assert_eq!(policy.render(0), "thumb-00000.jpg");
        assert_eq!(policy.render(42), "thumb-00042.jpg");
        assert_eq!(policy.render(123456), "thumb-123456.jpg");
    }

    #[test]
    fn test_unpadded_field() {
        let policy = NamingPolicy::parse("frame%d.jpg").unwrap();
        assert_eq!(policy.render(0), "frame0.jpg");
        assert_eq!(policy.render(10), "frame10.jpg");
    }

    #[test]
    fn test_names_strictly_increase() {
        let policy = NamingPolicy::parse("out-%03d.jpg").unwrap();
        let names: Vec<String> = (0..20).map(|i| policy.render(i)).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_missing_field_rejected() {
        assert!(matches!(
            NamingPolicy::parse("thumbnail.jpg"),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            NamingPolicy::parse("thumb-%s.jpg"),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_multiple_fields_rejected() {
        assert!(NamingPolicy::parse("a-%d-%d.jpg").is_err());
    }

    #[test]
    fn test_unpadded_width_rejected() {
        assert!(NamingPolicy::parse("a-%5d.jpg").is_err());
    }
}
