//! Ordered list of connected participant names

use crate::error::ProtocolError;

const SEPARATOR: char = ',';

/// Ordered participant names, stored comma-joined
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster(Vec<String>);

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster holding exactly one name
    pub fn single(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    /// Decode the stored form; empty segments are dropped
    pub fn parse(raw: &str) -> Self {
        raw.split(SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn encode(&self) -> String {
        self.0.join(&SEPARATOR.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn push(&mut self, name: &str) {
        self.0.push(name.to_string());
    }

    /// Every name except `name`, in roster order
    pub fn without(&self, name: &str) -> Roster {
        self.0.iter().filter(|n| *n != name).cloned().collect()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl FromIterator<String> for Roster {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for Roster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// Check that a name can live in a roster
pub fn validate_name(name: &str) -> Result<(), ProtocolError> {
    let reason = if name.is_empty() {
        Some("name must not be empty")
    } else if name.contains(SEPARATOR) {
        Some("name must not contain ','")
    } else if name.trim() != name {
        Some("name must not start or end with whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ProtocolError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_encode() {
        let roster = Roster::parse("alice,bob");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.first(), Some("alice"));
        assert_eq!(roster.encode(), "alice,bob");
    }

    #[test]
    fn test_parse_empty() {
        assert!(Roster::parse("").is_empty());
        assert!(Roster::parse(",").is_empty());
        assert_eq!(Roster::new().encode(), "");
    }

    #[test]
    fn test_without_keeps_order() {
        let mut roster = Roster::single("alice");
        roster.push("bob");
        assert_eq!(roster.without("alice"), Roster::single("bob"));
        assert_eq!(roster.without("carol"), roster);
        assert!(roster.contains("bob"));
        assert!(!roster.contains("bo"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("alice").is_ok());
        assert!(validate_name("Mary Ann").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a,b").is_err());
        assert!(validate_name(" alice").is_err());
    }
}
