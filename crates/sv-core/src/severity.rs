//! Severity scale shared by rules and CVEs.
//!
//! The backend does not enforce an enum at the boundary, so parsing is
//! case-insensitive and unrecognized values degrade to [`Severity::Unknown`]
//! (rendered with the default color) instead of failing the transform.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Severity levels in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Informational,
    /// Absent or unrecognized severity.
    Unknown,
}

impl Severity {
    /// Parses a severity string case-insensitively; anything unrecognized
    /// (including `None`) becomes [`Severity::Unknown`].
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Severity::Unknown;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "informational" | "info" => Severity::Informational,
            _ => Severity::Unknown,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Informational => "informational",
            Severity::Unknown => "unknown",
        }
    }

    /// Display color for badges and charts.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Critical => "#dc2626",
            Severity::High => "#ea580c",
            Severity::Medium => "#f59e0b",
            Severity::Low => "#3b82f6",
            Severity::Informational => "#8b5cf6",
            Severity::Unknown => "#6b7280",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Severity::parse(Some(&raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(Severity::parse(Some("CRITICAL")), Severity::Critical);
        assert_eq!(Severity::parse(Some("High")), Severity::High);
        assert_eq!(Severity::parse(Some(" medium ")), Severity::Medium);
    }

    #[test]
    fn test_parse_info_alias() {
        assert_eq!(Severity::parse(Some("info")), Severity::Informational);
        assert_eq!(
            Severity::parse(Some("informational")),
            Severity::Informational
        );
    }

    #[test]
    fn test_invalid_degrades_to_unknown() {
        assert_eq!(Severity::parse(None), Severity::Unknown);
        assert_eq!(Severity::parse(Some("")), Severity::Unknown);
        assert_eq!(Severity::parse(Some("catastrophic")), Severity::Unknown);
        assert_eq!(Severity::parse(Some("catastrophic")).color(), "#6b7280");
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"high\"");
        let back: Severity = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(back, Severity::High);
    }

    #[test]
    fn test_deserialize_unrecognized() {
        let parsed: Severity = serde_json::from_str("\"weird\"").unwrap();
        assert_eq!(parsed, Severity::Unknown);
    }
}
