//! Source identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigurationError;

/// Which job site produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceId {
    /// hellowork.com: server-rendered search pages.
    #[serde(rename = "hellowork", alias = "hello_work")]
    HelloWork,
    /// welcometothejungle.com: script-rendered search pages.
    #[serde(rename = "wttj", alias = "welcome_to_the_jungle")]
    WelcomeToTheJungle,
}

impl SourceId {
    /// All known sources, in a stable order.
    pub const ALL: [Self; 2] = [Self::HelloWork, Self::WelcomeToTheJungle];

    /// Short identifier used in configuration, logs, and summaries.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HelloWork => "hellowork",
            Self::WelcomeToTheJungle => "wttj",
        }
    }

    /// Human-readable site name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HelloWork => "HelloWork",
            Self::WelcomeToTheJungle => "Welcome to the Jungle",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hellowork" | "hello_work" => Ok(Self::HelloWork),
            "wttj" | "welcome_to_the_jungle" | "welcometothejungle" => Ok(Self::WelcomeToTheJungle),
            other => Err(ConfigurationError::new(format!("Unknown source '{other}'"))
                .with_field("sources")
                .with_fix_hint("Use one of: hellowork, wttj.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_round_trips_through_str() {
        for source in SourceId::ALL {
            assert_eq!(source.as_str().parse::<SourceId>(), Ok(source));
        }
    }

    #[test]
    fn test_source_id_aliases() {
        assert_eq!("HelloWork".parse::<SourceId>(), Ok(SourceId::HelloWork));
        assert_eq!(
            "welcome_to_the_jungle".parse::<SourceId>(),
            Ok(SourceId::WelcomeToTheJungle)
        );
    }

    #[test]
    fn test_unknown_source_is_configuration_error() {
        let err = "indeed".parse::<SourceId>().unwrap_err();
        assert_eq!(err.field.as_deref(), Some("sources"));
    }

    #[test]
    fn test_source_id_serde() {
        assert_eq!(serde_json::to_string(&SourceId::WelcomeToTheJungle).unwrap(), "\"wttj\"");
        assert_eq!(serde_json::to_string(&SourceId::HelloWork).unwrap(), "\"hellowork\"");
        let parsed: SourceId = serde_json::from_str("\"hello_work\"").unwrap();
        assert_eq!(parsed, SourceId::HelloWork);
    }
}
