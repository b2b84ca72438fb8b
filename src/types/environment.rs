// ABOUTME: Blue/green environment identifier.
// ABOUTME: Exactly two symmetric environments; one is live while the other is idle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown environment '{0}' (expected 'blue' or 'green')")]
pub struct ParseEnvironmentError(String);

/// One of the two production environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Blue,
    Green,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Blue, Environment::Green];

    /// The opposite color. Toggling twice returns the original environment.
    pub fn other(self) -> Self {
        match self {
            Environment::Blue => Environment::Green,
            Environment::Green => Environment::Blue,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Blue => "blue",
            Environment::Green => "green",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blue" => Ok(Environment::Blue),
            "green" => Ok(Environment::Green),
            _ => Err(ParseEnvironmentError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_toggles_between_colors() {
        assert_eq!(Environment::Blue.other(), Environment::Green);
        assert_eq!(Environment::Green.other(), Environment::Blue);
        assert_eq!(Environment::Blue.other().other(), Environment::Blue);
    }

    #[test]
    fn default_is_blue() {
        assert_eq!(Environment::default(), Environment::Blue);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Environment::Green).unwrap(),
            "\"green\""
        );
        let parsed: Environment = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(parsed, Environment::Blue);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("GREEN".parse::<Environment>().unwrap(), Environment::Green);
        assert!("purple".parse::<Environment>().is_err());
    }
}
