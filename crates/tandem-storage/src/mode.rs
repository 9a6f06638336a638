//! Storage area selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which storage area an operation targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// The durable area. Survives restarts.
    Local,
    /// The session area. Dropped when the session ends.
    #[default]
    Session,
}

impl StorageMode {
    /// The mode's canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "session" => Ok(Self::Session),
            other => Err(format!(
                "unknown storage mode '{other}'; expected 'local' or 'session'"
            )),
        }
    }
}

/// Which storage areas a clear operation empties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearTarget {
    /// Only the durable area.
    Local,
    /// Only the session area.
    Session,
    /// Both areas.
    All,
}

impl ClearTarget {
    /// The target's canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Session => "session",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ClearTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StorageMode> for ClearTarget {
    fn from(mode: StorageMode) -> Self {
        match mode {
            StorageMode::Local => Self::Local,
            StorageMode::Session => Self::Session,
        }
    }
}

impl FromStr for ClearTarget {
    type Err = std::convert::Infallible;

    /// Anything other than `local` or `session` targets both areas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "local" => Self::Local,
            "session" => Self::Session,
            _ => Self::All,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_session() {
        assert_eq!(StorageMode::default(), StorageMode::Session);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("local".parse::<StorageMode>().unwrap(), StorageMode::Local);
        assert_eq!(
            "session".parse::<StorageMode>().unwrap(),
            StorageMode::Session
        );
        assert!("durable".parse::<StorageMode>().is_err());
    }

    #[test]
    fn test_clear_target_parse_falls_back_to_all() {
        assert_eq!("local".parse::<ClearTarget>().unwrap(), ClearTarget::Local);
        assert_eq!(
            "session".parse::<ClearTarget>().unwrap(),
            ClearTarget::Session
        );
        assert_eq!("all".parse::<ClearTarget>().unwrap(), ClearTarget::All);
        assert_eq!("both".parse::<ClearTarget>().unwrap(), ClearTarget::All);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&StorageMode::Local).unwrap(),
            "\"local\""
        );
        let target: ClearTarget = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(target, ClearTarget::All);
    }

    #[test]
    fn test_display() {
        assert_eq!(StorageMode::Session.to_string(), "session");
        assert_eq!(ClearTarget::from(StorageMode::Local).to_string(), "local");
    }
}
