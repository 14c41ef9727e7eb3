//! Log level threshold

use std::fmt;
use std::str::FromStr;

/// Severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// Whether a message at `self` passes a `threshold`
    pub fn allows(self, threshold: Self) -> bool {
        self <= threshold
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("INFO".parse::<Level>(), Ok(Level::Info));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(" debug ".parse::<Level>(), Ok(Level::Debug));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_threshold() {
        assert!(Level::Error.allows(Level::Info));
        assert!(Level::Info.allows(Level::Info));
        assert!(!Level::Debug.allows(Level::Info));
        assert!(!Level::Info.allows(Level::Warn));
    }
}
