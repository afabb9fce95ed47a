//! Severity scale definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered verbosity scale: `error < warn < log < debug < verbose`.
///
/// `None` sits outside the scale. As a filter it disables a sink entirely,
/// and a record can never carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Error,
    Warn,
    #[default]
    Log,
    Debug,
    Verbose,
}

impl Severity {
    /// Every severity that a record may carry, least verbose first.
    pub const EMITTABLE: [Severity; 5] = [
        Severity::Error,
        Severity::Warn,
        Severity::Log,
        Severity::Debug,
        Severity::Verbose,
    ];

    /// Comparison rank, increasing with verbosity. `None` has no rank.
    #[inline]
    pub fn rank(&self) -> Option<u8> {
        match self {
            Severity::None => None,
            Severity::Error => Some(0),
            Severity::Warn => Some(1),
            Severity::Log => Some(2),
            Severity::Debug => Some(3),
            Severity::Verbose => Some(4),
        }
    }

    /// Whether a record at `self` passes a filter set to `filter`.
    ///
    /// The filter is an inclusive verbosity ceiling: a `debug` filter lets
    /// `error`, `warn`, `log` and `debug` through and blocks `verbose`.
    /// Always false when either side is `None`.
    ///
    /// ```
    /// use axe_logger::Severity;
    ///
    /// assert!(Severity::Log.satisfies(Severity::Debug));
    /// assert!(!Severity::Debug.satisfies(Severity::Log));
    /// assert!(!Severity::Error.satisfies(Severity::None));
    /// ```
    #[inline]
    pub fn satisfies(self, filter: Severity) -> bool {
        match (self.rank(), filter.rank()) {
            (Some(level), Some(ceiling)) => level <= ceiling,
            _ => false,
        }
    }

    /// The less permissive of two filter values. `None` is stricter than `Error`.
    #[inline]
    pub fn stricter(a: Severity, b: Severity) -> Severity {
        match (a.rank(), b.rank()) {
            (None, _) => a,
            (_, None) => b,
            (Some(ra), Some(rb)) => {
                if ra <= rb {
                    a
                } else {
                    b
                }
            }
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Log => "LOG",
            Severity::Debug => "DEBUG",
            Severity::Verbose => "VERBOSE",
        }
    }

    /// Upper-case name left-aligned to five columns (`VERBOSE` keeps all seven).
    pub fn padded_name(&self) -> &'static str {
        match self {
            Severity::None => "NONE ",
            Severity::Error => "ERROR",
            Severity::Warn => "WARN ",
            Severity::Log => "LOG  ",
            Severity::Debug => "DEBUG",
            Severity::Verbose => "VERBOSE",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Severity::None)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NONE" => Ok(Severity::None),
            "ERROR" => Ok(Severity::Error),
            "WARN" | "WARNING" => Ok(Severity::Warn),
            "LOG" => Ok(Severity::Log),
            "DEBUG" => Ok(Severity::Debug),
            "VERBOSE" => Ok(Severity::Verbose),
            _ => Err(format!("Invalid severity: '{}'", s)),
        }
    }
}
