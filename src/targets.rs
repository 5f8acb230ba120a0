//! Target triple catalog.
//!
//! The set of buildable triples is fixed. Each entry carries an `enabled`
//! flag; disabled entries are declared so they can be switched on through
//! configuration, but they are not built by default.

use std::fmt;

use crate::error::ReleaseError;

/// An os/architecture/libc combination, e.g. `x86_64-unknown-linux-gnu`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetTriple(String);

impl TargetTriple {
    pub fn new(triple: &str) -> Self {
        Self(triple.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetEntry {
    pub triple: &'static str,
    pub enabled: bool,
}

/// Every triple this tool knows how to build, in build order.
pub const TARGET_CATALOG: &[TargetEntry] = &[
    TargetEntry {
        triple: "x86_64-pc-windows-gnu",
        enabled: true,
    },
    TargetEntry {
        triple: "x86_64-unknown-linux-gnu",
        enabled: true,
    },
    TargetEntry {
        triple: "x86_64-apple-darwin",
        enabled: true,
    },
    TargetEntry {
        triple: "aarch64-pc-windows-gnu",
        enabled: false,
    },
    TargetEntry {
        triple: "aarch64-unknown-linux-gnu",
        enabled: false,
    },
    TargetEntry {
        triple: "aarch64-apple-darwin",
        enabled: false,
    },
];

/// Ordered catalog with per-entry enablement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    entries: Vec<(TargetTriple, bool)>,
}

impl Default for TargetSet {
    fn default() -> Self {
        Self::from_entries(TARGET_CATALOG)
    }
}

impl TargetSet {
    pub fn from_entries(entries: &[TargetEntry]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|e| (TargetTriple::new(e.triple), e.enabled))
                .collect(),
        }
    }

    /// Flip a catalog entry on or off. Unknown triples are rejected.
    pub fn set_enabled(&mut self, triple: &str, enabled: bool) -> Result<(), ReleaseError> {
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| t.as_str() == triple) {
            entry.1 = enabled;
            return Ok(());
        }
        Err(self.unknown(triple, false))
    }

    /// Narrow the set to a single enabled triple.
    pub fn only(&self, triple: &str) -> Result<Self, ReleaseError> {
        let Some((found, _)) = self
            .entries
            .iter()
            .find(|(t, enabled)| *enabled && t.as_str() == triple)
        else {
            return Err(self.unknown(triple, true));
        };
        Ok(Self {
            entries: vec![(found.clone(), true)],
        })
    }

    /// Find any catalog triple, enabled or not.
    pub fn lookup(&self, triple: &str) -> Result<TargetTriple, ReleaseError> {
        self.entries
            .iter()
            .find(|(t, _)| t.as_str() == triple)
            .map(|(t, _)| t.clone())
            .ok_or_else(|| self.unknown(triple, false))
    }

    /// Triples to build, in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = &TargetTriple> {
        self.entries
            .iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(t, _)| t)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&TargetTriple, bool)> {
        self.entries.iter().map(|(t, enabled)| (t, *enabled))
    }

    fn unknown(&self, triple: &str, enabled_only: bool) -> ReleaseError {
        ReleaseError::UnknownTarget {
            triple: triple.to_string(),
            expected: self
                .entries()
                .filter(|(_, enabled)| *enabled || !enabled_only)
                .map(|(t, _)| t.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
