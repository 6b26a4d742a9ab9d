//! Version reconciliation across source packages.
//!
//! Tracks the running minimum engine version (which only ever rises) and the
//! highest version requested for each named dependency module.

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Minimum engine version every merged pack declares at least.
pub const BASELINE_ENGINE_VERSION: EngineVersion = EngineVersion([1, 21, 50]);

/// A `[major, minor, patch]` engine version, compared numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EngineVersion(pub [u32; 3]);

impl EngineVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self([major, minor, patch])
    }

    /// Read `[1, 21, 50]` or `"1.21.50"`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(parts) => {
                if parts.len() != 3 {
                    return None;
                }
                let mut out = [0u32; 3];
                for (slot, part) in out.iter_mut().zip(parts) {
                    *slot = u32::try_from(part.as_u64()?).ok()?;
                }
                Some(Self(out))
            }
            Value::String(s) => {
                let v = parse_loose(s)?;
                Some(Self::new(
                    u32::try_from(v.major).ok()?,
                    u32::try_from(v.minor).ok()?,
                    u32::try_from(v.patch).ok()?,
                ))
            }
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::from(self.0.to_vec())
    }
}

impl Default for EngineVersion {
    fn default() -> Self {
        BASELINE_ENGINE_VERSION
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0[0], self.0[1], self.0[2])
    }
}

/// Parse a dependency version from a manifest: `"1.3.0"`, `"1.8.0-beta"` or `[1, 3, 0]`.
pub fn parse_dependency_version(value: &Value) -> Option<Version> {
    match value {
        Value::String(s) => parse_loose(s),
        Value::Array(parts) if parts.len() == 3 => {
            let mut nums = parts.iter().map(Value::as_u64);
            Some(Version::new(nums.next()??, nums.next()??, nums.next()??))
        }
        _ => None,
    }
}

/// Semver parse that also accepts `1.2` as `1.2.0`.
fn parse_loose(s: &str) -> Option<Version> {
    let s = s.trim();
    if let Ok(v) = Version::parse(s) {
        return Some(v);
    }
    let (core, pre) = match s.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (s, None),
    };
    if core.split('.').count() != 2 {
        return None;
    }
    let padded = match pre {
        Some(pre) => format!("{core}.0-{pre}"),
        None => format!("{core}.0"),
    };
    Version::parse(&padded).ok()
}

/// Caret compatibility: same major version and not lower.
pub fn is_caret_compatible(previous: &Version, incoming: &Version) -> bool {
    incoming.major == previous.major && incoming >= previous
}

/// An incoming dependency version that does not satisfy `^previous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConflict {
    pub module_name: String,
    pub previous: Version,
    pub incoming: Version,
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dependency {} requested at {} is not compatible with previously seen {}; \
             this may cause errors",
            self.module_name, self.incoming, self.previous
        )
    }
}

/// Running version state for one merge run.
#[derive(Debug, Clone, Default)]
pub struct VersionState {
    min_engine: EngineVersion,
    dependencies: BTreeMap<String, Version>,
}

impl VersionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_engine_version(&self) -> EngineVersion {
        self.min_engine
    }

    /// Reconciled dependency versions, sorted by module name.
    pub fn dependencies(&self) -> &BTreeMap<String, Version> {
        &self.dependencies
    }

    /// Raise the minimum engine version if `declared` is greater.
    pub fn observe_engine(&mut self, declared: EngineVersion) {
        if declared > self.min_engine {
            self.min_engine = declared;
        }
    }

    /// Record a dependency request, keeping the greater version.
    ///
    /// Returns a conflict when `incoming` is not caret-compatible with the
    /// version recorded before this call.
    pub fn observe_dependency(
        &mut self,
        module_name: &str,
        incoming: Version,
    ) -> Option<VersionConflict> {
        let Some(previous) = self.dependencies.get(module_name).cloned() else {
            self.dependencies.insert(module_name.to_string(), incoming);
            return None;
        };

        let conflict = (!is_caret_compatible(&previous, &incoming)).then(|| VersionConflict {
            module_name: module_name.to_string(),
            previous: previous.clone(),
            incoming: incoming.clone(),
        });

        if incoming > previous {
            self.dependencies.insert(module_name.to_string(), incoming);
        }

        conflict
    }
}
