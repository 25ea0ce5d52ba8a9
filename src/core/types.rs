//! CG-001: Catalog data model — aliases, version specs, coordinate entries.
//!
//! Defines the schema types for a version catalog: dot-segmented aliases,
//! literal and rich version constraints, library/plugin/bundle coordinates,
//! and the resolved forms produced by forcing a deferred handle. All model
//! types derive Serialize/Deserialize for JSON roundtripping.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{CatalogError, Result};

// ============================================================================
// Aliases
// ============================================================================

/// A validated, dot-segmented catalog alias (e.g. `kotlinx.coroutines.debug`).
///
/// Segments are lowercase alphanumeric with interior dashes. An alias is
/// unique within its catalog section and immutable once declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alias(String);

impl Alias {
    /// Parse and validate a raw alias string.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(CatalogError::InvalidAlias {
                alias: raw.to_string(),
                reason: "alias must not be empty".to_string(),
            });
        }
        for segment in raw.split('.') {
            validate_segment(raw, segment)?;
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dot-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.0.split('.').count()
    }

    /// Last segment — the leaf name under the enclosing group.
    pub fn leaf(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Whether this alias sits directly or transitively under `prefix`.
    /// The empty prefix contains every alias.
    pub fn is_within(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return true;
        }
        self.0
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

fn validate_segment(alias: &str, segment: &str) -> Result<()> {
    let fail = |reason: String| {
        Err(CatalogError::InvalidAlias {
            alias: alias.to_string(),
            reason,
        })
    };
    if segment.is_empty() {
        return fail("empty segment".to_string());
    }
    if !segment.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return fail(format!(
            "segment '{}' must start with a lowercase letter or digit",
            segment
        ));
    }
    if segment.ends_with('-') {
        return fail(format!("segment '{}' must not end with a dash", segment));
    }
    for c in segment.chars() {
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            return fail(format!(
                "segment '{}' contains illegal character '{}'",
                segment, c
            ));
        }
    }
    Ok(())
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Alias {
    type Error = CatalogError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.0
    }
}

// ============================================================================
// Sections
// ============================================================================

/// The four catalog sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Libraries,
    Versions,
    Bundles,
    Plugins,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Libraries => write!(f, "libraries"),
            Self::Versions => write!(f, "versions"),
            Self::Bundles => write!(f, "bundles"),
            Self::Plugins => write!(f, "plugins"),
        }
    }
}

// ============================================================================
// Version constraints
// ============================================================================

/// A version constraint — a single literal or a rich constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionSpec {
    /// A single required version, e.g. `"3.0.2"`.
    Literal(String),

    /// A rich constraint. Any subset of fields may be set.
    Rich {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        require: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        strictly: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefer: Option<String>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        reject: Vec<String>,
    },
}

impl VersionSpec {
    /// A rich constraint with only a required version.
    pub fn require(version: &str) -> Self {
        Self::Rich {
            require: Some(version.to_string()),
            strictly: None,
            prefer: None,
            reject: vec![],
        }
    }

    /// A rich constraint with only a strict version.
    pub fn strictly(version: &str) -> Self {
        Self::Rich {
            require: None,
            strictly: Some(version.to_string()),
            prefer: None,
            reject: vec![],
        }
    }

    /// Render as a single version string when the constraint is expressible
    /// as one: a literal, or a rich constraint carrying exactly one of
    /// `require` / `strictly` and nothing else.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Rich {
                require,
                strictly,
                prefer,
                reject,
            } => {
                if prefer.is_some() || !reject.is_empty() {
                    return None;
                }
                match (require, strictly) {
                    (Some(v), None) | (None, Some(v)) => Some(v),
                    _ => None,
                }
            }
        }
    }

    pub fn is_rich(&self) -> bool {
        matches!(self, Self::Rich { .. })
    }
}

impl From<&str> for VersionSpec {
    fn from(version: &str) -> Self {
        Self::Literal(version.to_string())
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{}", v),
            Self::Rich {
                require,
                strictly,
                prefer,
                reject,
            } => {
                let mut parts = Vec::new();
                if let Some(v) = strictly {
                    parts.push(format!("strictly {}", v));
                }
                if let Some(v) = require {
                    parts.push(format!("require {}", v));
                }
                if let Some(v) = prefer {
                    parts.push(format!("prefer {}", v));
                }
                if !reject.is_empty() {
                    parts.push(format!("reject {}", reject.join(", ")));
                }
                write!(f, "{{{}}}", parts.join("; "))
            }
        }
    }
}

/// How a library or plugin names its version: a reference into the
/// `versions` section, or an inline constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionRef {
    Ref {
        #[serde(rename = "ref")]
        alias: Alias,
    },
    Inline(VersionSpec),
}

impl VersionRef {
    /// Reference a version alias declared in the `versions` section.
    pub fn of(alias: &str) -> Result<Self> {
        Ok(Self::Ref {
            alias: Alias::parse(alias)?,
        })
    }

    /// Carry the constraint inline.
    pub fn inline(spec: impl Into<VersionSpec>) -> Self {
        Self::Inline(spec.into())
    }
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ref { alias } => write!(f, "ref:{}", alias),
            Self::Inline(spec) => write!(f, "{}", spec),
        }
    }
}

// ============================================================================
// Coordinate entries
// ============================================================================

/// A library coordinate: group, artifact name, version reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyModel {
    pub group: String,
    pub name: String,
    pub version: VersionRef,
}

/// A plugin coordinate: plugin id plus version reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginModel {
    pub id: String,
    pub version: VersionRef,
}

/// A named list of library aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleModel {
    pub members: Vec<Alias>,
}

/// One catalog entry, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entry", rename_all = "snake_case")]
pub enum CatalogEntry {
    Library(DependencyModel),
    Version(VersionSpec),
    Bundle(BundleModel),
    Plugin(PluginModel),
}

// ============================================================================
// Resolved forms
// ============================================================================

/// A library coordinate with its version reference chased to a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub group: String,
    pub name: String,
    pub version: VersionSpec,
}

impl fmt::Display for ResolvedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version.as_single() {
            Some(v) => write!(f, "{}:{}:{}", self.group, self.name, v),
            None => write!(f, "{}:{}", self.group, self.name),
        }
    }
}

/// A plugin id with its version reference chased to a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPlugin {
    pub id: String,
    pub version: VersionSpec,
}

impl fmt::Display for ResolvedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version.as_single() {
            Some(v) => write!(f, "{}:{}", self.id, v),
            None => write!(f, "{}", self.id),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
