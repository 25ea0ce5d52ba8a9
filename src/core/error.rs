//! CG-002: Typed catalog errors.

use thiserror::Error;

use super::types::Section;

/// Errors raised while building a catalog store or resolving against it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Lookup or tree construction named an alias the store does not hold.
    /// At construction time this signals a stale accessor tree.
    #[error("unknown alias '{alias}' in {section} section")]
    UnknownAlias { section: Section, alias: String },

    /// The alias string is malformed.
    #[error("invalid alias '{alias}': {reason}")]
    InvalidAlias { alias: String, reason: String },

    /// An alias was declared twice within one section.
    #[error("duplicate alias '{alias}' in {section} section")]
    DuplicateAlias { section: Section, alias: String },

    /// A library or plugin references a version alias that was never declared.
    #[error("'{alias}' references undeclared version '{version_ref}'")]
    DanglingVersionRef { alias: String, version_ref: String },

    /// A bundle names a library alias that was never declared.
    #[error("bundle '{alias}' references undeclared library '{member}'")]
    UnknownBundleMember { alias: String, member: String },

    /// A bundle with no members.
    #[error("bundle '{alias}' has no members")]
    EmptyBundle { alias: String },

    /// A leaf accessor was registered under a group whose namespace prefix
    /// does not contain its alias.
    #[error("leaf alias '{alias}' escapes accessor group '{group}'")]
    AliasOutsideGroup { group: String, alias: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
