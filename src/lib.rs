//! Catalogo — typed accessor trees over version-catalog coordinates.
//!
//! Immutable alias-to-coordinate stores. Deferred resolution. Generic
//! accessor hierarchies instead of hand-written per-namespace classes.

pub mod core;

pub use crate::core::error::{CatalogError, Result};
pub use crate::core::resolve::{Deferred, Resolver};
pub use crate::core::store::{CatalogBuilder, CatalogStore};
pub use crate::core::tree::{AccessorGroup, AccessorTree, LeafBinding};
pub use crate::core::types::{
    Alias, BundleModel, CatalogEntry, DependencyModel, PluginModel, ResolvedDependency,
    ResolvedPlugin, Section, VersionRef, VersionSpec,
};
