//! CG-004: The lookup facility — deferred handles and the alias resolver.
//!
//! Accessor calls hand back a [`Deferred`] rather than an eagerly computed
//! value: nothing is read from the store until the consumer forces the
//! handle. Forcing is a pure read against the immutable store, so handles
//! may be forced concurrently without coordination; a `OnceLock` arbitrates
//! first-force and caches the outcome.

use std::fmt;
use std::sync::{Arc, OnceLock};

use super::error::{CatalogError, Result};
use super::store::CatalogStore;
use super::types::{Alias, ResolvedDependency, ResolvedPlugin, Section, VersionSpec};

// ============================================================================
// Deferred handles
// ============================================================================

type ResolveFn<T> = fn(&CatalogStore, &Alias) -> Result<T>;

/// A lazily-evaluated reference to a resolved coordinate entry.
///
/// Created cheaply by an accessor call; resolution happens on the first
/// [`Deferred::force`] and is cached. Repeated forcing returns the same
/// value (or the same error).
pub struct Deferred<T> {
    store: Arc<CatalogStore>,
    section: Section,
    alias: Alias,
    resolve: ResolveFn<T>,
    cell: OnceLock<Result<T>>,
}

impl<T> Deferred<T> {
    fn new(store: Arc<CatalogStore>, section: Section, alias: Alias, resolve: ResolveFn<T>) -> Self {
        Self {
            store,
            section,
            alias,
            resolve,
            cell: OnceLock::new(),
        }
    }

    /// The alias this handle will resolve.
    pub fn alias(&self) -> &Alias {
        &self.alias
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Resolve on first use, then serve the cached outcome.
    pub fn force(&self) -> Result<&T> {
        self.cell
            .get_or_init(|| (self.resolve)(&self.store, &self.alias))
            .as_ref()
            .map_err(CatalogError::clone)
    }

    /// Whether the handle has been forced yet.
    pub fn is_forced(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("section", &self.section)
            .field("alias", &self.alias)
            .field("forced", &self.cell.get())
            .finish()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// The generic resolve-by-alias facility accessor trees delegate to.
///
/// Handle creation never touches the store; an absent alias surfaces as
/// [`CatalogError::UnknownAlias`] when the handle is forced.
#[derive(Debug, Clone)]
pub struct Resolver {
    store: Arc<CatalogStore>,
}

impl Resolver {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Deferred library coordinate with its version reference chased.
    pub fn dependency(&self, alias: Alias) -> Deferred<ResolvedDependency> {
        Deferred::new(
            Arc::clone(&self.store),
            Section::Libraries,
            alias,
            resolve_dependency,
        )
    }

    /// Deferred version string. Forcing yields the single version string,
    /// or `""` when a rich constraint is not expressible as one.
    pub fn version(&self, alias: Alias) -> Deferred<String> {
        Deferred::new(
            Arc::clone(&self.store),
            Section::Versions,
            alias,
            resolve_version,
        )
    }

    /// Deferred plugin coordinate with its version reference chased.
    pub fn plugin(&self, alias: Alias) -> Deferred<ResolvedPlugin> {
        Deferred::new(
            Arc::clone(&self.store),
            Section::Plugins,
            alias,
            resolve_plugin,
        )
    }

    /// Deferred bundle — member coordinates in declaration order.
    pub fn bundle(&self, alias: Alias) -> Deferred<Vec<ResolvedDependency>> {
        Deferred::new(
            Arc::clone(&self.store),
            Section::Bundles,
            alias,
            resolve_bundle,
        )
    }
}

fn resolve_dependency(store: &CatalogStore, alias: &Alias) -> Result<ResolvedDependency> {
    let dep = store.library(alias)?;
    let version = store.resolve_ref(alias, &dep.version)?.clone();
    Ok(ResolvedDependency {
        group: dep.group.clone(),
        name: dep.name.clone(),
        version,
    })
}

fn resolve_version(store: &CatalogStore, alias: &Alias) -> Result<String> {
    let spec: &VersionSpec = store.version(alias)?;
    // Rich constraints without a single-string form degrade to "".
    Ok(spec.as_single().unwrap_or_default().to_string())
}

fn resolve_plugin(store: &CatalogStore, alias: &Alias) -> Result<ResolvedPlugin> {
    let plugin = store.plugin(alias)?;
    let version = store.resolve_ref(alias, &plugin.version)?.clone();
    Ok(ResolvedPlugin {
        id: plugin.id.clone(),
        version,
    })
}

fn resolve_bundle(store: &CatalogStore, alias: &Alias) -> Result<Vec<ResolvedDependency>> {
    let bundle = store.bundle(alias)?;
    bundle
        .members
        .iter()
        .map(|member| resolve_dependency(store, member))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
