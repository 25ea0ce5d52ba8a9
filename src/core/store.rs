//! CG-003: Catalog store — builder population, sealing, alias lookup.
//!
//! The store is populated once through [`CatalogBuilder`] and immutable
//! after [`CatalogBuilder::build`] seals it. Sealing verifies referential
//! integrity: every version reference points at a declared version alias
//! and every bundle member names a declared library. After that, reads
//! need no coordination.

use indexmap::IndexMap;
use serde::Serialize;

use super::error::{CatalogError, Result};
use super::types::{
    Alias, BundleModel, CatalogEntry, DependencyModel, PluginModel, Section, VersionRef,
    VersionSpec,
};

// ============================================================================
// Builder
// ============================================================================

/// Programmatic population of a catalog store.
///
/// Aliases are validated and deduplicated per section as they arrive;
/// cross-section references are checked when the store is sealed.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    versions: IndexMap<Alias, VersionSpec>,
    libraries: IndexMap<Alias, DependencyModel>,
    bundles: IndexMap<Alias, BundleModel>,
    plugins: IndexMap<Alias, PluginModel>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a version alias.
    pub fn version(mut self, alias: &str, spec: impl Into<VersionSpec>) -> Result<Self> {
        let alias = Alias::parse(alias)?;
        if self.versions.contains_key(&alias) {
            return Err(duplicate(Section::Versions, &alias));
        }
        self.versions.insert(alias, spec.into());
        Ok(self)
    }

    /// Declare a library coordinate.
    pub fn library(
        mut self,
        alias: &str,
        group: &str,
        name: &str,
        version: VersionRef,
    ) -> Result<Self> {
        let alias = Alias::parse(alias)?;
        if self.libraries.contains_key(&alias) {
            return Err(duplicate(Section::Libraries, &alias));
        }
        self.libraries.insert(
            alias,
            DependencyModel {
                group: group.to_string(),
                name: name.to_string(),
                version,
            },
        );
        Ok(self)
    }

    /// Declare a plugin coordinate.
    pub fn plugin(mut self, alias: &str, id: &str, version: VersionRef) -> Result<Self> {
        let alias = Alias::parse(alias)?;
        if self.plugins.contains_key(&alias) {
            return Err(duplicate(Section::Plugins, &alias));
        }
        self.plugins.insert(
            alias,
            PluginModel {
                id: id.to_string(),
                version,
            },
        );
        Ok(self)
    }

    /// Declare a bundle over previously-or-later declared library aliases.
    pub fn bundle(mut self, alias: &str, members: &[&str]) -> Result<Self> {
        let alias = Alias::parse(alias)?;
        if self.bundles.contains_key(&alias) {
            return Err(duplicate(Section::Bundles, &alias));
        }
        let members = members
            .iter()
            .map(|m| Alias::parse(m))
            .collect::<Result<Vec<_>>>()?;
        self.bundles.insert(alias, BundleModel { members });
        Ok(self)
    }

    /// Seal the store. Fails on dangling version references, unknown bundle
    /// members, or empty bundles.
    pub fn build(self) -> Result<CatalogStore> {
        for (alias, dep) in &self.libraries {
            self.check_version_ref(alias, &dep.version)?;
        }
        for (alias, plugin) in &self.plugins {
            self.check_version_ref(alias, &plugin.version)?;
        }
        for (alias, bundle) in &self.bundles {
            if bundle.members.is_empty() {
                return Err(CatalogError::EmptyBundle {
                    alias: alias.to_string(),
                });
            }
            for member in &bundle.members {
                if !self.libraries.contains_key(member) {
                    return Err(CatalogError::UnknownBundleMember {
                        alias: alias.to_string(),
                        member: member.to_string(),
                    });
                }
            }
        }
        Ok(CatalogStore {
            versions: self.versions,
            libraries: self.libraries,
            bundles: self.bundles,
            plugins: self.plugins,
        })
    }

    fn check_version_ref(&self, owner: &Alias, version: &VersionRef) -> Result<()> {
        if let VersionRef::Ref { alias } = version {
            if !self.versions.contains_key(alias) {
                return Err(CatalogError::DanglingVersionRef {
                    alias: owner.to_string(),
                    version_ref: alias.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn duplicate(section: Section, alias: &Alias) -> CatalogError {
    CatalogError::DuplicateAlias {
        section,
        alias: alias.to_string(),
    }
}

// ============================================================================
// Store
// ============================================================================

/// An immutable alias-to-coordinate mapping with four declaration-ordered
/// sections. Safe for concurrent read-only access.
#[derive(Debug, Serialize)]
pub struct CatalogStore {
    versions: IndexMap<Alias, VersionSpec>,
    libraries: IndexMap<Alias, DependencyModel>,
    bundles: IndexMap<Alias, BundleModel>,
    plugins: IndexMap<Alias, PluginModel>,
}

impl CatalogStore {
    /// Look up any entry by section and alias.
    pub fn lookup(&self, section: Section, alias: &Alias) -> Result<CatalogEntry> {
        match section {
            Section::Libraries => self.library(alias).cloned().map(CatalogEntry::Library),
            Section::Versions => self.version(alias).cloned().map(CatalogEntry::Version),
            Section::Bundles => self.bundle(alias).cloned().map(CatalogEntry::Bundle),
            Section::Plugins => self.plugin(alias).cloned().map(CatalogEntry::Plugin),
        }
    }

    pub fn library(&self, alias: &Alias) -> Result<&DependencyModel> {
        self.libraries
            .get(alias)
            .ok_or_else(|| unknown(Section::Libraries, alias))
    }

    pub fn version(&self, alias: &Alias) -> Result<&VersionSpec> {
        self.versions
            .get(alias)
            .ok_or_else(|| unknown(Section::Versions, alias))
    }

    pub fn bundle(&self, alias: &Alias) -> Result<&BundleModel> {
        self.bundles
            .get(alias)
            .ok_or_else(|| unknown(Section::Bundles, alias))
    }

    pub fn plugin(&self, alias: &Alias) -> Result<&PluginModel> {
        self.plugins
            .get(alias)
            .ok_or_else(|| unknown(Section::Plugins, alias))
    }

    pub fn contains(&self, section: Section, alias: &Alias) -> bool {
        match section {
            Section::Libraries => self.libraries.contains_key(alias),
            Section::Versions => self.versions.contains_key(alias),
            Section::Bundles => self.bundles.contains_key(alias),
            Section::Plugins => self.plugins.contains_key(alias),
        }
    }

    /// Aliases of one section, in declaration order.
    pub fn aliases(&self, section: Section) -> Vec<&Alias> {
        match section {
            Section::Libraries => self.libraries.keys().collect(),
            Section::Versions => self.versions.keys().collect(),
            Section::Bundles => self.bundles.keys().collect(),
            Section::Plugins => self.plugins.keys().collect(),
        }
    }

    pub fn len(&self, section: Section) -> usize {
        match section {
            Section::Libraries => self.libraries.len(),
            Section::Versions => self.versions.len(),
            Section::Bundles => self.bundles.len(),
            Section::Plugins => self.plugins.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
            && self.libraries.is_empty()
            && self.bundles.is_empty()
            && self.plugins.is_empty()
    }

    /// Chase a version reference to its constraint. Sealing guarantees this
    /// cannot dangle for entries that came through the builder, but the
    /// error is propagated rather than unwrapped.
    pub fn resolve_ref<'a>(&'a self, owner: &Alias, version: &'a VersionRef) -> Result<&'a VersionSpec> {
        match version {
            VersionRef::Inline(spec) => Ok(spec),
            VersionRef::Ref { alias } => {
                self.versions
                    .get(alias)
                    .ok_or_else(|| CatalogError::DanglingVersionRef {
                        alias: owner.to_string(),
                        version_ref: alias.to_string(),
                    })
            }
        }
    }
}

fn unknown(section: Section, alias: &Alias) -> CatalogError {
    CatalogError::UnknownAlias {
        section,
        alias: alias.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
