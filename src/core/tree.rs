//! CG-005: Accessor trees — a navigable index mirroring the alias hierarchy.
//!
//! Instead of one hand-written accessor type per namespace, the tree is a
//! generic structure synthesized from segmented aliases: each group node
//! owns its child groups and leaf bindings, and delegates leaf invocations
//! to the shared [`Resolver`]. Groups are built leaves-first, root last,
//! and never mutated afterwards, so the whole tree is safe for concurrent
//! read-only access.

use indexmap::IndexMap;
use std::sync::Arc;

use super::error::{CatalogError, Result};
use super::resolve::{Deferred, Resolver};
use super::store::CatalogStore;
use super::types::{Alias, ResolvedDependency, ResolvedPlugin, Section};

// ============================================================================
// Leaf bindings
// ============================================================================

/// One declared leaf accessor: where it mounts in the tree and which
/// catalog alias it resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafBinding {
    pub section: Section,
    /// Dot-path of the accessor leaf within its section root.
    pub mount: Alias,
    /// Catalog alias the accessor resolves. Must live directly inside the
    /// mount's enclosing group namespace.
    pub alias: Alias,
}

impl LeafBinding {
    /// The common case: the accessor mounts at the alias's own path.
    pub fn new(section: Section, alias: &str) -> Result<Self> {
        let alias = Alias::parse(alias)?;
        Ok(Self {
            section,
            mount: alias.clone(),
            alias,
        })
    }

    /// Mount an accessor at an explicit path. Construction fails later if
    /// the alias falls outside the mount's enclosing group.
    pub fn mounted(section: Section, mount: &str, alias: &str) -> Result<Self> {
        Ok(Self {
            section,
            mount: Alias::parse(mount)?,
            alias: Alias::parse(alias)?,
        })
    }
}

// ============================================================================
// Groups
// ============================================================================

/// A named node in the accessor hierarchy. Owns child groups and leaf
/// bindings; created once at tree construction, immutable thereafter.
#[derive(Debug)]
pub struct AccessorGroup {
    section: Section,
    path: String,
    resolver: Resolver,
    children: IndexMap<String, AccessorGroup>,
    leaves: IndexMap<String, Alias>,
}

impl AccessorGroup {
    /// Dot-path of this group within its section root; empty at the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment; empty at the root.
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Navigate to a direct child group. Idempotent: both calls return the
    /// same instance.
    pub fn group(&self, name: &str) -> Option<&AccessorGroup> {
        self.children.get(name)
    }

    /// Navigate a dot-path of nested groups (e.g. `"kotlinx.coroutines"`).
    pub fn at(&self, path: &str) -> Option<&AccessorGroup> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.group(segment)?;
        }
        Some(current)
    }

    /// Child groups in declaration order.
    pub fn groups(&self) -> impl Iterator<Item = &AccessorGroup> {
        self.children.values()
    }

    /// Leaf bindings in declaration order.
    pub fn leaves(&self) -> impl Iterator<Item = (&str, &Alias)> {
        self.leaves.iter().map(|(name, alias)| (name.as_str(), alias))
    }

    /// Leaf accessor for a library coordinate. `None` for an undeclared
    /// leaf or a group outside the libraries section.
    pub fn dependency(&self, name: &str) -> Option<Deferred<ResolvedDependency>> {
        if self.section != Section::Libraries {
            return None;
        }
        let alias = self.leaves.get(name)?;
        Some(self.resolver.dependency(alias.clone()))
    }

    /// Leaf accessor for a version string.
    pub fn version(&self, name: &str) -> Option<Deferred<String>> {
        if self.section != Section::Versions {
            return None;
        }
        let alias = self.leaves.get(name)?;
        Some(self.resolver.version(alias.clone()))
    }

    /// Leaf accessor for a bundle.
    pub fn bundle(&self, name: &str) -> Option<Deferred<Vec<ResolvedDependency>>> {
        if self.section != Section::Bundles {
            return None;
        }
        let alias = self.leaves.get(name)?;
        Some(self.resolver.bundle(alias.clone()))
    }

    /// Leaf accessor for a plugin coordinate.
    pub fn plugin(&self, name: &str) -> Option<Deferred<ResolvedPlugin>> {
        if self.section != Section::Plugins {
            return None;
        }
        let alias = self.leaves.get(name)?;
        Some(self.resolver.plugin(alias.clone()))
    }

    /// Bind a leaf during construction. The alias must exist in the store
    /// and live directly inside this group's namespace.
    fn register_leaf(&mut self, name: &str, alias: Alias) -> Result<()> {
        if parent_path(&alias) != self.path {
            return Err(CatalogError::AliasOutsideGroup {
                group: self.path.clone(),
                alias: alias.to_string(),
            });
        }
        if !self.resolver.store().contains(self.section, &alias) {
            return Err(CatalogError::UnknownAlias {
                section: self.section,
                alias: alias.to_string(),
            });
        }
        self.leaves.insert(name.to_string(), alias);
        Ok(())
    }
}

fn parent_path(alias: &Alias) -> &str {
    alias.as_str().rsplit_once('.').map(|(p, _)| p).unwrap_or("")
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

/// Build one group level: partition entries into leaves and sub-buckets,
/// construct child groups first, then bind this level's leaves.
fn build_group(
    section: Section,
    resolver: &Resolver,
    path: String,
    entries: Vec<(Vec<String>, Alias)>,
) -> Result<AccessorGroup> {
    let mut leaf_entries: Vec<(String, Alias)> = Vec::new();
    let mut buckets: IndexMap<String, Vec<(Vec<String>, Alias)>> = IndexMap::new();

    for (segments, alias) in entries {
        let mut iter = segments.into_iter();
        let head = match iter.next() {
            Some(head) => head,
            // Alias validation guarantees at least one segment.
            None => continue,
        };
        let rest: Vec<String> = iter.collect();
        if rest.is_empty() {
            leaf_entries.push((head, alias));
        } else {
            buckets.entry(head).or_default().push((rest, alias));
        }
    }

    let mut children = IndexMap::new();
    for (name, sub_entries) in buckets {
        let child_path = join_path(&path, &name);
        let child = build_group(section, resolver, child_path, sub_entries)?;
        children.insert(name, child);
    }

    let mut group = AccessorGroup {
        section,
        path,
        resolver: resolver.clone(),
        children,
        leaves: IndexMap::new(),
    };
    for (name, alias) in leaf_entries {
        group.register_leaf(&name, alias)?;
    }
    Ok(group)
}

// ============================================================================
// Tree
// ============================================================================

/// The root accessor object: one group hierarchy per catalog section.
#[derive(Debug)]
pub struct AccessorTree {
    resolver: Resolver,
    libraries: AccessorGroup,
    versions: AccessorGroup,
    bundles: AccessorGroup,
    plugins: AccessorGroup,
}

impl AccessorTree {
    /// Synthesize the tree from every alias the store declares, in
    /// declaration order.
    pub fn build(store: Arc<CatalogStore>) -> Result<Self> {
        let mut bindings = Vec::new();
        for section in [
            Section::Libraries,
            Section::Versions,
            Section::Bundles,
            Section::Plugins,
        ] {
            for alias in store.aliases(section) {
                bindings.push(LeafBinding {
                    section,
                    mount: alias.clone(),
                    alias: alias.clone(),
                });
            }
        }
        Self::with_bindings(store, bindings)
    }

    /// Construct the tree from explicitly registered leaf bindings.
    ///
    /// Fails with [`CatalogError::UnknownAlias`] if a binding names an
    /// alias the store does not hold (a stale tree), and with
    /// [`CatalogError::AliasOutsideGroup`] if a binding's alias falls
    /// outside its mount's enclosing group namespace.
    pub fn with_bindings(store: Arc<CatalogStore>, bindings: Vec<LeafBinding>) -> Result<Self> {
        let resolver = Resolver::new(store);

        let mut per_section: [Vec<(Vec<String>, Alias)>; 4] = Default::default();
        for binding in bindings {
            let segments: Vec<String> = binding.mount.segments().map(str::to_string).collect();
            per_section[section_index(binding.section)].push((segments, binding.alias));
        }

        let [libs, versions, bundles, plugins] = per_section;
        Ok(Self {
            libraries: build_group(Section::Libraries, &resolver, String::new(), libs)?,
            versions: build_group(Section::Versions, &resolver, String::new(), versions)?,
            bundles: build_group(Section::Bundles, &resolver, String::new(), bundles)?,
            plugins: build_group(Section::Plugins, &resolver, String::new(), plugins)?,
            resolver,
        })
    }

    /// Root group of library accessors.
    pub fn libraries(&self) -> &AccessorGroup {
        &self.libraries
    }

    /// Root group of version accessors.
    pub fn versions(&self) -> &AccessorGroup {
        &self.versions
    }

    /// Root group of bundle accessors.
    pub fn bundles(&self) -> &AccessorGroup {
        &self.bundles
    }

    /// Root group of plugin accessors.
    pub fn plugins(&self) -> &AccessorGroup {
        &self.plugins
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        self.resolver.store()
    }
}

fn section_index(section: Section) -> usize {
    match section {
        Section::Libraries => 0,
        Section::Versions => 1,
        Section::Bundles => 2,
        Section::Plugins => 3,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::CatalogBuilder;
    use crate::core::types::{VersionRef, VersionSpec};

    /// The catalog of a small Kotlin web service: ktor server/client
    /// libraries, kotlinx runtime libraries, build plugins.
    fn demo_store() -> Arc<CatalogStore> {
        let vref = |a: &str| VersionRef::of(a).unwrap();
        let store = CatalogBuilder::new()
            .version("coroutines", "1.9.0")
            .unwrap()
            .version("dokka", "2.0.0-Beta")
            .unwrap()
            .version("kotlin", "2.0.21")
            .unwrap()
            .version("ktor", "3.0.2")
            .unwrap()
            .version("logging", "7.0.0")
            .unwrap()
            .version("mockk", "1.13.13")
            .unwrap()
            .version("serialization", "1.7.3")
            .unwrap()
            .library("mockk", "io.mockk", "mockk", vref("mockk"))
            .unwrap()
            .library("kotlin.logging", "io.github.oshai", "kotlin-logging-jvm", vref("logging"))
            .unwrap()
            .library("kotlin.test", "org.jetbrains.kotlin", "kotlin-test", vref("kotlin"))
            .unwrap()
            .library(
                "kotlinx.coroutines.debug",
                "org.jetbrains.kotlinx",
                "kotlinx-coroutines-debug",
                vref("coroutines"),
            )
            .unwrap()
            .library(
                "kotlinx.coroutines.test",
                "org.jetbrains.kotlinx",
                "kotlinx-coroutines-test",
                vref("coroutines"),
            )
            .unwrap()
            .library(
                "kotlinx.serialization.json",
                "org.jetbrains.kotlinx",
                "kotlinx-serialization-json",
                vref("serialization"),
            )
            .unwrap()
            .library("ktor.server.core", "io.ktor", "ktor-server-core", vref("ktor"))
            .unwrap()
            .library("ktor.server.netty", "io.ktor", "ktor-server-netty", vref("ktor"))
            .unwrap()
            .library("ktor.client.cio", "io.ktor", "ktor-client-cio", vref("ktor"))
            .unwrap()
            .bundle("ktor-server", &["ktor.server.core", "ktor.server.netty"])
            .unwrap()
            .plugin("dokka", "org.jetbrains.dokka", vref("dokka"))
            .unwrap()
            .plugin("kotlin.jvm", "org.jetbrains.kotlin.jvm", vref("kotlin"))
            .unwrap()
            .plugin(
                "kotlin.serialization",
                "org.jetbrains.kotlin.plugin.serialization",
                vref("kotlin"),
            )
            .unwrap()
            .build()
            .unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_cg005_navigate_nested_dependency() {
        let tree = AccessorTree::build(demo_store()).unwrap();
        let debug = tree
            .libraries()
            .group("kotlinx")
            .unwrap()
            .group("coroutines")
            .unwrap()
            .dependency("debug")
            .unwrap();
        let dep = debug.force().unwrap();
        assert_eq!(dep.group, "org.jetbrains.kotlinx");
        assert_eq!(dep.name, "kotlinx-coroutines-debug");
        assert_eq!(dep.version, VersionSpec::from("1.9.0"));
    }

    #[test]
    fn test_cg005_version_leaf_forced() {
        let tree = AccessorTree::build(demo_store()).unwrap();
        let ktor = tree.versions().version("ktor").unwrap();
        assert_eq!(ktor.force().unwrap(), "3.0.2");
    }

    #[test]
    fn test_cg005_nested_plugin_group() {
        let tree = AccessorTree::build(demo_store()).unwrap();
        let jvm = tree
            .plugins()
            .group("kotlin")
            .unwrap()
            .plugin("jvm")
            .unwrap();
        let plugin = jvm.force().unwrap();
        assert_eq!(plugin.id, "org.jetbrains.kotlin.jvm");
        assert_eq!(plugin.version, VersionSpec::from("2.0.21"));
    }

    #[test]
    fn test_cg005_bundle_leaf() {
        let tree = AccessorTree::build(demo_store()).unwrap();
        let members = tree.bundles().bundle("ktor-server").unwrap();
        let members = members.force().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "ktor-server-core");
    }

    #[test]
    fn test_cg005_leaf_and_group_share_name() {
        // `mockk` is a root leaf while `kotlin` is both a group (logging,
        // test) in libraries and a group (jvm, serialization) in plugins.
        let tree = AccessorTree::build(demo_store()).unwrap();
        assert!(tree.libraries().dependency("mockk").is_some());
        let kotlin = tree.libraries().group("kotlin").unwrap();
        assert!(kotlin.dependency("logging").is_some());
        assert!(kotlin.dependency("test").is_some());
    }

    #[test]
    fn test_cg005_navigation_identity_stable() {
        let tree = AccessorTree::build(demo_store()).unwrap();
        let first = tree.libraries().group("ktor").unwrap();
        let second = tree.libraries().group("ktor").unwrap();
        assert!(std::ptr::eq(first, second));
        let deep1 = tree.libraries().at("kotlinx.coroutines").unwrap();
        let deep2 = tree.libraries().at("kotlinx.coroutines").unwrap();
        assert!(std::ptr::eq(deep1, deep2));
    }

    #[test]
    fn test_cg005_group_metadata() {
        let tree = AccessorTree::build(demo_store()).unwrap();
        let coroutines = tree.libraries().at("kotlinx.coroutines").unwrap();
        assert_eq!(coroutines.path(), "kotlinx.coroutines");
        assert_eq!(coroutines.name(), "coroutines");
        assert_eq!(coroutines.section(), Section::Libraries);
        let leaves: Vec<&str> = coroutines.leaves().map(|(name, _)| name).collect();
        assert_eq!(leaves, vec!["debug", "test"]);
    }

    #[test]
    fn test_cg005_section_guard() {
        let tree = AccessorTree::build(demo_store()).unwrap();
        // `ktor` is a version alias, not a root library leaf.
        assert!(tree.libraries().version("ktor").is_none());
        assert!(tree.versions().dependency("mockk").is_none());
        assert!(tree.plugins().bundle("ktor-server").is_none());
    }

    #[test]
    fn test_cg005_unknown_leaf_is_none() {
        let tree = AccessorTree::build(demo_store()).unwrap();
        assert!(tree.libraries().dependency("ghost").is_none());
        assert!(tree.libraries().group("ghost").is_none());
        assert!(tree.libraries().at("kotlinx.ghost").is_none());
    }

    #[test]
    fn test_cg005_stale_binding_fails_construction() {
        let bindings = vec![
            LeafBinding::new(Section::Versions, "ktor").unwrap(),
            LeafBinding::new(Section::Versions, "removed-long-ago").unwrap(),
        ];
        let err = AccessorTree::with_bindings(demo_store(), bindings).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownAlias {
                section: Section::Versions,
                alias: "removed-long-ago".to_string()
            }
        );
    }

    #[test]
    fn test_cg005_alias_outside_group_fails_construction() {
        // Mounted under ktor.server but resolving a kotlinx alias.
        let bindings = vec![LeafBinding::mounted(
            Section::Libraries,
            "ktor.server.debug",
            "kotlinx.coroutines.debug",
        )
        .unwrap()];
        let err = AccessorTree::with_bindings(demo_store(), bindings).unwrap_err();
        assert_eq!(
            err,
            CatalogError::AliasOutsideGroup {
                group: "ktor.server".to_string(),
                alias: "kotlinx.coroutines.debug".to_string()
            }
        );
    }

    #[test]
    fn test_cg005_renamed_mount_within_group() {
        // A mount may rename the leaf as long as the alias stays in the
        // same group.
        let bindings = vec![LeafBinding::mounted(
            Section::Libraries,
            "kotlinx.coroutines.dbg",
            "kotlinx.coroutines.debug",
        )
        .unwrap()];
        let tree = AccessorTree::with_bindings(demo_store(), bindings).unwrap();
        let handle = tree
            .libraries()
            .at("kotlinx.coroutines")
            .unwrap()
            .dependency("dbg")
            .unwrap();
        assert_eq!(handle.force().unwrap().name, "kotlinx-coroutines-debug");
    }

    #[test]
    fn test_cg005_explicit_subset_tree() {
        // Explicit registration may cover a subset of the catalog.
        let bindings = vec![
            LeafBinding::new(Section::Libraries, "ktor.server.core").unwrap(),
            LeafBinding::new(Section::Versions, "ktor").unwrap(),
        ];
        let tree = AccessorTree::with_bindings(demo_store(), bindings).unwrap();
        assert!(tree.libraries().group("kotlinx").is_none());
        assert!(tree.libraries().at("ktor.server").is_some());
        assert_eq!(tree.versions().leaves().count(), 1);
    }

    #[test]
    fn test_cg005_tree_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AccessorTree>();
        assert_send_sync::<AccessorGroup>();
    }

    #[test]
    fn test_cg005_concurrent_navigation() {
        let tree = Arc::new(AccessorTree::build(demo_store()).unwrap());
        let mut joins = Vec::new();
        for _ in 0..4 {
            let tree = Arc::clone(&tree);
            joins.push(std::thread::spawn(move || {
                let handle = tree
                    .libraries()
                    .at("ktor.server")
                    .unwrap()
                    .dependency("core")
                    .unwrap();
                handle.force().unwrap().to_string()
            }));
        }
        for join in joins {
            assert_eq!(join.join().unwrap(), "io.ktor:ktor-server-core:3.0.2");
        }
    }
}
