// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::StructureError;
use super::loader::StructureLoader;
use super::metadata::StructureMetadata;
use crate::store::{read_json_file, write_json_file};
use log::{debug, error, warn};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

type CacheKey = (String, String);

/// Serves structure metadata from memory, then from the persistent JSON cache,
/// and only then from the loader. Changed XML files are not picked up until
/// `clear_cache` runs.
pub struct StructureFactory {
    search_paths: BTreeMap<String, Vec<PathBuf>>,
    loader: Arc<dyn StructureLoader>,
    cache: RwLock<HashMap<CacheKey, Arc<StructureMetadata>>>,
    cache_dir: Option<PathBuf>,
}

impl StructureFactory {
    pub fn new(
        search_paths: BTreeMap<String, Vec<PathBuf>>,
        loader: Arc<dyn StructureLoader>,
        cache_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            search_paths,
            loader,
            cache: RwLock::new(HashMap::new()),
            cache_dir,
        }
    }

    pub fn has_structures_for(&self, document_type: &str) -> bool {
        self.search_paths.contains_key(document_type)
    }

    pub fn document_types(&self) -> Vec<&str> {
        self.search_paths.keys().map(|key| key.as_str()).collect()
    }

    pub fn get_structure(
        &self,
        document_type: &str,
        structure_type: &str,
    ) -> Result<Arc<StructureMetadata>, StructureError> {
        let paths = self.paths_for(document_type)?;
        if !is_valid_key(structure_type) {
            return Err(not_found(document_type, structure_type));
        }

        let key = (document_type.to_string(), structure_type.to_string());
        if let Some(found) = self.cached(&key) {
            return Ok(found);
        }

        if let Some(found) = self.read_persistent(document_type, structure_type) {
            return Ok(self.remember(key, found));
        }

        let file = paths
            .iter()
            .map(|dir| dir.join(format!("{}.xml", structure_type)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| not_found(document_type, structure_type))?;
        debug!(
            "Loading {} structure '{}' from {}",
            document_type,
            structure_type,
            file.display()
        );
        let metadata = self.loader.load(&file, document_type)?;
        self.write_persistent(&metadata);
        Ok(self.remember(key, metadata))
    }

    /// Every structure of `document_type`, ordered by key. The first search path wins per key.
    pub fn get_structures(
        &self,
        document_type: &str,
    ) -> Result<Vec<Arc<StructureMetadata>>, StructureError> {
        self.structure_types(document_type)?
            .iter()
            .map(|key| self.get_structure(document_type, key))
            .collect()
    }

    pub fn structure_types(&self, document_type: &str) -> Result<Vec<String>, StructureError> {
        let paths = self.paths_for(document_type)?;
        let mut keys: Vec<String> = Vec::new();
        for dir in paths {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Cannot read structure path {}: {}", dir.display(), err);
                    continue;
                }
            };
            for entry in entries.filter_map(|entry| entry.ok()) {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("xml") {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
                    && !keys.iter().any(|key| key == stem)
                {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Drops the in-memory and the persistent cache.
    pub fn clear_cache(&self) -> Result<(), StructureError> {
        match self.cache.write() {
            Ok(mut guard) => guard.clear(),
            Err(poisoned) => {
                error!("🚨 CRITICAL: Structure cache lock poisoned in clear_cache; recovering");
                poisoned.into_inner().clear();
                self.cache.clear_poison();
            }
        }
        if let Some(dir) = &self.cache_dir
            && dir.exists()
        {
            fs::remove_dir_all(dir).map_err(|err| {
                StructureError::Cache(format!("Failed to clear {}: {}", dir.display(), err))
            })?;
        }
        debug!("Structure cache cleared");
        Ok(())
    }

    fn paths_for(&self, document_type: &str) -> Result<&Vec<PathBuf>, StructureError> {
        self.search_paths
            .get(document_type)
            .ok_or_else(|| StructureError::DocumentTypeNotFound(document_type.to_string()))
    }

    fn cached(&self, key: &CacheKey) -> Option<Arc<StructureMetadata>> {
        match self.cache.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(_) => {
                error!("🚨 CRITICAL: Structure cache read lock poisoned");
                None
            }
        }
    }

    fn remember(&self, key: CacheKey, metadata: StructureMetadata) -> Arc<StructureMetadata> {
        let metadata = Arc::new(metadata);
        match self.cache.write() {
            Ok(mut guard) => {
                guard.insert(key, metadata.clone());
            }
            Err(_) => error!("🚨 CRITICAL: Structure cache write lock poisoned"),
        }
        metadata
    }

    fn persistent_path(&self, document_type: &str, structure_type: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| {
            dir.join(document_type)
                .join(format!("{}.json", structure_type))
        })
    }

    fn read_persistent(&self, document_type: &str, structure_type: &str) -> Option<StructureMetadata> {
        let path = self.persistent_path(document_type, structure_type)?;
        match read_json_file::<StructureMetadata>(&path, "structure cache") {
            Ok(found) => found,
            Err(err) => {
                warn!("Ignoring unreadable structure cache {}: {}", path.display(), err);
                None
            }
        }
    }

    fn write_persistent(&self, metadata: &StructureMetadata) {
        let Some(path) = self.persistent_path(&metadata.document_type, &metadata.key) else {
            return;
        };
        if let Err(err) = write_json_file(&path, "structure cache", metadata) {
            warn!("Failed to write structure cache {}: {}", path.display(), err);
        }
    }
}

fn not_found(document_type: &str, structure_type: &str) -> StructureError {
    StructureError::StructureTypeNotFound {
        document_type: document_type.to_string(),
        structure_type: structure_type.to_string(),
    }
}

/// Keys double as file names, so no separators or dots.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::loader::XmlStructureLoader;
    use crate::structure::loader::tests::DEFAULT_PAGE;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        inner: XmlStructureLoader,
        calls: AtomicUsize,
    }

    impl StructureLoader for CountingLoader {
        fn load(&self, path: &Path, document_type: &str) -> Result<StructureMetadata, StructureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.load(path, document_type)
        }
    }

    fn overview() -> String {
        DEFAULT_PAGE.replace("<key>default</key>", "<key>overview</key>")
    }

    fn setup(name: &str) -> (TestFixtureRoot, Arc<CountingLoader>, StructureFactory) {
        let fixture = TestFixtureRoot::new_unique(name).unwrap();
        fixture
            .write_file("templates/page/overview.xml", &overview())
            .unwrap();
        fixture
            .write_file("templates/page/default.xml", DEFAULT_PAGE)
            .unwrap();
        let loader = Arc::new(CountingLoader {
            inner: XmlStructureLoader::new(),
            calls: AtomicUsize::new(0),
        });
        let factory = StructureFactory::new(
            BTreeMap::from([("page".to_string(), vec![fixture.templates_dir("page")])]),
            loader.clone(),
            Some(fixture.cache_dir().join("structures")),
        );
        (fixture, loader, factory)
    }

    #[test]
    fn loads_once_and_serves_from_memory() {
        let (_fixture, loader, factory) = setup("structure-memory");
        let first = factory.get_structure("page", "overview").unwrap();
        let second = factory.get_structure("page", "overview").unwrap();
        assert_eq!(first.key, "overview");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn persistent_cache_survives_new_factory() {
        let (fixture, loader, factory) = setup("structure-persistent");
        factory.get_structure("page", "overview").unwrap();
        assert!(
            fixture
                .cache_dir()
                .join("structures/page/overview.json")
                .is_file()
        );

        let second = StructureFactory::new(
            BTreeMap::from([("page".to_string(), vec![fixture.templates_dir("page")])]),
            loader.clone(),
            Some(fixture.cache_dir().join("structures")),
        );
        second.get_structure("page", "overview").unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);

        second.clear_cache().unwrap();
        second.get_structure("page", "overview").unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reports_unknown_types() {
        let (_fixture, _loader, factory) = setup("structure-unknown");
        assert!(matches!(
            factory.get_structure("snippet", "default"),
            Err(StructureError::DocumentTypeNotFound(_))
        ));
        assert!(matches!(
            factory.get_structure("page", "missing"),
            Err(StructureError::StructureTypeNotFound { .. })
        ));
        assert!(matches!(
            factory.get_structure("page", "../secret"),
            Err(StructureError::StructureTypeNotFound { .. })
        ));
        assert!(factory.has_structures_for("page"));
        assert!(!factory.has_structures_for("snippet"));
    }

    #[test]
    fn lists_structures_with_first_path_winning() {
        let (fixture, _loader, _) = setup("structure-list");
        fixture
            .write_file(
                "overrides/page/default.xml",
                &DEFAULT_PAGE.replace("pages/default", "pages/override"),
            )
            .unwrap();
        let factory = StructureFactory::new(
            BTreeMap::from([(
                "page".to_string(),
                vec![
                    fixture.path().join("overrides/page"),
                    fixture.templates_dir("page"),
                ],
            )]),
            Arc::new(XmlStructureLoader::new()),
            None,
        );

        assert_eq!(
            factory.structure_types("page").unwrap(),
            vec!["default".to_string(), "overview".to_string()]
        );
        let structures = factory.get_structures("page").unwrap();
        assert_eq!(structures.len(), 2);
        assert_eq!(structures[0].view.as_deref(), Some("pages/override"));
    }
}
