// fmcw_sim/src/simulation/config/catalog.rs

//! The `PrefabCatalog`: sensor profiles discovered on disk.

use figment::{
    providers::{Format, Toml},
    value::Value,
    Figment,
};
use std::{collections::HashMap, path::Path};
use walkdir::WalkDir;

/// The parsed catalog of prefabs.
/// The key is a namespace string (e.g., "radar.long_range") and the value is
/// the raw, parsed TOML data of that profile.
#[derive(Default, Debug, Clone)]
pub struct PrefabCatalog(pub HashMap<String, Value>);

impl PrefabCatalog {
    /// Walks `catalog_path`, parses every `.toml` file and keys it by its
    /// relative path. Unreadable files are logged and skipped; a missing
    /// directory yields an empty catalog.
    pub fn load_from_dir(catalog_path: &Path) -> Self {
        let mut catalog = Self::default();
        if !catalog_path.exists() {
            tracing::warn!(
                "Catalog directory not found at {:?}, no prefabs will be loaded.",
                catalog_path
            );
            return catalog;
        }

        tracing::info!("Loading prefab catalog from: {:?}", catalog_path);

        for entry in WalkDir::new(catalog_path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.path().extension().map_or(false, |ext| ext == "toml")
            })
        {
            let path = entry.path();
            let Some(key) = catalog_key(catalog_path, path) else {
                continue;
            };

            match Figment::new().merge(Toml::file(path)).extract::<Value>() {
                Ok(data) => {
                    tracing::debug!("Loaded catalog item: '{}'", key);
                    catalog.0.insert(key, data);
                }
                Err(e) => {
                    tracing::error!("Failed to load catalog item from {:?}: {}", path, e);
                }
            }
        }
        catalog
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Catalog keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// "radar/long_range.toml" under the root becomes "radar.long_range".
fn catalog_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fmcw_catalog_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("radar")).unwrap();
        dir
    }

    #[test]
    fn test_keys_follow_relative_paths() {
        let root = Path::new("/assets/catalog");
        assert_eq!(
            catalog_key(root, Path::new("/assets/catalog/radar/long_range.toml")).as_deref(),
            Some("radar.long_range")
        );
        assert_eq!(catalog_key(root, Path::new("/elsewhere/x.toml")), None);
    }

    #[test]
    fn test_loads_toml_files_and_skips_others() {
        let dir = scratch_dir("load");
        fs::write(dir.join("radar/long_range.toml"), "max_range = 250.0\n").unwrap();
        fs::write(dir.join("radar/notes.txt"), "not a prefab").unwrap();
        fs::write(dir.join("broken.toml"), "max_range = = 1").unwrap();

        let catalog = PrefabCatalog::load_from_dir(&dir);
        assert_eq!(catalog.keys(), vec!["radar.long_range"]);
        let item = catalog.get("radar.long_range").unwrap();
        assert!(item.as_dict().unwrap().contains_key("max_range"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let catalog = PrefabCatalog::load_from_dir(Path::new("/definitely/not/here"));
        assert!(catalog.is_empty());
    }
}
