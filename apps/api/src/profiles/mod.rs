// Sample profile documents loaded once at startup from PROFILES_DIR.

pub mod handlers;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::profile::ProfileDocument;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile '{0}' not found")]
    NotFound(String),

    #[error("Could not read profiles directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Named sample profiles, ordered by name.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: BTreeMap<String, Arc<ProfileDocument>>,
}

impl ProfileStore {
    /// Loads every `*.json` file in `dir`, keyed by file stem. Files that cannot
    /// be read or parsed are skipped with a warning. A missing directory yields
    /// an empty store.
    pub fn load_dir(dir: &Path) -> Result<Self, ProfileError> {
        if !dir.exists() {
            warn!("Profiles directory {} does not exist; no samples loaded", dir.display());
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(dir).map_err(|source| ProfileError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut profiles = BTreeMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| {
                    serde_json::from_str::<ProfileDocument>(&text).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(profile) => {
                    profiles.insert(name.to_string(), Arc::new(profile));
                }
                Err(e) => warn!("Skipping profile {}: {e}", path.display()),
            }
        }

        info!("Loaded {} sample profiles from {}", profiles.len(), dir.display());
        Ok(Self { profiles })
    }

    #[cfg(test)]
    pub fn from_profiles(profiles: impl IntoIterator<Item = (String, ProfileDocument)>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|(name, profile)| (name, Arc::new(profile)))
                .collect(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Result<Arc<ProfileDocument>, ProfileError> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    /// The named sample, or the first one when `name` is `None`. An empty
    /// store yields an empty profile.
    pub fn select(&self, name: Option<&str>) -> Result<Arc<ProfileDocument>, ProfileError> {
        match name {
            Some(name) => self.get(name),
            None => Ok(self
                .profiles
                .values()
                .next()
                .cloned()
                .unwrap_or_default()),
        }
    }
}
