use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::models::ToggleOutcome;

/// File-backed list of favourite cities.
///
/// The file is a JSON array of strings and is rewritten whole on every
/// change. Every operation re-reads it, so edits made by hand are picked up.
/// Writes from this process are serialised; other processes writing the same
/// file are not coordinated with and can lose updates.
pub struct FavouritesStore {
    file_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FavouritesStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Current favourites. A missing, unreadable or malformed file reads as empty.
    pub async fn load(&self) -> Vec<String> {
        let content = match tokio::fs::read_to_string(&self.file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.file_path.display(),
                    "Favourites file not found. Starting with an empty list."
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(path = %self.file_path.display(), error = %e, "Failed to read favourites");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(favourites) => favourites,
            Err(e) => {
                tracing::error!(path = %self.file_path.display(), error = %e, "Malformed favourites file");
                Vec::new()
            }
        }
    }

    pub async fn contains(&self, city: &str) -> bool {
        match normalize_city(city) {
            Some(city) => self.load().await.iter().any(|c| c == city),
            None => false,
        }
    }

    /// Append a city. Returns whether the persisted list changed.
    pub async fn add(&self, city: &str) -> bool {
        let Some(city) = normalize_city(city) else {
            tracing::warn!("Ignoring blank favourite");
            return false;
        };

        let _guard = self.write_lock.lock().await;
        self.add_unlocked(city).await
    }

    /// Remove a city. Returns whether the persisted list changed.
    pub async fn remove(&self, city: &str) -> bool {
        let Some(city) = normalize_city(city) else {
            tracing::warn!("Ignoring blank favourite");
            return false;
        };

        let _guard = self.write_lock.lock().await;
        self.remove_unlocked(city).await
    }

    /// Add the city if absent, remove it if present
    pub async fn toggle(&self, city: &str) -> ToggleOutcome {
        let Some(city) = normalize_city(city) else {
            tracing::warn!("Ignoring blank favourite toggle");
            return ToggleOutcome::Ignored;
        };

        let _guard = self.write_lock.lock().await;
        let present = self.load().await.iter().any(|c| c == city);

        if present {
            if self.remove_unlocked(city).await {
                return ToggleOutcome::Removed;
            }
        } else if self.add_unlocked(city).await {
            return ToggleOutcome::Added;
        }

        ToggleOutcome::Ignored
    }

    async fn add_unlocked(&self, city: &str) -> bool {
        let mut favourites = self.load().await;
        if favourites.iter().any(|c| c == city) {
            return false;
        }

        favourites.push(city.to_string());
        self.persist(&favourites, city, "Added favourite").await
    }

    async fn remove_unlocked(&self, city: &str) -> bool {
        let mut favourites = self.load().await;
        let before = favourites.len();
        favourites.retain(|c| c != city);
        if favourites.len() == before {
            return false;
        }

        self.persist(&favourites, city, "Removed favourite").await
    }

    /// Write the list, logging instead of propagating failures
    async fn persist(&self, favourites: &[String], city: &str, action: &str) -> bool {
        match self.save(favourites).await {
            Ok(()) => {
                tracing::info!(city = %city, count = favourites.len(), "{}", action);
                true
            }
            Err(e) => {
                tracing::error!(
                    path = %self.file_path.display(),
                    city = %city,
                    error = %e,
                    "Failed to save favourites"
                );
                false
            }
        }
    }

    async fn save(&self, favourites: &[String]) -> Result<(), std::io::Error> {
        let content = serde_json::to_string(favourites)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(&self.file_path, content).await
    }
}

/// Trimmed city name, or `None` when nothing is left
fn normalize_city(city: &str) -> Option<&str> {
    let city = city.trim();
    (!city.is_empty()).then_some(city)
}
