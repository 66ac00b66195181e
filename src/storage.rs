use crate::errors::AppError;
use crate::models::{Document, Theme};
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};

pub const DOCUMENT_KEY: &str = "macros_v1";
pub const THEME_KEY: &str = "macros_theme";

pub fn resolve_data_dir() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from("data")
}

/// String key-value storage, one file per key under a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// `None` when the key was never written or cannot be read.
    pub async fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Some(value),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                error!("failed to read {key}: {err}");
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        fs::write(self.path_for(key), value).await?;
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    /// Never fails. An absent or unreadable record yields the default document.
    pub async fn load_document(&self) -> Document {
        let Some(raw) = self.get(DOCUMENT_KEY).await else {
            return Document::default();
        };

        match serde_json::from_str::<Option<Document>>(&raw) {
            Ok(Some(doc)) => doc,
            Ok(None) => Document::default(),
            Err(err) => {
                warn!("discarding unreadable state: {err}");
                Document::default()
            }
        }
    }

    /// Overwrites the stored document with `doc`.
    pub async fn save_document(&self, doc: &Document) -> Result<(), AppError> {
        let payload = serde_json::to_string_pretty(doc)?;
        self.set(DOCUMENT_KEY, &payload).await
    }

    pub async fn load_theme(&self) -> Theme {
        self.get(THEME_KEY)
            .await
            .map(|raw| Theme::parse(&raw))
            .unwrap_or_default()
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<(), AppError> {
        self.set(THEME_KEY, theme.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::add_entry;
    use crate::models::GoalSet;

    async fn temp_store(label: &str) -> Store {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut dir = std::env::temp_dir();
        dir.push(format!("macro_tracker_{label}_{}_{}", std::process::id(), nanos));
        fs::create_dir_all(&dir).await.unwrap();
        Store::new(dir)
    }

    #[tokio::test]
    async fn missing_record_loads_default() {
        let store = temp_store("missing").await;
        assert_eq!(store.load_document().await, Document::default());
        assert_eq!(store.load_theme().await, Theme::Dark);
    }

    #[tokio::test]
    async fn corrupt_or_null_record_loads_default() {
        let store = temp_store("corrupt").await;
        store.set(DOCUMENT_KEY, "{not json").await.unwrap();
        assert_eq!(store.load_document().await, Document::default());

        store.set(DOCUMENT_KEY, "null").await.unwrap();
        assert_eq!(store.load_document().await, Document::default());

        store.set(DOCUMENT_KEY, "[1,2,3]").await.unwrap();
        assert_eq!(store.load_document().await, Document::default());
    }

    #[tokio::test]
    async fn save_then_load_is_lossless() {
        let store = temp_store("roundtrip").await;
        let mut doc = Document::default();
        add_entry(&mut doc, "2026-01-05", 1_767_600_000_000, "lunch", [500.0, 30.0, 50.0, 10.0]);
        add_entry(&mut doc, "2026-01-05", 1_767_600_000_500, "shake", [210.5, 24.3, 8.0, 3.5]);
        doc.days.get_mut("2026-01-05").unwrap().weight = "80.4".to_string();
        doc.goals = GoalSet { cals: 2000, p: 150, c: 200, f: 70 };
        doc.colors.p = "#123456".to_string();

        store.save_document(&doc).await.unwrap();
        assert_eq!(store.load_document().await, doc);
    }

    #[tokio::test]
    async fn stored_shape_uses_short_keys() {
        let store = temp_store("shape").await;
        let mut doc = Document::default();
        add_entry(&mut doc, "2026-01-05", 99, "toast", [90.0, 3.0, 15.0, 1.0]);
        store.save_document(&doc).await.unwrap();

        let raw = store.get(DOCUMENT_KEY).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value["days"]["2026-01-05"]["entries"][0];
        assert_eq!(entry["ts"], 99);
        assert_eq!(entry["cals"], 90);
        assert_eq!(value["goals"]["cals"], 0);
        assert_eq!(value["colors"]["cal"], "#8b95ff");
    }

    #[tokio::test]
    async fn theme_round_trips_as_plain_text() {
        let store = temp_store("theme").await;
        store.save_theme(Theme::Light).await.unwrap();
        assert_eq!(store.get(THEME_KEY).await.as_deref(), Some("light"));
        assert_eq!(store.load_theme().await, Theme::Light);

        store.set(THEME_KEY, "neon").await.unwrap();
        assert_eq!(store.load_theme().await, Theme::Dark);
    }
}
