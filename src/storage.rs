use crate::errors::AppError;
use crate::models::{ProgramState, StoredProgram};
use crate::program::validate;
use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{error, warn};

pub const PROGRAM_KEY: &str = "rise-reset";

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/store.json"))
}

/// String key/value store kept in memory and mirrored to a single JSON file.
#[derive(Debug, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the file at `path`. A missing or unreadable file starts an empty store.
    pub async fn open(path: &Path) -> Self {
        let values = match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(values) => values,
                Err(err) => {
                    error!("failed to parse store file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read store file: {err}");
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            values,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Updates the value in memory first, so a failed write only loses durability.
    pub async fn set(&mut self, key: &str, value: String) -> Result<(), AppError> {
        self.values.insert(key.to_string(), value);
        self.flush().await
    }

    async fn flush(&self) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let payload = serde_json::to_vec_pretty(&self.values).map_err(AppError::internal)?;
        fs::write(path, payload).await.map_err(AppError::internal)?;
        Ok(())
    }
}

pub fn load_program(store: &LocalStore) -> ProgramState {
    let Some(raw) = store.get(PROGRAM_KEY) else {
        return ProgramState::default();
    };

    match serde_json::from_str::<Option<StoredProgram>>(raw) {
        Ok(Some(stored)) => validate(stored.habits, stored.entries, stored.challenges, stored.day)
            .unwrap_or_else(|| {
                warn!("stored program is inconsistent, starting over");
                ProgramState::default()
            }),
        Ok(None) => ProgramState::default(),
        Err(err) => {
            warn!("stored program is unreadable, starting over: {err}");
            ProgramState::default()
        }
    }
}

pub async fn persist_program(store: &mut LocalStore, state: &ProgramState) -> Result<(), AppError> {
    let payload = serde_json::to_string(state).map_err(AppError::internal)?;
    store.set(PROGRAM_KEY, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Challenge, begin_program, commit_day, set_challenge_flag, set_habit_label};
    use chrono::{TimeZone, Utc};

    fn unique_store_path() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("rise_reset_store_{}_{}.json", std::process::id(), nanos));
        path
    }

    fn store_with(raw: &str) -> LocalStore {
        let mut store = LocalStore::in_memory();
        store.values.insert(PROGRAM_KEY.to_string(), raw.to_string());
        store
    }

    fn logged_program() -> ProgramState {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 7, 0, 0).unwrap();
        let state = set_habit_label(&ProgramState::default(), 1, "Read").unwrap();
        let state = begin_program(&state).unwrap();
        let state = set_challenge_flag(&state, Challenge::EarlyWake, true).unwrap();
        commit_day(&state, "up at five", now).unwrap()
    }

    #[test]
    fn malformed_records_load_as_default() {
        let cases = [
            "",
            "not json",
            "null",
            "42",
            "[]",
            r#"{"habits":["a","b"],"entries":[],"challenges":{"coldShower":false,"earlyWake":false}}"#,
            r#"{"habits":["a","b","c"],"entries":[null],"challenges":{"coldShower":false,"earlyWake":false}}"#,
            r#"{"habits":["a","b","c"],"challenges":{"coldShower":false,"earlyWake":false}}"#,
        ];
        for raw in cases {
            assert_eq!(load_program(&store_with(raw)), ProgramState::default(), "{raw}");
        }
        assert_eq!(load_program(&LocalStore::in_memory()), ProgramState::default());
    }

    fn record_without_day(filled: &[usize]) -> String {
        let entry = r#"{"date":"2025-01-02T08:00:00.000Z","habits":["a","b","c"],"challenges":{"coldShower":true,"earlyWake":false},"journal":"ok"}"#;
        let mut entries = vec!["null".to_string(); 66];
        for &slot in filled {
            entries[slot] = entry.to_string();
        }
        format!(
            r#"{{"habits":["a","b","c"],"entries":[{}],"challenges":{{"coldShower":true,"earlyWake":false}}}}"#,
            entries.join(",")
        )
    }

    #[test]
    fn record_without_day_resumes_after_last_entry() {
        let state = load_program(&store_with(&record_without_day(&[0, 1])));
        assert_eq!(state.day(), 3);
        assert_eq!(state.filled_entries(), 2);
        assert_eq!(state.entry(1).unwrap().journal(), "ok");
    }

    #[test]
    fn record_with_empty_first_slot_resets() {
        // Older browser builds logged day one into slot 1 and left slot 0 empty.
        let state = load_program(&store_with(&record_without_day(&[1, 2])));
        assert_eq!(state, ProgramState::default());
    }

    #[tokio::test]
    async fn save_of_loaded_state_is_byte_identical() {
        let mut store = LocalStore::in_memory();
        persist_program(&mut store, &logged_program()).await.unwrap();
        let first = store.get(PROGRAM_KEY).unwrap().to_string();

        let loaded = load_program(&store);
        persist_program(&mut store, &loaded).await.unwrap();
        assert_eq!(store.get(PROGRAM_KEY).unwrap(), first);
        assert_eq!(loaded, logged_program());
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let path = unique_store_path();
        let mut store = LocalStore::open(&path).await;
        persist_program(&mut store, &logged_program()).await.unwrap();
        store.set("rise-theme", "light".to_string()).await.unwrap();

        let reopened = LocalStore::open(&path).await;
        assert_eq!(reopened.get("rise-theme"), Some("light"));
        assert_eq!(load_program(&reopened), logged_program());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corrupt_file_opens_empty() {
        let path = unique_store_path();
        std::fs::write(&path, b"{ nope").unwrap();
        let store = LocalStore::open(&path).await;
        assert_eq!(store.get(PROGRAM_KEY), None);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn failed_write_keeps_value_in_memory() {
        let mut path = unique_store_path();
        path.push("missing_dir");
        path.push("store.json");
        let mut store = LocalStore::open(&path).await;

        let result = store.set("rise-gradient", "focus".to_string()).await;
        assert!(result.is_err());
        assert_eq!(store.get("rise-gradient"), Some("focus"));
    }
}
