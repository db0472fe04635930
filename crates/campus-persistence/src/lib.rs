//! Durable storage for part of a campus state tree.
//!
//! Only the top-level keys on the allow-list are written, all of them under
//! one root key. Everything else starts from its initial shape on every
//! launch.
//!
//! ```ignore
//! let persistor = Persistor::new(Arc::new(FileStorage::new(dir)), PersistConfig::default());
//! let initial = persistor.rehydrate(AppState::default())?;
//!
//! let engine = engine_builder(api)
//!     .with_state(initial)
//!     .with_tap(persistor)
//!     .build()
//!     .start();
//! ```

mod storage;

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use campus_core::{Action, StateTap};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use storage::{FileStorage, MemoryStorage, StateStorage};

pub const DEFAULT_ROOT_KEY: &str = "persist:root";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("persisted state must serialize to a JSON object")]
    NotAnObject,
}

/// What gets persisted, and under which key.
///
/// Each allow-listed name is both a top-level key of the state tree and the
/// slice of the actions that change it. Actions from other slices never
/// trigger a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistConfig {
    pub root_key: String,
    pub allow: Vec<String>,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            root_key: DEFAULT_ROOT_KEY.to_owned(),
            allow: vec!["auth".to_owned()],
        }
    }
}

impl PersistConfig {
    pub fn allow(mut self, key: impl Into<String>) -> Self {
        self.allow.push(key.into());
        self
    }
}

/// Saves the allow-listed branches of `S` whenever an action of an
/// allow-listed slice changes them, and forgets them on a reset action.
pub struct Persistor<S> {
    storage: Arc<dyn StateStorage>,
    config: PersistConfig,
    last_saved: Mutex<Option<Value>>,
    _state: PhantomData<fn(&S)>,
}

impl<S> Persistor<S>
where
    S: Serialize + DeserializeOwned,
{
    pub fn new(storage: Arc<dyn StateStorage>, config: PersistConfig) -> Self {
        Self {
            storage,
            config,
            last_saved: Mutex::new(None),
            _state: PhantomData,
        }
    }

    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    /// Whether actions of `slice` can touch a persisted branch.
    pub fn watches(&self, slice: &str) -> bool {
        self.config.allow.iter().any(|key| key == slice)
    }

    /// The allow-listed branches of `state`, as stored.
    pub fn snapshot(&self, state: &S) -> Result<Value, PersistError> {
        let Value::Object(mut tree) = serde_json::to_value(state)? else {
            return Err(PersistError::NotAnObject);
        };
        let picked: Map<String, Value> = self
            .config
            .allow
            .iter()
            .filter_map(|key| tree.remove(key).map(|branch| (key.clone(), branch)))
            .collect();
        Ok(Value::Object(picked))
    }

    /// `initial` with the stored branches laid over it. Stored keys that are
    /// no longer allow-listed are ignored.
    pub fn rehydrate(&self, initial: S) -> Result<S, PersistError> {
        let Value::Object(mut tree) = serde_json::to_value(initial)? else {
            return Err(PersistError::NotAnObject);
        };
        let Some(stored) = self.storage.load(&self.config.root_key)? else {
            tracing::debug!(root_key = %self.config.root_key, "nothing to rehydrate");
            return Ok(serde_json::from_value(Value::Object(tree))?);
        };
        let Value::Object(mut stored) = stored else {
            return Err(PersistError::NotAnObject);
        };

        let mut restored = Vec::new();
        for key in &self.config.allow {
            if let Some(branch) = stored.remove(key) {
                tree.insert(key.clone(), branch);
                restored.push(key.as_str());
            }
        }
        tracing::info!(root_key = %self.config.root_key, keys = ?restored, "state rehydrated");

        let state: S = serde_json::from_value(Value::Object(tree))?;
        *self.last_saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(self.snapshot(&state)?);
        Ok(state)
    }

    /// Deletes everything stored under the root key.
    pub fn purge(&self) -> Result<(), PersistError> {
        *self.last_saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        self.storage.remove(&self.config.root_key)
    }

    fn persist(&self, state: &S) -> Result<(), PersistError> {
        let snapshot = self.snapshot(state)?;
        let mut last_saved = self.last_saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if last_saved.as_ref() == Some(&snapshot) {
            return Ok(());
        }
        self.storage.save(&self.config.root_key, &snapshot)?;
        tracing::trace!(root_key = %self.config.root_key, "state persisted");
        *last_saved = Some(snapshot);
        Ok(())
    }
}

impl<S, A> StateTap<S, A> for Persistor<S>
where
    S: Serialize + DeserializeOwned + 'static,
    A: Action,
{
    fn on_dispatch(&self, action: &A, state: &S) {
        let kind = action.kind();
        let result = if action.is_reset() {
            self.purge()
        } else if self.watches(kind.slice) {
            self.persist(state)
        } else {
            return;
        };
        if let Err(err) = result {
            tracing::warn!(action = %kind, error = %err, "failed to persist state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::ActionKind;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct TestState {
        auth: Option<String>,
        items: Vec<u32>,
    }

    #[derive(Debug, Clone)]
    enum TestAction {
        Edit,
        Reorder,
        Logout,
    }

    impl Action for TestAction {
        fn kind(&self) -> ActionKind {
            match self {
                Self::Edit => ActionKind::command("auth", "edit"),
                Self::Reorder => ActionKind::command("items", "reorder"),
                Self::Logout => ActionKind::command("test", "logout"),
            }
        }

        fn is_reset(&self) -> bool {
            matches!(self, Self::Logout)
        }
    }

    fn signed_in() -> TestState {
        TestState {
            auth: Some("t-1".to_owned()),
            items: vec![1, 2, 3],
        }
    }

    fn persistor(storage: &Arc<MemoryStorage>) -> Persistor<TestState> {
        Persistor::new(Arc::clone(storage) as Arc<dyn StateStorage>, PersistConfig::default())
    }

    #[test]
    fn test_snapshot_keeps_only_allowed_keys() {
        let storage = Arc::new(MemoryStorage::new());
        let snapshot = persistor(&storage).snapshot(&signed_in()).unwrap();
        assert_eq!(snapshot, json!({ "auth": "t-1" }));
    }

    #[test]
    fn test_tap_saves_on_change_and_purges_on_reset() {
        let storage = Arc::new(MemoryStorage::new());
        let persistor = persistor(&storage);

        persistor.on_dispatch(&TestAction::Edit, &TestState::default());
        assert_eq!(storage.load(DEFAULT_ROOT_KEY).unwrap(), Some(json!({ "auth": null })));

        persistor.on_dispatch(&TestAction::Edit, &signed_in());
        assert_eq!(storage.load(DEFAULT_ROOT_KEY).unwrap(), Some(json!({ "auth": "t-1" })));

        persistor.on_dispatch(&TestAction::Logout, &TestState::default());
        assert_eq!(storage.load(DEFAULT_ROOT_KEY).unwrap(), None);
    }

    #[test]
    fn test_tap_ignores_actions_outside_allowed_slices() {
        let storage = Arc::new(MemoryStorage::new());
        let persistor = persistor(&storage);

        persistor.on_dispatch(&TestAction::Reorder, &signed_in());
        assert!(storage.is_empty());

        persistor.on_dispatch(&TestAction::Edit, &signed_in());
        persistor.on_dispatch(
            &TestAction::Reorder,
            &TestState {
                auth: Some("changed elsewhere".to_owned()),
                items: Vec::new(),
            },
        );
        assert_eq!(storage.load(DEFAULT_ROOT_KEY).unwrap(), Some(json!({ "auth": "t-1" })));

        let custom = Persistor::<TestState>::new(
            Arc::clone(&storage) as Arc<dyn StateStorage>,
            PersistConfig::default().allow("items"),
        );
        assert!(custom.watches("items"));
        assert!(!persistor.watches("items"));
    }

    #[test]
    fn test_rehydrate_restores_allowed_branches_only() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .save(DEFAULT_ROOT_KEY, &json!({ "auth": "t-9", "items": [7] }))
            .unwrap();

        let state = persistor(&storage).rehydrate(TestState::default()).unwrap();
        assert_eq!(
            state,
            TestState {
                auth: Some("t-9".to_owned()),
                items: Vec::new(),
            }
        );
    }

    #[test]
    fn test_rehydrate_without_stored_state_returns_initial() {
        let storage = Arc::new(MemoryStorage::new());
        let state = persistor(&storage).rehydrate(signed_in()).unwrap();
        assert_eq!(state, signed_in());
    }

    #[test]
    fn test_rehydrate_rejects_non_object() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save(DEFAULT_ROOT_KEY, &json!("garbage")).unwrap();
        assert!(matches!(
            persistor(&storage).rehydrate(TestState::default()),
            Err(PersistError::NotAnObject)
        ));
    }
}
