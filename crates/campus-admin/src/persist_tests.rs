//! The auth branch surviving a restart, and nothing else.

use std::sync::Arc;

use campus_api::{ApiClient, Method};
use campus_persistence::{MemoryStorage, PersistConfig, Persistor, StateStorage, DEFAULT_ROOT_KEY};
use campus_testing::{MockTransport, Reply};
use serde_json::{json, Value};

use crate::*;

fn persistor(storage: &Arc<MemoryStorage>) -> Persistor<AppState> {
    Persistor::new(Arc::clone(storage) as Arc<dyn StateStorage>, PersistConfig::default())
}

fn backend() -> MockTransport {
    MockTransport::new()
        .on(Method::POST, "auth/login", Reply::ok(json!({ "token": "t-1" })))
        .on(Method::GET, "auth/profile", Reply::ok(json!({ "name": "Ada", "email": "ada@school.test" })))
        .on(Method::GET, "academic-years", Reply::ok(json!([{ "_id": "ay1", "name": "2025-26" }])))
}

fn keys(value: &Value) -> Vec<&str> {
    let mut keys: Vec<&str> = value
        .as_object()
        .map(|object| object.keys().map(String::as_str).collect())
        .unwrap_or_default();
    keys.sort_unstable();
    keys
}

#[tokio::test]
async fn test_login_persists_only_the_auth_branch() {
    let storage = Arc::new(MemoryStorage::new());
    let engine = engine_builder(ApiClient::new(Arc::new(backend())))
        .with_tap(persistor(&storage))
        .build()
        .start();

    engine
        .dispatch_and_await(AuthAction::login(Credentials::new("ada@school.test", "x")).into())
        .await
        .unwrap();

    let stored = storage.load(DEFAULT_ROOT_KEY).unwrap().expect("session saved");
    assert_eq!(keys(&stored), vec!["auth"]);
    assert_eq!(keys(&stored["auth"]), vec!["authLoginData", "authProfileData"]);
    assert_eq!(stored["auth"]["authLoginData"]["data"]["data"]["token"], json!("t-1"));

    engine.dispatch_and_await(CrudAction::<AcademicYear>::list().into()).await.unwrap();
    assert_eq!(engine.select(|s| s.academic_year.items().len()), 1);
    assert_eq!(storage.load(DEFAULT_ROOT_KEY).unwrap(), Some(stored));
}

#[tokio::test]
async fn test_restart_resumes_the_saved_session() {
    let storage = Arc::new(MemoryStorage::new());
    let first = engine_builder(ApiClient::new(Arc::new(backend())))
        .with_tap(persistor(&storage))
        .build()
        .start();
    first
        .dispatch_and_await(AuthAction::login(Credentials::new("ada@school.test", "x")).into())
        .await
        .unwrap();
    first.dispatch_and_await(CrudAction::<AcademicYear>::list().into()).await.unwrap();
    first.shutdown();

    let restored = persistor(&storage).rehydrate(AppState::default()).unwrap();
    assert_eq!(restored.auth.token(), Some("t-1"));
    assert_eq!(restored.academic_year, AppState::default().academic_year);

    let mock = backend();
    let second = engine_builder(ApiClient::new(Arc::new(mock.clone())))
        .with_state(restored)
        .with_tap(persistor(&storage))
        .build()
        .start();
    second.dispatch_and_await(AuthAction::profile().into()).await.unwrap();

    assert!(second.select(|s| s.auth.is_signed_in()));
    assert_eq!(mock.calls_to(&Method::GET, "auth/profile")[0].bearer.as_deref(), Some("t-1"));
}

#[tokio::test]
async fn test_logout_deletes_the_saved_session() {
    let storage = Arc::new(MemoryStorage::new());
    let engine = engine_builder(ApiClient::new(Arc::new(backend())))
        .with_tap(persistor(&storage))
        .build()
        .start();

    engine
        .dispatch_and_await(AuthAction::login(Credentials::new("ada@school.test", "x")).into())
        .await
        .unwrap();
    assert!(storage.load(DEFAULT_ROOT_KEY).unwrap().is_some());

    engine.dispatch_and_await(AppAction::Logout).await.unwrap();

    assert_eq!(storage.load(DEFAULT_ROOT_KEY).unwrap(), None);
    assert!(storage.is_empty());
    assert_eq!(engine.state(), AppState::default());
}
