//! # School Admin Demo
//!
//! Signs in against a running backend, loads academic years and students,
//! and keeps the session on disk so the next run skips the login.
//!
//! ```text
//! CAMPUS_API_URL=http://localhost:4000/api \
//! CAMPUS_EMAIL=admin@school.test CAMPUS_PASSWORD=secret \
//! RUST_LOG=info,campus_core=debug cargo run -p school-admin-demo
//! ```
//!
//! Set `CAMPUS_LOGOUT=1` to end the session (and delete the saved copy) on exit.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use campus_admin::{
    engine_builder, AcademicYear, AppAction, AppState, AuthAction, Credentials, CrudAction, Entity, Student,
};
use campus_api::{ApiClient, ApiConfig};
use campus_core::EngineHandle;
use campus_persistence::{FileStorage, PersistConfig, Persistor};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

const STATE_DIR_VAR: &str = "CAMPUS_STATE_DIR";

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(error = %e, "tracing init failed");
    }

    let config = ApiConfig::from_env()?;
    let api = ApiClient::http(&config)?;
    println!("Backend: {}", config.base_url);

    let state_dir = env::var(STATE_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("campus-admin"));
    let persistor = Persistor::new(Arc::new(FileStorage::new(&state_dir)), PersistConfig::default());
    let initial = persistor.rehydrate(AppState::default()).unwrap_or_else(|err| {
        warn!(error = %err, dir = %state_dir.display(), "ignoring unreadable saved session");
        AppState::default()
    });

    let engine = engine_builder(api).with_state(initial).with_tap(persistor).build().start();

    if engine.select(|s| s.auth.is_signed_in()) {
        println!("Resuming saved session");
    } else {
        sign_in(&engine).await?;
    }

    engine.dispatch_and_await(AuthAction::profile().into()).await?;
    match engine.select(|s| s.auth.profile.data.clone()).and_then(|envelope| envelope.data) {
        Some(profile) => println!(
            "Hello, {}",
            profile.name.or(profile.email).unwrap_or_else(|| "unknown user".to_owned())
        ),
        None => {
            let error = engine.select(|s| s.auth.profile.error.clone());
            println!("Could not load profile: {}", error.unwrap_or_default());
        }
    }

    list::<AcademicYear>(&engine, |year| year.name.clone()).await?;
    list::<Student>(&engine, |student| format!("{} {}", student.first_name, student.last_name)).await?;

    if env::var("CAMPUS_LOGOUT").is_ok() {
        engine.dispatch_and_await(AppAction::Logout).await?;
        println!("Signed out");
    }

    engine.shutdown();
    Ok(())
}

async fn sign_in(engine: &EngineHandle<AppState, AppAction>) -> Result<()> {
    let email = env::var("CAMPUS_EMAIL").context("CAMPUS_EMAIL is required to sign in")?;
    let password = env::var("CAMPUS_PASSWORD").context("CAMPUS_PASSWORD is required to sign in")?;

    engine
        .dispatch_and_await(AuthAction::login(Credentials::new(email, password)).into())
        .await?;

    if let Some(error) = engine.select(|s| s.auth.login.error.clone()) {
        bail!("sign-in failed: {error}");
    }
    println!("Signed in");
    Ok(())
}

async fn list<E: Entity>(engine: &EngineHandle<AppState, AppAction>, label: impl Fn(&E) -> String) -> Result<()> {
    engine.dispatch_and_await(E::widen(CrudAction::list())).await?;

    let (items, error) = engine.select(|s| {
        let slice = E::slice(s);
        (slice.items().to_vec(), slice.list.error.clone())
    });
    match error {
        Some(error) => println!("{}: failed ({error})", E::PATH),
        None => {
            println!("{} ({}):", E::PATH, items.len());
            for item in &items {
                println!("  - {}", label(item));
            }
        }
    }
    Ok(())
}
