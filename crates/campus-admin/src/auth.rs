//! Login and the signed-in user's profile.

use std::fmt;

use async_trait::async_trait;
use campus_api::{endpoints, settle, ApiClient, ApiEnvelope, EntityId, OpClass};
use campus_core::{ActionKind, AsyncSlice, AsyncState, Effects, Phase, Saga, SagaContext};
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use crate::root::{AppAction, AppState};

pub const SLICE: &str = "auth";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What a successful login returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(alias = "accessToken")]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    Login(Phase<Credentials, ApiEnvelope<Session>>),
    Profile(Phase<(), ApiEnvelope<UserProfile>>),
}

impl AuthAction {
    pub fn login(credentials: Credentials) -> Self {
        Self::Login(Phase::Request(credentials))
    }

    pub fn profile() -> Self {
        Self::Profile(Phase::Request(()))
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Login(phase) => ActionKind::new(SLICE, "login", phase.tag()),
            Self::Profile(phase) => ActionKind::new(SLICE, "profile", phase.tag()),
        }
    }

    pub fn is_request(&self) -> bool {
        match self {
            Self::Login(phase) => phase.is_request(),
            Self::Profile(phase) => phase.is_request(),
        }
    }
}

/// The auth branch. The only branch that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(rename = "authLoginData", default)]
    pub login: AsyncState<ApiEnvelope<Session>>,
    #[serde(rename = "authProfileData", default)]
    pub profile: AsyncState<ApiEnvelope<UserProfile>>,
}

impl AuthState {
    pub fn reduce(&mut self, action: &AuthAction) {
        match action {
            AuthAction::Login(phase) => {
                AsyncSlice::new(SLICE, "authLoginData", |s: &mut Self| &mut s.login).apply(self, phase)
            }
            AuthAction::Profile(phase) => {
                AsyncSlice::new(SLICE, "authProfileData", |s: &mut Self| &mut s.profile).apply(self, phase)
            }
        }
    }

    /// Bearer token of the current session.
    pub fn token(&self) -> Option<&str> {
        self.login
            .data
            .as_ref()
            .and_then(|envelope| envelope.data.as_ref())
            .map(|session| session.token.as_str())
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }
}

/// Login settles like a mutation and triggers no refresh; the profile
/// settles like a read.
pub struct AuthSaga;

#[async_trait]
impl Saga<AppState, AppAction, ApiClient> for AuthSaga {
    fn name(&self) -> &'static str {
        SLICE
    }

    fn watches(&self, action: &AppAction) -> bool {
        matches!(action, AppAction::Auth(action) if action.is_request())
    }

    async fn handle(&self, dispatched: AppAction, ctx: SagaContext<AppState, ApiClient>) -> Effects<AppAction> {
        let AppAction::Auth(action) = dispatched else {
            return Effects::new();
        };
        let api = ctx.deps();

        let outcome = match action {
            AuthAction::Login(Phase::Request(credentials)) => {
                tracing::info!(email = %credentials.email, correlation_id = %ctx.correlation_id(), "signing in");
                let result = api.call(endpoints::login(&credentials), None).await;
                AuthAction::Login(Phase::settle(settle(OpClass::Mutation, result)))
            }
            AuthAction::Profile(Phase::Request(())) => {
                let token = ctx.select(|state| state.auth.token().map(str::to_owned));
                let result = api.send(endpoints::profile().bearer(token)).await;
                AuthAction::Profile(Phase::settle(settle(OpClass::Read, result)))
            }
            _ => return Effects::new(),
        };
        smallvec![AppAction::Auth(outcome)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::FailurePayload;

    fn session(token: &str) -> ApiEnvelope<Session> {
        ApiEnvelope::new(Session {
            token: token.to_owned(),
            user: None,
        })
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let rendered = format!("{:?}", AuthAction::login(Credentials::new("a@b.com", "hunter2")));
        assert!(rendered.contains("a@b.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_token_follows_login_lifecycle() {
        let mut state = AuthState::default();
        assert_eq!(state.token(), None);

        state.reduce(&AuthAction::Login(Phase::Success(session("t-1"))));
        assert_eq!(state.token(), Some("t-1"));

        state.reduce(&AuthAction::login(Credentials::new("a@b.com", "x")));
        assert!(!state.is_signed_in());

        state.reduce(&AuthAction::Login(Phase::Failure(FailurePayload::from("Invalid credentials"))));
        assert_eq!(state.login.error.as_deref(), Some("Invalid credentials"));
        assert_eq!(state.token(), None);
    }

    #[test]
    fn test_session_accepts_access_token_alias() {
        let session: Session = serde_json::from_value(serde_json::json!({ "accessToken": "t-2" })).unwrap();
        assert_eq!(session.token, "t-2");
    }

    #[test]
    fn test_persisted_keys() {
        let value = serde_json::to_value(AuthState::default()).unwrap();
        assert!(value.get("authLoginData").is_some());
        assert!(value.get("authProfileData").is_some());
    }
}
