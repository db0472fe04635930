//! Request builders, one per network call. Paths are relative to the base URL.

use serde::Serialize;

use crate::transport::{ApiRequest, TransportError};
use crate::types::{EntityId, ListQuery, PageQuery};

pub const LOGIN_PATH: &str = "auth/login";
pub const PROFILE_PATH: &str = "auth/profile";

/// `GET /{resource}` with optional filters.
pub fn list(resource: &str, query: &ListQuery) -> ApiRequest {
    ApiRequest::get(resource).query(query.pairs())
}

/// `GET /{resource}/paginated?page&limit&search`.
pub fn paginated(resource: &str, query: &PageQuery) -> ApiRequest {
    ApiRequest::get(format!("{resource}/paginated")).query(query.pairs())
}

/// `GET /{resource}/{id}`.
pub fn fetch(resource: &str, id: &EntityId) -> ApiRequest {
    ApiRequest::get(format!("{resource}/{id}"))
}

/// `POST /{resource}`.
pub fn create<B: Serialize + ?Sized>(resource: &str, body: &B) -> Result<ApiRequest, TransportError> {
    ApiRequest::post(resource).json(body)
}

/// `PUT /{resource}/{id}`.
pub fn update<B: Serialize + ?Sized>(resource: &str, id: &EntityId, body: &B) -> Result<ApiRequest, TransportError> {
    ApiRequest::put(format!("{resource}/{id}")).json(body)
}

/// `DELETE /{resource}/{id}`.
pub fn delete(resource: &str, id: &EntityId) -> ApiRequest {
    ApiRequest::delete(format!("{resource}/{id}"))
}

/// `POST /auth/login`. Unauthenticated.
pub fn login<B: Serialize + ?Sized>(credentials: &B) -> Result<ApiRequest, TransportError> {
    ApiRequest::post(LOGIN_PATH).json(credentials)
}

/// `GET /auth/profile`.
pub fn profile() -> ApiRequest {
    ApiRequest::get(PROFILE_PATH)
}
