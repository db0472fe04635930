use std::fmt;

use campus_api::EntityId;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::crud::{CrudAction, CrudState};
use crate::root::{AppAction, AppState};

/// A backend resource managed through the generic CRUD slice and saga.
///
/// Implemented with the `entity!` macro next to each record.
pub trait Entity: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Slice name, used in action kinds and logs.
    const SLICE: &'static str;

    /// REST path segment, relative to the API base URL.
    const PATH: &'static str;

    fn id(&self) -> Option<&EntityId>;

    /// This entity's action, if `action` belongs to it.
    fn narrow(action: &AppAction) -> Option<&CrudAction<Self>>;

    fn widen(action: CrudAction<Self>) -> AppAction;

    fn slice(state: &AppState) -> &CrudState<Self>;
}
