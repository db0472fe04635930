//! The six-operation CRUD slice shared by every entity.

use campus_api::{ApiEnvelope, EntityId, ListQuery, Page, PageQuery};
use campus_core::{ActionKind, AsyncSlice, AsyncState, Phase, PhaseTag};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::Entity;

/// Body and target of an update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest<E> {
    pub id: EntityId,
    pub body: E,
}

/// Everything that can happen to one entity's slice.
#[derive(Debug, Clone, PartialEq)]
pub enum CrudAction<E> {
    List(Phase<ListQuery, ApiEnvelope<Vec<E>>>),
    Paginated(Phase<PageQuery, ApiEnvelope<Page<E>>>),
    FetchOne(Phase<EntityId, ApiEnvelope<E>>),
    Create(Phase<E, ApiEnvelope<E>>),
    Update(Phase<UpdateRequest<E>, ApiEnvelope<E>>),
    Delete(Phase<EntityId, ApiEnvelope<Value>>),
    /// Sets or clears the record an edit form works on.
    Select(Option<E>),
}

impl<E: Entity> CrudAction<E> {
    /// Shorthand for the unfiltered list request.
    pub fn list() -> Self {
        Self::List(Phase::Request(ListQuery::default()))
    }

    pub fn kind(&self) -> ActionKind {
        let (operation, phase) = match self {
            Self::List(phase) => ("list", phase.tag()),
            Self::Paginated(phase) => ("paginated", phase.tag()),
            Self::FetchOne(phase) => ("fetchOne", phase.tag()),
            Self::Create(phase) => ("create", phase.tag()),
            Self::Update(phase) => ("update", phase.tag()),
            Self::Delete(phase) => ("delete", phase.tag()),
            Self::Select(_) => ("select", PhaseTag::Command),
        };
        ActionKind::new(E::SLICE, operation, phase)
    }

    pub fn is_request(&self) -> bool {
        self.kind().phase == PhaseTag::Request
    }
}

/// One entity's slice of the state tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudState<E> {
    #[serde(rename = "listData")]
    pub list: AsyncState<ApiEnvelope<Vec<E>>>,
    #[serde(rename = "paginatedData")]
    pub paginated: AsyncState<ApiEnvelope<Page<E>>>,
    #[serde(rename = "fetchOneData")]
    pub fetch_one: AsyncState<ApiEnvelope<E>>,
    #[serde(rename = "createData")]
    pub create: AsyncState<ApiEnvelope<E>>,
    #[serde(rename = "updateData")]
    pub update: AsyncState<ApiEnvelope<E>>,
    #[serde(rename = "deleteData")]
    pub delete: AsyncState<ApiEnvelope<Value>>,
    pub selected: Option<E>,
}

impl<E> Default for CrudState<E> {
    fn default() -> Self {
        Self {
            list: AsyncState::default(),
            paginated: AsyncState::default(),
            fetch_one: AsyncState::default(),
            create: AsyncState::default(),
            update: AsyncState::default(),
            delete: AsyncState::default(),
            selected: None,
        }
    }
}

impl<E: Entity> CrudState<E> {
    pub fn reduce(&mut self, action: &CrudAction<E>) {
        match action {
            CrudAction::List(phase) => AsyncSlice::new(E::SLICE, "listData", |s: &mut Self| &mut s.list).apply(self, phase),
            CrudAction::Paginated(phase) => {
                AsyncSlice::new(E::SLICE, "paginatedData", |s: &mut Self| &mut s.paginated).apply(self, phase)
            }
            CrudAction::FetchOne(phase) => {
                AsyncSlice::new(E::SLICE, "fetchOneData", |s: &mut Self| &mut s.fetch_one).apply(self, phase)
            }
            CrudAction::Create(phase) => {
                AsyncSlice::new(E::SLICE, "createData", |s: &mut Self| &mut s.create).apply(self, phase)
            }
            CrudAction::Update(phase) => {
                AsyncSlice::new(E::SLICE, "updateData", |s: &mut Self| &mut s.update).apply(self, phase)
            }
            CrudAction::Delete(phase) => {
                AsyncSlice::new(E::SLICE, "deleteData", |s: &mut Self| &mut s.delete).apply(self, phase)
            }
            CrudAction::Select(entity) => self.selected = entity.clone(),
        }
    }

    /// Records of the last successful list, or nothing.
    pub fn items(&self) -> &[E] {
        self.list
            .data
            .as_ref()
            .and_then(|envelope| envelope.data.as_deref())
            .unwrap_or_default()
    }
}
