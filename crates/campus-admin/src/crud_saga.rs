use std::marker::PhantomData;

use async_trait::async_trait;
use campus_api::{endpoints, settle, ApiClient, OpClass};
use campus_core::{Effects, Phase, Saga, SagaContext};
use smallvec::smallvec;

use crate::crud::CrudAction;
use crate::entity::Entity;
use crate::root::{AppAction, AppState};

/// Request-to-outcome saga for one entity's six operations.
///
/// Reads settle on the body's `success` flag, mutations on the HTTP status.
/// A successful mutation is followed by an unfiltered list request.
pub struct CrudSaga<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> CrudSaga<E> {
    pub fn new() -> Self {
        Self { _entity: PhantomData }
    }
}

impl<E: Entity> Default for CrudSaga<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Saga<AppState, AppAction, ApiClient> for CrudSaga<E> {
    fn name(&self) -> &'static str {
        E::SLICE
    }

    fn watches(&self, action: &AppAction) -> bool {
        E::narrow(action).is_some_and(CrudAction::is_request)
    }

    async fn handle(&self, dispatched: AppAction, ctx: SagaContext<AppState, ApiClient>) -> Effects<AppAction> {
        let Some(action) = E::narrow(&dispatched) else {
            return Effects::new();
        };
        let api = ctx.deps();
        let token = ctx.select(|state| state.auth.token().map(str::to_owned));

        let outcome = match action {
            CrudAction::List(Phase::Request(query)) => {
                let result = api.send(endpoints::list(E::PATH, query).bearer(token)).await;
                CrudAction::List(Phase::settle(settle(OpClass::Read, result)))
            }
            CrudAction::Paginated(Phase::Request(query)) => {
                let result = api.send(endpoints::paginated(E::PATH, query).bearer(token)).await;
                CrudAction::Paginated(Phase::settle(settle(OpClass::Read, result)))
            }
            CrudAction::FetchOne(Phase::Request(id)) => {
                let result = api.send(endpoints::fetch(E::PATH, id).bearer(token)).await;
                CrudAction::FetchOne(Phase::settle(settle(OpClass::Read, result)))
            }
            CrudAction::Create(Phase::Request(body)) => {
                let result = api.call(endpoints::create(E::PATH, body), token).await;
                return mutated::<E>(CrudAction::Create(Phase::settle(settle(OpClass::Mutation, result))));
            }
            CrudAction::Update(Phase::Request(update)) => {
                let result = api.call(endpoints::update(E::PATH, &update.id, &update.body), token).await;
                return mutated::<E>(CrudAction::Update(Phase::settle(settle(OpClass::Mutation, result))));
            }
            CrudAction::Delete(Phase::Request(id)) => {
                let result = api.send(endpoints::delete(E::PATH, id).bearer(token)).await;
                return mutated::<E>(CrudAction::Delete(Phase::settle(settle(OpClass::Mutation, result))));
            }
            _ => return Effects::new(),
        };
        smallvec![E::widen(outcome)]
    }
}

/// The terminal action of a mutation, plus the list refresh on success.
fn mutated<E: Entity>(outcome: CrudAction<E>) -> Effects<AppAction> {
    let succeeded = matches!(
        &outcome,
        CrudAction::Create(Phase::Success(_)) | CrudAction::Update(Phase::Success(_)) | CrudAction::Delete(Phase::Success(_))
    );
    let mut effects: Effects<AppAction> = smallvec![E::widen(outcome)];
    if succeeded {
        tracing::debug!(slice = E::SLICE, "refreshing list after mutation");
        effects.push(E::widen(CrudAction::list()));
    }
    effects
}
