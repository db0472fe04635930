//! Macros for reducing entity boilerplate.

/// Implements [`Entity`](crate::Entity) for a record and routes its
/// [`CrudAction`](crate::CrudAction)s through one [`AppAction`](crate::AppAction)
/// variant and one [`AppState`](crate::AppState) field.
///
/// # Example
///
/// ```ignore
/// entity!(Exam => Exam, exam, slice = "exam", path = "exams");
/// ```
macro_rules! entity {
    ($record:ident => $variant:ident, $field:ident, slice = $slice:literal, path = $path:literal) => {
        impl $crate::entity::Entity for $record {
            const SLICE: &'static str = $slice;
            const PATH: &'static str = $path;

            fn id(&self) -> Option<&campus_api::EntityId> {
                self.id.as_ref()
            }

            fn narrow(action: &$crate::root::AppAction) -> Option<&$crate::crud::CrudAction<Self>> {
                match action {
                    $crate::root::AppAction::$variant(action) => Some(action),
                    _ => None,
                }
            }

            fn widen(action: $crate::crud::CrudAction<Self>) -> $crate::root::AppAction {
                $crate::root::AppAction::$variant(action)
            }

            fn slice(state: &$crate::root::AppState) -> &$crate::crud::CrudState<Self> {
                &state.$field
            }
        }

        impl From<$crate::crud::CrudAction<$record>> for $crate::root::AppAction {
            fn from(action: $crate::crud::CrudAction<$record>) -> Self {
                $crate::root::AppAction::$variant(action)
            }
        }
    };
}
