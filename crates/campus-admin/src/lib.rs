//! School administration state on top of `campus-core`.
//!
//! Every managed resource (academic years, students, employees, classes,
//! batches, exams, exam papers, attendance statuses) gets the same slice:
//! six request lifecycles plus a selected record, driven by one generic
//! [`CrudSaga`]. Auth has its own slice and saga; its token authenticates
//! every other call. The period calendar is local state only.
//!
//! ```ignore
//! let api = ApiClient::http(&ApiConfig::from_env()?)?;
//! let engine = campus_admin::engine_builder(api).build().start();
//!
//! engine
//!     .dispatch_and_await(AuthAction::login(Credentials::new("admin@school.test", "secret")).into())
//!     .await?;
//! engine.dispatch_and_await(CrudAction::<Student>::list().into()).await?;
//!
//! let students = engine.select(|s| s.student.items().to_vec());
//! ```

#[macro_use]
mod entity_macro;

pub mod auth;
pub mod calendar;
mod crud;
mod crud_saga;
mod entity;
pub mod records;
mod root;

#[cfg(test)]
mod persist_tests;

pub use auth::{AuthAction, AuthSaga, AuthState, Credentials, Session, UserProfile};
pub use calendar::{CalendarAction, CalendarError, CalendarFilter, CalendarState, PendingChange, Period};
pub use crud::{CrudAction, CrudState, UpdateRequest};
pub use crud_saga::CrudSaga;
pub use entity::Entity;
pub use records::{AcademicYear, AttendanceStatus, Batch, Employee, Exam, ExamPaper, SchoolClass, Student};
pub use root::{engine_builder, reduce, AppAction, AppState};
