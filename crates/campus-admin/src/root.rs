//! The whole state tree and every action that can touch it.

use campus_api::ApiClient;
use campus_core::{Action, ActionKind, EngineBuilder};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthAction, AuthSaga, AuthState};
use crate::calendar::{CalendarAction, CalendarState};
use crate::crud::{CrudAction, CrudState};
use crate::crud_saga::CrudSaga;
use crate::records::{AcademicYear, AttendanceStatus, Batch, Employee, Exam, ExamPaper, SchoolClass, Student};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub auth: AuthState,
    pub academic_year: CrudState<AcademicYear>,
    pub student: CrudState<Student>,
    pub employee: CrudState<Employee>,
    pub school_class: CrudState<SchoolClass>,
    pub batch: CrudState<Batch>,
    pub exam: CrudState<Exam>,
    pub exam_paper: CrudState<ExamPaper>,
    pub attendance_status: CrudState<AttendanceStatus>,
    #[serde(skip)]
    pub calendar: CalendarState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Auth(AuthAction),
    AcademicYear(CrudAction<AcademicYear>),
    Student(CrudAction<Student>),
    Employee(CrudAction<Employee>),
    SchoolClass(CrudAction<SchoolClass>),
    Batch(CrudAction<Batch>),
    Exam(CrudAction<Exam>),
    ExamPaper(CrudAction<ExamPaper>),
    AttendanceStatus(CrudAction<AttendanceStatus>),
    Calendar(CalendarAction),
    /// Ends the session: every branch returns to its initial shape.
    Logout,
}

impl Action for AppAction {
    fn kind(&self) -> ActionKind {
        match self {
            Self::Auth(action) => action.kind(),
            Self::AcademicYear(action) => action.kind(),
            Self::Student(action) => action.kind(),
            Self::Employee(action) => action.kind(),
            Self::SchoolClass(action) => action.kind(),
            Self::Batch(action) => action.kind(),
            Self::Exam(action) => action.kind(),
            Self::ExamPaper(action) => action.kind(),
            Self::AttendanceStatus(action) => action.kind(),
            Self::Calendar(action) => action.kind(),
            Self::Logout => ActionKind::command("root", "logout"),
        }
    }

    fn is_reset(&self) -> bool {
        matches!(self, Self::Logout)
    }
}

impl From<AuthAction> for AppAction {
    fn from(action: AuthAction) -> Self {
        Self::Auth(action)
    }
}

impl From<CalendarAction> for AppAction {
    fn from(action: CalendarAction) -> Self {
        Self::Calendar(action)
    }
}

/// Root reducer.
pub fn reduce(state: &mut AppState, action: &AppAction) {
    match action {
        AppAction::Auth(action) => state.auth.reduce(action),
        AppAction::AcademicYear(action) => state.academic_year.reduce(action),
        AppAction::Student(action) => state.student.reduce(action),
        AppAction::Employee(action) => state.employee.reduce(action),
        AppAction::SchoolClass(action) => state.school_class.reduce(action),
        AppAction::Batch(action) => state.batch.reduce(action),
        AppAction::Exam(action) => state.exam.reduce(action),
        AppAction::ExamPaper(action) => state.exam_paper.reduce(action),
        AppAction::AttendanceStatus(action) => state.attendance_status.reduce(action),
        AppAction::Calendar(action) => state.calendar.reduce(action),
        AppAction::Logout => *state = AppState::default(),
    }
}

/// Engine with the root reducer and every saga registered. Add taps (e.g.
/// persistence) and an initial state before building.
pub fn engine_builder(api: ApiClient) -> EngineBuilder<AppState, AppAction, ApiClient> {
    EngineBuilder::new(api)
        .with_reducer(reduce)
        .with_saga(AuthSaga)
        .with_saga(CrudSaga::<AcademicYear>::new())
        .with_saga(CrudSaga::<Student>::new())
        .with_saga(CrudSaga::<Employee>::new())
        .with_saga(CrudSaga::<SchoolClass>::new())
        .with_saga(CrudSaga::<Batch>::new())
        .with_saga(CrudSaga::<Exam>::new())
        .with_saga(CrudSaga::<ExamPaper>::new())
        .with_saga(CrudSaga::<AttendanceStatus>::new())
}
