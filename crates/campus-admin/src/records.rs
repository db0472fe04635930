//! Backend records, one per managed resource.
//!
//! Field names follow the API's camelCase JSON. Every record carries an
//! optional `_id`: absent on create, set by the backend.

use campus_api::EntityId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcademicYear {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
}

impl AcademicYear {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

entity!(AcademicYear => AcademicYear, academic_year, slice = "academicYear", path = "academic-years");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub admission_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub class_id: Option<EntityId>,
    pub batch_id: Option<EntityId>,
}

entity!(Student => Student, student, slice = "student", path = "students");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Employee {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub joining_date: Option<NaiveDate>,
}

entity!(Employee => Employee, employee, slice = "employee", path = "employees");

/// A class (grade), e.g. "Grade 7". Named to stay clear of the keyword.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolClass {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub academic_year_id: Option<EntityId>,
}

entity!(SchoolClass => SchoolClass, school_class, slice = "schoolClass", path = "classes");

/// A section of a class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Batch {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub class_id: Option<EntityId>,
    pub capacity: Option<u32>,
}

entity!(Batch => Batch, batch, slice = "batch", path = "batches");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Exam {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub academic_year_id: Option<EntityId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

entity!(Exam => Exam, exam, slice = "exam", path = "exams");

/// One subject sitting within an exam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExamPaper {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub exam_id: Option<EntityId>,
    pub class_id: Option<EntityId>,
    pub subject: String,
    pub exam_date: Option<NaiveDate>,
    pub max_marks: Option<u32>,
}

entity!(ExamPaper => ExamPaper, exam_paper, slice = "examPaper", path = "exam-papers");

/// A configurable attendance mark such as "Present" or "Late".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceStatus {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub code: Option<String>,
    pub color: Option<String>,
}

entity!(AttendanceStatus => AttendanceStatus, attendance_status, slice = "attendanceStatus", path = "attendance-statuses");
