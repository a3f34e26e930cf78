use serde::{Deserialize, Serialize};

use crate::models::{Course, Lesson, Progress, User};

// -- Session --

/// Identity stored in the session cookie once a login succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: i64,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One-shot message shown on the next page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

// -- Forms --
//
// Every field is optional so a missing input reaches the handler and becomes
// a validation notice instead of an extractor rejection. Password-bearing
// forms deliberately do not derive Debug.

#[derive(Default, Deserialize)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

// -- Views --

/// Envelope for every rendered page.
#[derive(Debug, Serialize)]
pub struct PageView<T: Serialize> {
    pub page: &'static str,
    pub user: Option<SessionUser>,
    pub notice: Option<Notice>,
    #[serde(flatten)]
    pub content: T,
}

/// Content for pages that carry nothing beyond the envelope.
#[derive(Debug, Default, Serialize)]
pub struct Blank {}

#[derive(Debug, Serialize)]
pub struct CourseList {
    pub courses: Vec<Course>,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Serialize)]
pub struct LessonDetail {
    pub lesson: Lesson,
    /// `None` for anonymous viewers.
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub profile: User,
    pub completed_lessons: usize,
    /// Every progress record the user owns, completed or not.
    pub progress: Vec<Progress>,
}

// -- Diagnostics --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStatus {
    pub status: String,
    pub users_count: u64,
    pub courses_count: u64,
    pub lessons_count: u64,
    pub progress_count: u64,
    pub messages_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
