//! Database row types. These map directly to SQLite rows and stay distinct
//! from the kodak-types models so the DB layer owns its own shapes.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use kodak_types::models::{ContactMessage, Course, Lesson, Progress, User};

pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

pub struct CourseRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub html_file: Option<String>,
    pub created_at: String,
}

pub struct LessonRow {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub video_url: Option<String>,
    pub position: i64,
}

pub struct ProgressRow {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: i64,
    pub completed: bool,
    pub completed_at: Option<String>,
}

pub struct MessageRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created_at: String,
}

// -- Inserts --

#[derive(Debug, Clone, Default)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub html_file: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewLesson {
    pub title: String,
    pub video_url: Option<String>,
    pub position: i64,
}

#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Row counts per table, reported by the diagnostics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub users: u64,
    pub courses: u64,
    pub lessons: u64,
    pub progress: u64,
    pub messages: u64,
}

/// SQLite's `datetime('now')` yields "YYYY-MM-DD HH:MM:SS" without a zone;
/// treat it as UTC. RFC 3339 strings are accepted too.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .ok()
}

fn timestamp_or_default(raw: &str, table: &str, id: i64) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt timestamp '{}' on {} row {}", raw, table, id);
        DateTime::default()
    })
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            created_at: timestamp_or_default(&row.created_at, "users", row.id),
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            created_at: timestamp_or_default(&row.created_at, "courses", row.id),
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            html_file: row.html_file,
        }
    }
}

impl From<LessonRow> for Lesson {
    fn from(row: LessonRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            video_url: row.video_url,
            position: row.position,
        }
    }
}

impl From<ProgressRow> for Progress {
    fn from(row: ProgressRow) -> Self {
        Self {
            completed_at: row
                .completed_at
                .as_deref()
                .map(|raw| timestamp_or_default(raw, "progress", row.id)),
            id: row.id,
            user_id: row.user_id,
            lesson_id: row.lesson_id,
            completed: row.completed,
        }
    }
}

impl From<MessageRow> for ContactMessage {
    fn from(row: MessageRow) -> Self {
        Self {
            created_at: timestamp_or_default(&row.created_at, "messages", row.id),
            id: row.id,
            name: row.name,
            email: row.email,
            body: row.body,
        }
    }
}
