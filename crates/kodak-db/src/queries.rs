use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{
    CourseRow, EntityCounts, LessonRow, MessageRow, NewCourse, NewLesson, NewMessage, ProgressRow,
    UserRow,
};
use crate::{Database, DbError, Result};

impl Database {
    // -- Users --

    /// Insert a user and return its generated id.
    /// Fails with `DuplicateKey` when the email is already registered.
    pub fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3)",
                (name, email, password_hash),
            )
            .map_err(|e| DbError::on_insert(e, "email"))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?1",
                    [email],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?1",
                    [id],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Removes the user together with their progress records.
    pub fn delete_user(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| delete_by_id(conn, "users", "user", id))
    }

    // -- Courses --

    pub fn create_course(&self, course: &NewCourse) -> Result<i64> {
        self.with_conn(|conn| insert_course(conn, course))
    }

    /// Insert a course and its lessons in one transaction. The course row is
    /// written first to obtain its id; if any lesson fails nothing is kept.
    pub fn create_course_with_lessons(
        &self,
        course: &NewCourse,
        lessons: &[NewLesson],
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let course_id = insert_course(&tx, course)?;
            for lesson in lessons {
                insert_lesson(&tx, course_id, lesson)?;
            }
            tx.commit()?;
            Ok(course_id)
        })
    }

    pub fn list_courses(&self) -> Result<Vec<CourseRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, category, html_file, created_at
                 FROM courses
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], course_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_course(&self, id: i64) -> Result<Option<CourseRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, description, category, html_file, created_at
                     FROM courses WHERE id = ?1",
                    [id],
                    course_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Removes the course, its lessons and any progress on those lessons.
    pub fn delete_course(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| delete_by_id(conn, "courses", "course", id))
    }

    // -- Lessons --

    pub fn create_lesson(&self, course_id: i64, lesson: &NewLesson) -> Result<i64> {
        self.with_conn(|conn| {
            ensure_exists(conn, "courses", "course", course_id)?;
            insert_lesson(conn, course_id, lesson)
        })
    }

    /// Lessons of a course in display order. An unknown course yields an
    /// empty list.
    pub fn find_lessons_by_course(&self, course_id: i64) -> Result<Vec<LessonRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, course_id, title, video_url, position
                 FROM lessons
                 WHERE course_id = ?1
                 ORDER BY position, id",
            )?;
            let rows = stmt
                .query_map([course_id], lesson_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_lesson(&self, id: i64) -> Result<Option<LessonRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, course_id, title, video_url, position FROM lessons WHERE id = ?1",
                    [id],
                    lesson_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Progress --

    /// Mark a lesson completed for a user.
    /// `NotFound` if either side is missing, `DuplicateKey` if the pair
    /// already has a record.
    pub fn record_completion(&self, user_id: i64, lesson_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            ensure_exists(conn, "users", "user", user_id)?;
            ensure_exists(conn, "lessons", "lesson", lesson_id)?;

            conn.execute(
                "INSERT INTO progress (user_id, lesson_id, completed, completed_at)
                 VALUES (?1, ?2, 1, datetime('now'))",
                (user_id, lesson_id),
            )
            .map_err(|e| DbError::on_insert(e, "progress"))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_progress(&self, user_id: i64, lesson_id: i64) -> Result<Option<ProgressRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, lesson_id, completed, completed_at
                     FROM progress WHERE user_id = ?1 AND lesson_id = ?2",
                    (user_id, lesson_id),
                    progress_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_progress_for_user(&self, user_id: i64) -> Result<Vec<ProgressRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, lesson_id, completed, completed_at
                 FROM progress
                 WHERE user_id = ?1
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], progress_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Contact messages --

    pub fn create_message(&self, message: &NewMessage) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (name, email, body) VALUES (?1, ?2, ?3)",
                (&message.name, &message.email, &message.body),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Newest first.
    pub fn list_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, body, created_at FROM messages ORDER BY id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        body: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Diagnostics --

    pub fn entity_counts(&self) -> Result<EntityCounts> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM courses),
                    (SELECT COUNT(*) FROM lessons),
                    (SELECT COUNT(*) FROM progress),
                    (SELECT COUNT(*) FROM messages)",
                [],
                |row| {
                    let count = |idx: usize| row.get::<_, i64>(idx).map(|n| n.max(0) as u64);
                    Ok(EntityCounts {
                        users: count(0)?,
                        courses: count(1)?,
                        lessons: count(2)?,
                        progress: count(3)?,
                        messages: count(4)?,
                    })
                },
            )?;
            Ok(counts)
        })
    }
}

fn insert_course(conn: &Connection, course: &NewCourse) -> Result<i64> {
    conn.execute(
        "INSERT INTO courses (title, description, category, html_file) VALUES (?1, ?2, ?3, ?4)",
        (
            &course.title,
            &course.description,
            &course.category,
            &course.html_file,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_lesson(conn: &Connection, course_id: i64, lesson: &NewLesson) -> Result<i64> {
    conn.execute(
        "INSERT INTO lessons (course_id, title, video_url, position) VALUES (?1, ?2, ?3, ?4)",
        (course_id, &lesson.title, &lesson.video_url, lesson.position),
    )?;
    Ok(conn.last_insert_rowid())
}

// `table` is always one of our own literals, never user input.
fn ensure_exists(conn: &Connection, table: &str, entity: &'static str, id: i64) -> Result<()> {
    let found = conn
        .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| Ok(()))
        .optional()?;
    found.ok_or(DbError::NotFound { entity, id })
}

fn delete_by_id(conn: &Connection, table: &str, entity: &'static str, id: i64) -> Result<()> {
    let deleted = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?;
    if deleted == 0 {
        return Err(DbError::NotFound { entity, id });
    }
    Ok(())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<CourseRow> {
    Ok(CourseRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        html_file: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn lesson_from_row(row: &Row<'_>) -> rusqlite::Result<LessonRow> {
    Ok(LessonRow {
        id: row.get(0)?,
        course_id: row.get(1)?,
        title: row.get(2)?,
        video_url: row.get(3)?,
        position: row.get(4)?,
    })
}

fn progress_from_row(row: &Row<'_>) -> rusqlite::Result<ProgressRow> {
    Ok(ProgressRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        lesson_id: row.get(2)?,
        completed: row.get(3)?,
        completed_at: row.get(4)?,
    })
}
