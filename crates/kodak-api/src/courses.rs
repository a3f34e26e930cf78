use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use kodak_types::api::{CourseDetail, CourseList, LessonDetail, Notice, SessionUser};
use kodak_types::models::{Course, Lesson};

use crate::error::ApiError;
use crate::middleware::LOGIN_REQUIRED;
use crate::pages::render;
use crate::session::Session;
use crate::state::AppState;

/// Ids arrive as raw path segments so a malformed one answers with the same
/// JSON 404 as an unknown one.
fn parse_id(entity: &'static str, raw: String) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::MalformedId { entity, raw })
}

pub async fn list_courses(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.run_db(|db| db.list_courses()).await?;
    let courses = rows.into_iter().map(Course::from).collect();
    Ok(render(session, "courses", CourseList { courses }))
}

pub async fn course_detail(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let course_id = parse_id("course", raw_id)?;
    let (course, lessons) = state
        .run_db(move |db| {
            let Some(course) = db.get_course(course_id)? else {
                return Ok((None, Vec::new()));
            };
            Ok((Some(course), db.find_lessons_by_course(course_id)?))
        })
        .await?;

    let course = course.ok_or(ApiError::NotFound {
        entity: "course",
        id: course_id,
    })?;

    Ok(render(
        session,
        "course",
        CourseDetail {
            course: course.into(),
            lessons: lessons.into_iter().map(Lesson::from).collect(),
        },
    ))
}

pub async fn lesson_detail(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let lesson_id = parse_id("lesson", raw_id)?;
    let viewer = session.auth_state().user().map(|u| u.user_id);

    let (lesson, progress) = state
        .run_db(move |db| {
            let lesson = db.get_lesson(lesson_id)?;
            let progress = match (viewer, &lesson) {
                (Some(user_id), Some(_)) => db.get_progress(user_id, lesson_id)?,
                _ => None,
            };
            Ok((lesson, progress))
        })
        .await?;

    let lesson = lesson.ok_or(ApiError::NotFound {
        entity: "lesson",
        id: lesson_id,
    })?;
    let completed = viewer.map(|_| progress.is_some_and(|p| p.completed));

    Ok(render(
        session,
        "lesson",
        LessonDetail {
            lesson: lesson.into(),
            completed,
        },
    ))
}

/// Protected by `require_auth`.
pub async fn complete_lesson(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(current): Extension<SessionUser>,
    session: Session,
) -> Result<Response, ApiError> {
    let lesson_id = parse_id("lesson", raw_id)?;
    let user_id = current.user_id;
    let back = format!("/lessons/{lesson_id}");

    match state
        .run_db(move |db| db.record_completion(user_id, lesson_id))
        .await
    {
        Ok(_) => {
            info!(user_id, lesson_id, "Lesson completed");
            Ok(session.redirect_with(Notice::success("Lesson marked as completed"), &back))
        }
        Err(ApiError::Conflict(_)) => {
            Ok(session.redirect_with(Notice::error("Lesson already completed"), &back))
        }
        Err(ApiError::NotFound { entity: "user", .. }) => {
            warn!(user_id, "Session refers to a missing user, signing out");
            Ok(session.sign_out().redirect_with(Notice::error(LOGIN_REQUIRED), "/login"))
        }
        Err(e) => Err(e),
    }
}
