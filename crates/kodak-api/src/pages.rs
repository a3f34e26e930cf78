use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;

use kodak_types::api::{Blank, Notice, PageView, Profile, SessionUser};
use kodak_types::models::Progress;

use crate::error::ApiError;
use crate::middleware::LOGIN_REQUIRED;
use crate::session::Session;
use crate::state::AppState;

/// Wrap `content` in the page envelope, consuming any pending notice.
pub(crate) fn render<T: Serialize>(
    session: Session,
    page: &'static str,
    content: T,
) -> (Session, Json<PageView<T>>) {
    let user = session.auth_state().user();
    let (session, notice) = session.take_notice();
    (
        session,
        Json(PageView {
            page,
            user,
            notice,
            content,
        }),
    )
}

pub async fn index(session: Session) -> impl IntoResponse {
    render(session, "index", Blank::default())
}

pub async fn register_page(session: Session) -> impl IntoResponse {
    render(session, "register", Blank::default())
}

pub async fn login_page(session: Session) -> impl IntoResponse {
    render(session, "login", Blank::default())
}

pub async fn contact_page(session: Session) -> impl IntoResponse {
    render(session, "contact", Blank::default())
}

/// Protected by `require_auth`.
pub async fn profile(
    State(state): State<AppState>,
    Extension(current): Extension<SessionUser>,
    session: Session,
) -> Result<Response, ApiError> {
    let user_id = current.user_id;
    let found = state
        .run_db(move |db| {
            let Some(user) = db.get_user_by_id(user_id)? else {
                return Ok(None);
            };
            let progress = db.list_progress_for_user(user_id)?;
            Ok(Some((user, progress)))
        })
        .await?;

    let Some((user, progress)) = found else {
        // The account behind this session is gone.
        warn!(user_id, "Session refers to a missing user, signing out");
        let session = session.sign_out();
        return Ok(session.redirect_with(Notice::error(LOGIN_REQUIRED), "/login"));
    };

    let progress: Vec<Progress> = progress.into_iter().map(Progress::from).collect();
    let completed_lessons = progress.iter().filter(|p| p.completed).count();
    Ok(render(
        session,
        "profile",
        Profile {
            profile: user.into(),
            completed_lessons,
            progress,
        },
    )
    .into_response())
}
