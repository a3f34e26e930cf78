use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use kodak_types::api::Notice;

use crate::session::{AuthState, Session};

pub const LOGIN_REQUIRED: &str = "You must log in first";

/// Gate for routes that need a signed-in user.
///
/// Anonymous requests are redirected to `/login` with a notice and the
/// wrapped handler never runs. Otherwise the `SessionUser` is placed in the
/// request extensions.
pub async fn require_auth(session: Session, mut req: Request, next: Next) -> Response {
    match session.auth_state() {
        AuthState::Authenticated(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        AuthState::Anonymous => {
            debug!("Anonymous request to {} redirected to login", req.uri().path());
            session.redirect_with(Notice::error(LOGIN_REQUIRED), "/login")
        }
    }
}
