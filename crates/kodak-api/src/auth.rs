use axum::{
    Form,
    extract::State,
    response::Response,
};
use tracing::{error, info};

use kodak_types::api::{LoginForm, Notice, RegisterForm, SessionUser};

use crate::credentials;
use crate::error::ApiError;
use crate::forms::{required, required_secret};
use crate::session::Session;
use crate::state::{AppState, blocking};

/// Same text for unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        required(form.name),
        required(form.email),
        required_secret(form.password),
    ) else {
        let notice = Notice::error("All fields are required");
        return Ok(session.redirect_with(notice, "/register"));
    };

    let digest = blocking(move || credentials::hash_password(&password))
        .await?
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal
        })?;

    // The unique index on email decides races between concurrent sign-ups.
    match state.run_db(move |db| db.create_user(&name, &email, &digest)).await {
        Ok(user_id) => {
            info!(user_id, "User registered");
            Ok(session.redirect_with(
                Notice::success("Registration successful! You can now log in"),
                "/login",
            ))
        }
        Err(ApiError::Conflict(_)) => {
            Ok(session.redirect_with(Notice::error("Email already exists"), "/register"))
        }
        Err(e) => Err(e),
    }
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (required(form.email), required_secret(form.password))
    else {
        return Ok(session.redirect_with(Notice::error(INVALID_CREDENTIALS), "/login"));
    };

    let user = state.run_db(move |db| db.get_user_by_email(&email)).await?;

    let verified = blocking(move || match user {
        Some(user) => credentials::verify_password(&password, &user.password_hash).then_some(user),
        None => {
            credentials::verify_against_dummy(&password);
            None
        }
    })
    .await?;

    let Some(user) = verified else {
        return Ok(session.redirect_with(Notice::error(INVALID_CREDENTIALS), "/login"));
    };

    let session = session.sign_in(&SessionUser {
        user_id: user.id,
        display_name: user.name,
    })?;
    info!(user_id = user.id, "User logged in");

    Ok(session.redirect_with(Notice::success("Login successful"), "/"))
}

pub async fn logout(session: Session) -> Response {
    session
        .sign_out()
        .redirect_with(Notice::success("You have been logged out"), "/")
}
