use axum::{Form, extract::State, response::Response};
use tracing::info;

use kodak_db::models::NewMessage;
use kodak_types::api::{ContactForm, Notice};

use crate::error::ApiError;
use crate::forms::required;
use crate::session::Session;
use crate::state::AppState;

pub async fn submit_contact(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Result<Response, ApiError> {
    let (Some(name), Some(email), Some(body)) = (
        required(form.name),
        required(form.email),
        required(form.message),
    ) else {
        return Ok(session.redirect_with(Notice::error("All fields are required"), "/contact"));
    };

    let message = NewMessage { name, email, body };
    let id = state.run_db(move |db| db.create_message(&message)).await?;
    info!(message_id = id, "Contact message stored");

    Ok(session.redirect_with(Notice::success("Thanks, your message has been sent"), "/contact"))
}
