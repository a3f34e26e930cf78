pub mod auth;
pub mod contact;
pub mod courses;
pub mod credentials;
pub mod diagnostics;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

pub use error::ApiError;
pub use state::AppState;
