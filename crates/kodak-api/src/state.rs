use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use tracing::{error, warn};

use kodak_db::Database;

use crate::credentials;
use crate::error::ApiError;
use crate::session::CookiePolicy;

/// Shared application context handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    session_key: Key,
    cookie_policy: CookiePolicy,
}

impl AppState {
    /// The cookie signing key is derived from `secret`, so any secret length
    /// works. The same secret always yields the same key.
    pub fn new(db: Arc<Database>, secret: &str) -> Self {
        if !credentials::warm_up() {
            warn!("Could not build the dummy password digest");
        }
        let digest = Sha512::digest(secret.as_bytes());
        Self {
            db,
            session_key: Key::from(digest.as_slice()),
            cookie_policy: CookiePolicy::default(),
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookie_policy.secure = secure;
        self
    }

    /// Run a database call off the async runtime.
    pub async fn run_db<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> kodak_db::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let result = blocking(move || f(db.as_ref())).await?;
        Ok(result?)
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.session_key.clone()
    }
}

impl FromRef<AppState> for CookiePolicy {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_policy
    }
}

/// Run CPU-bound or blocking work on the blocking pool.
pub async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })
}
