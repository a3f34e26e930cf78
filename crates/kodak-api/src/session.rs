//! Cookie-backed session state.
//!
//! Two signed cookies: `kodak_session` holds the signed-in identity and
//! `kodak_notice` holds a one-shot notice for the next page view. Both carry
//! base64-encoded JSON so the values stay within the cookie character set.
//! A cookie that fails signature or decoding checks reads as absent.
//!
//! Handlers take a [`Session`] rather than the raw jar so cookie attributes
//! come from one place.

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, IntoResponseParts, Redirect, Response, ResponseParts};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, warn};

use kodak_types::api::{Notice, SessionUser};

use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "kodak_session";
pub const NOTICE_COOKIE: &str = "kodak_notice";

/// Attributes applied to every cookie the app sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Mark cookies `Secure` so browsers only send them over HTTPS.
    pub secure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(SessionUser),
}

impl AuthState {
    pub fn user(self) -> Option<SessionUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }
}

/// Signed cookie jar plus the policy used for cookies it writes.
pub struct Session {
    jar: SignedCookieJar,
    policy: CookiePolicy,
}

impl Session {
    pub fn new(jar: SignedCookieJar, policy: CookiePolicy) -> Self {
        Self { jar, policy }
    }

    pub fn auth_state(&self) -> AuthState {
        self.jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| decode::<SessionUser>(cookie.value()))
            .map_or(AuthState::Anonymous, AuthState::Authenticated)
    }

    /// Anonymous -> Authenticated.
    pub fn sign_in(self, user: &SessionUser) -> Result<Self, ApiError> {
        let value = encode(user).ok_or_else(|| {
            error!("Failed to encode session for user {}", user.user_id);
            ApiError::Internal
        })?;
        let cookie = self.cookie(SESSION_COOKIE, value);
        Ok(self.with_jar(|jar| jar.add(cookie)))
    }

    /// Authenticated -> Anonymous. A no-op for anonymous clients.
    pub fn sign_out(self) -> Self {
        self.with_jar(|jar| jar.remove(removal(SESSION_COOKIE)))
    }

    pub fn flash(self, notice: Notice) -> Self {
        match encode(&notice) {
            Some(value) => {
                let cookie = self.cookie(NOTICE_COOKIE, value);
                self.with_jar(|jar| jar.add(cookie))
            }
            None => {
                warn!("Dropping unencodable notice: {}", notice.message);
                self
            }
        }
    }

    /// Pop the pending notice, if any.
    pub fn take_notice(self) -> (Self, Option<Notice>) {
        let Some(raw) = self.jar.get(NOTICE_COOKIE) else {
            return (self, None);
        };
        let notice = decode::<Notice>(raw.value());
        (self.with_jar(|jar| jar.remove(removal(NOTICE_COOKIE))), notice)
    }

    /// Flash `notice` and send the client to `to` with 303 See Other.
    pub fn redirect_with(self, notice: Notice, to: &str) -> Response {
        (self.flash(notice), Redirect::to(to)).into_response()
    }

    fn with_jar(self, f: impl FnOnce(SignedCookieJar) -> SignedCookieJar) -> Self {
        Self {
            jar: f(self.jar),
            policy: self.policy,
        }
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.policy.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Key: FromRef<S>,
    CookiePolicy: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, Key::from_ref(state));
        Ok(Self::new(jar, CookiePolicy::from_ref(state)))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

fn encode<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_vec(value).ok().map(|bytes| B64.encode(bytes))
}

fn decode<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let bytes = B64.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
}
