#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use kodak_api::AppState;
use kodak_api::routes::build_router;
use kodak_db::Database;
use kodak_db::models::{NewCourse, NewLesson};

/// Drives the router in-process and keeps cookies between requests like a
/// browser would.
pub struct TestClient {
    router: axum::Router,
    cookies: BTreeMap<String, String>,
    db: Arc<Database>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    /// Raw `Set-Cookie` header values, attributes included.
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }
}

impl TestClient {
    pub fn new() -> Self {
        Self::with_secure_cookies(false)
    }

    pub fn with_secure_cookies(secure: bool) -> Self {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let state =
            AppState::new(db.clone(), "integration-test-secret").with_secure_cookies(secure);
        Self {
            router: build_router(state),
            cookies: BTreeMap::new(),
            db,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn set_raw_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let req = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// Register and log in, returning the new user's id.
    pub async fn sign_up_and_login(&mut self, name: &str, email: &str, password: &str) -> i64 {
        self.post_form("/register", &[("name", name), ("email", email), ("password", password)])
            .await
            .assert_redirect("/login");
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
            .assert_redirect("/");
        self.db.get_user_by_email(email).unwrap().unwrap().id
    }

    /// Follow up with a page view and return the notice it consumed.
    pub async fn notice_on(&mut self, uri: &str) -> serde_json::Value {
        self.get(uri).await.json()["notice"].clone()
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let header_value = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, header_value);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let resp = self.router.clone().oneshot(req).await.unwrap();

        let set_cookies: Vec<String> = resp
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        for raw in &set_cookies {
            let pair = raw.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }

        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            set_cookies,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }
}

pub fn seed_course(db: &Database, title: &str, lesson_count: i64) -> i64 {
    let lessons: Vec<NewLesson> = (0..lesson_count)
        .map(|i| NewLesson {
            title: format!("{title} lesson {}", i + 1),
            video_url: None,
            position: i,
        })
        .collect();
    db.create_course_with_lessons(
        &NewCourse {
            title: title.to_string(),
            description: format!("{title} description"),
            category: Some("Testing".to_string()),
            html_file: None,
        },
        &lessons,
    )
    .unwrap()
}

fn form_encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                (b as char).to_string()
            }
            b' ' => "+".to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}
