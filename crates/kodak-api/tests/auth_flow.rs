mod common;

use axum::http::StatusCode;

use common::TestClient;
use kodak_api::session::SESSION_COOKIE;

#[tokio::test]
async fn register_creates_exactly_one_user_with_hashed_password() {
    let mut client = TestClient::new();

    let resp = client
        .post_form(
            "/register",
            &[("name", "Ada Lovelace"), ("email", "ada@example.com"), ("password", "s3cret pass")],
        )
        .await;
    resp.assert_redirect("/login");

    let notice = client.notice_on("/login").await;
    assert_eq!(notice["level"], "success");
    assert_eq!(notice["message"], "Registration successful! You can now log in");

    assert_eq!(client.db().entity_counts().unwrap().users, 1);
    let stored = client.db().get_user_by_email("ada@example.com").unwrap().unwrap();
    assert_eq!(stored.name, "Ada Lovelace");
    assert_ne!(stored.password_hash, "s3cret pass");
    assert!(!stored.password_hash.contains("s3cret"));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict_and_leaves_count_unchanged() {
    let mut client = TestClient::new();
    let fields = [("name", "Ada"), ("email", "ada@example.com"), ("password", "pw-one")];
    client.post_form("/register", &fields).await.assert_redirect("/login");

    let again = [("name", "Imposter"), ("email", "ada@example.com"), ("password", "pw-two")];
    client.post_form("/register", &again).await.assert_redirect("/register");

    let notice = client.notice_on("/register").await;
    assert_eq!(notice["level"], "error");
    assert_eq!(notice["message"], "Email already exists");
    assert_eq!(client.db().entity_counts().unwrap().users, 1);
}

#[tokio::test]
async fn empty_password_is_a_validation_error() {
    let mut client = TestClient::new();

    let resp = client
        .post_form(
            "/register",
            &[("name", "Ada"), ("email", "ada@example.com"), ("password", "")],
        )
        .await;
    resp.assert_redirect("/register");

    let notice = client.notice_on("/register").await;
    assert_eq!(notice["message"], "All fields are required");
    assert_eq!(client.db().entity_counts().unwrap().users, 0);
}

#[tokio::test]
async fn missing_fields_are_a_validation_error() {
    let mut client = TestClient::new();

    client
        .post_form("/register", &[("email", "ada@example.com")])
        .await
        .assert_redirect("/register");
    client
        .post_form(
            "/register",
            &[("name", "   "), ("email", "ada@example.com"), ("password", "pw")],
        )
        .await
        .assert_redirect("/register");

    assert_eq!(client.db().entity_counts().unwrap().users, 0);
}

#[tokio::test]
async fn login_sets_session_and_shows_user() {
    let mut client = TestClient::new();
    let user_id = client.sign_up_and_login("Ada", "ada@example.com", "pw").await;
    assert!(client.has_cookie(SESSION_COOKIE));

    let landing = client.get("/").await.json();
    assert_eq!(landing["page"], "index");
    assert_eq!(landing["user"]["user_id"], user_id);
    assert_eq!(landing["user"]["display_name"], "Ada");
    assert_eq!(landing["notice"]["message"], "Login successful");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let mut client = TestClient::new();
    client
        .post_form(
            "/register",
            &[("name", "Ada"), ("email", "ada@example.com"), ("password", "right")],
        )
        .await;

    client
        .post_form("/login", &[("email", "ada@example.com"), ("password", "wrong")])
        .await
        .assert_redirect("/login");
    let wrong_password = client.notice_on("/login").await;

    client
        .post_form("/login", &[("email", "nobody@example.com"), ("password", "right")])
        .await
        .assert_redirect("/login");
    let unknown_email = client.notice_on("/login").await;

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["message"], "Invalid email or password");
    assert!(!client.has_cookie(SESSION_COOKIE));
}

#[tokio::test]
async fn email_match_is_case_sensitive_at_login() {
    let mut client = TestClient::new();
    client
        .post_form(
            "/register",
            &[("name", "Ada"), ("email", "ada@example.com"), ("password", "pw")],
        )
        .await;

    client
        .post_form("/login", &[("email", "ADA@example.com"), ("password", "pw")])
        .await
        .assert_redirect("/login");
    assert!(!client.has_cookie(SESSION_COOKIE));
}

#[tokio::test]
async fn logout_clears_session() {
    let mut client = TestClient::new();
    client.sign_up_and_login("Ada", "ada@example.com", "pw").await;

    client.get("/logout").await.assert_redirect("/");
    assert!(!client.has_cookie(SESSION_COOKIE));

    let landing = client.get("/").await.json();
    assert!(landing["user"].is_null());
    assert_eq!(landing["notice"]["message"], "You have been logged out");
}

#[tokio::test]
async fn logout_when_anonymous_is_a_no_op() {
    let mut client = TestClient::new();

    client.get("/logout").await.assert_redirect("/");
    client.get("/logout").await.assert_redirect("/");

    assert!(!client.has_cookie(SESSION_COOKIE));
    assert!(client.get("/").await.json()["user"].is_null());
}

#[tokio::test]
async fn anonymous_profile_request_is_redirected_without_data() {
    let mut client = TestClient::new();
    client
        .post_form(
            "/register",
            &[("name", "Ada"), ("email", "ada@example.com"), ("password", "pw")],
        )
        .await;
    // Drain the registration notice.
    client.get("/login").await;

    let resp = client.get("/profile").await;
    resp.assert_redirect("/login");
    assert!(!resp.body.contains("ada@example.com"));

    let notice = client.notice_on("/login").await;
    assert_eq!(notice["message"], "You must log in first");
}

#[tokio::test]
async fn profile_shows_current_user() {
    let mut client = TestClient::new();
    let user_id = client.sign_up_and_login("Ada", "ada@example.com", "pw").await;

    let resp = client.get("/profile").await;
    assert_eq!(resp.status, StatusCode::OK);

    let body = resp.json();
    assert_eq!(body["page"], "profile");
    assert_eq!(body["profile"]["id"], user_id);
    assert_eq!(body["profile"]["email"], "ada@example.com");
    assert_eq!(body["completed_lessons"], 0);
    assert!(body["profile"].get("password_hash").is_none());
}

#[tokio::test]
async fn forged_session_cookie_is_rejected() {
    let mut client = TestClient::new();
    client.set_raw_cookie(SESSION_COOKIE, "eyJ1c2VyX2lkIjoxLCJkaXNwbGF5X25hbWUiOiJBZGEifQ");

    client.get("/profile").await.assert_redirect("/login");
}

#[tokio::test]
async fn session_for_deleted_user_is_cleared() {
    let mut client = TestClient::new();
    let user_id = client.sign_up_and_login("Ada", "ada@example.com", "pw").await;
    client.db().delete_user(user_id).unwrap();

    client.get("/profile").await.assert_redirect("/login");
    assert!(!client.has_cookie(SESSION_COOKIE));
}

#[tokio::test]
async fn cookies_carry_secure_only_when_enabled() {
    for secure in [false, true] {
        let mut client = TestClient::with_secure_cookies(secure);
        client
            .post_form(
                "/register",
                &[("name", "Ada"), ("email", "ada@example.com"), ("password", "pw")],
            )
            .await;
        let login = client
            .post_form("/login", &[("email", "ada@example.com"), ("password", "pw")])
            .await;
        login.assert_redirect("/");

        let session = login
            .set_cookies
            .iter()
            .find(|c| c.starts_with(&format!("{SESSION_COOKIE}=")))
            .expect("login sets the session cookie");
        assert!(session.contains("HttpOnly"), "{session}");
        assert_eq!(session.contains("Secure"), secure, "{session}");
    }
}
