//! End-to-end HTTP scenarios over the in-memory repository.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use quill_core::domain::PageRequest;
use quill_infra::{JwtConfig, JwtTokenService};

use super::{API_PREFIX, configure_routes};
use crate::middleware::gatekeeper::Gatekeeper;
use crate::session::{SESSION_COOKIE, SessionCookie};
use crate::state::AppState;

fn state() -> AppState {
    let tokens = Arc::new(JwtTokenService::new(JwtConfig::default()));
    AppState::in_memory(tokens, SessionCookie::new(false, 24 * 3600))
}

macro_rules! app {
    () => {{
        let state = state();
        test::init_service(
            App::new()
                .wrap(Gatekeeper::new(state.tokens.clone()).excluding(API_PREFIX))
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await
    }};
}

fn session_of<B>(res: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("session cookie")
}

macro_rules! register {
    ($app:expr, $email:expr, $name:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": $email, "password": "secret1", "name": $name }))
            .to_request();
        let res = test::call_service(&$app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let cookie = session_of(&res);
        let body: Value = test::read_body_json(res).await;
        (cookie, body)
    }};
}

macro_rules! create_post {
    ($app:expr, $cookie:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .cookie($cookie.clone())
            .set_json(json!({ "title": "T", "content": "C", "published": true }))
            .to_request();
        let res = test::call_service(&$app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        body["post"]["id"].as_str().unwrap().to_string()
    }};
}

#[actix_rt::test]
async fn test_register_then_login() {
    let app = app!();

    let (cookie, registered) = register!(app, "a@x.com", "A");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert!(registered["user"].get("passwordHash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "a@x.com", "password": "secret1" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    session_of(&res);
    let body: Value = test::read_body_json(res).await;

    assert_eq!(body["user"]["id"], registered["user"]["id"]);
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let app = app!();
    register!(app, "a@x.com", "A");

    let wrong_password = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "a@x.com", "password": "wrong-one" }))
        .to_request();
    let res = test::call_service(&app, wrong_password).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let first: Value = test::read_body_json(res).await;

    let unknown_email = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "nobody@x.com", "password": "secret1" }))
        .to_request();
    let res = test::call_service(&app, unknown_email).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let second: Value = test::read_body_json(res).await;

    assert_eq!(first, second);
}

#[actix_rt::test]
async fn test_register_rejects_invalid_and_duplicate_input() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": "a@x.com", "password": "short", "name": "A" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["detail"], "Password must be at least 6 characters");

    register!(app, "a@x.com", "A");
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": "a@x.com", "password": "secret1", "name": "Again" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(header::ContentType::json())
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_me_requires_session_and_logout_clears_it() {
    let app = app!();

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let (cookie, registered) = register!(app, "a@x.com", "A");
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["id"], registered["user"]["id"]);

    let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = session_of(&res);
    assert_eq!(cleared.value(), "");
    assert_eq!(cleared.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
}

#[actix_rt::test]
async fn test_forged_cookie_is_anonymous() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .cookie(Cookie::new(SESSION_COOKIE, "not-a-token"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_post_lifecycle() {
    let app = app!();
    let (alice, _) = register!(app, "a@x.com", "A");
    let (bob, _) = register!(app, "b@x.com", "B");

    let id = create_post!(app, alice);
    let uri = format!("/api/posts/{id}");

    // Anonymous detail
    let req = test::TestRequest::get().uri(&uri).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["post"]["title"], "T");
    assert_eq!(body["post"]["author"]["name"], "A");
    assert_eq!(body["post"]["comments"], json!([]));

    // Someone else's post
    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(bob.clone())
        .set_json(json!({ "title": "Hijacked" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // Non-authors get 403 even for garbage payloads
    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(bob.clone())
        .insert_header(header::ContentType::json())
        .set_payload("{\"title\": \"\"")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // No session at all
    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "title": "Anon" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    let req = test::TestRequest::delete().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    // Author edits
    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(alice.clone())
        .set_json(json!({ "title": "T2" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post"]["title"], "T2");
    assert_eq!(body["post"]["content"], "C");

    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(bob)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(alice.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    // Gone for its owner too
    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(alice.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(alice)
        .set_json(json!({ "title": "Back" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_create_post_validation() {
    let app = app!();
    let (alice, _) = register!(app, "a@x.com", "A");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "title": "T", "content": "C", "published": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(alice.clone())
        .set_json(json!({ "title": "", "content": "C", "published": true }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["detail"], "Title is required");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(alice)
        .set_json(json!({
            "title": "T",
            "content": "C",
            "published": true,
            "categoryId": uuid::Uuid::new_v4().to_string(),
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_listing_paginates_published_posts() {
    let app = app!();
    let (alice, _) = register!(app, "a@x.com", "A");

    for _ in 0..3 {
        create_post!(app, alice);
    }
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(alice)
        .set_json(json!({ "title": "Draft", "content": "C", "published": false }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/posts?page=2&limit=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["pagination"],
        json!({ "page": 2, "limit": 2, "total": 3, "totalPages": 2 })
    );
    assert!(body["posts"][0].get("comments").is_none());
}

#[actix_rt::test]
async fn test_page_beyond_range_is_empty() {
    let app = app!();
    let (alice, _) = register!(app, "a@x.com", "A");
    create_post!(app, alice);

    let req = test::TestRequest::get()
        .uri("/api/posts?page=18446744073709551615&limit=10")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;

    assert_eq!(body["posts"], json!([]));
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert_eq!(body["pagination"]["page"], PageRequest::MAX_PAGE);
}

#[actix_rt::test]
async fn test_comment_on_post() {
    let app = app!();
    let (alice, _) = register!(app, "a@x.com", "A");
    let (bob, _) = register!(app, "b@x.com", "B");
    let id = create_post!(app, alice);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{id}/comments"))
        .cookie(bob)
        .set_json(json!({ "content": "Nice" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["comment"]["author"]["name"], "B");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post"]["comments"][0]["content"], "Nice");
}

#[actix_rt::test]
async fn test_unknown_or_malformed_post_id_is_not_found() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/posts/42").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_categories_and_health() {
    let app = app!();

    let req = test::TestRequest::get().uri("/api/categories").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["categories"], json!([]));

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_rt::test]
async fn test_gatekeeper_redirects_anonymous_page_requests() {
    let app = app!();

    let req = test::TestRequest::get().uri("/posts/new").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");

    let req = test::TestRequest::get()
        .uri("/posts/new")
        .cookie(Cookie::new(SESSION_COOKIE, "garbage"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[actix_rt::test]
async fn test_gatekeeper_admits_public_and_authenticated_pages() {
    let app = app!();

    for uri in ["/", "/login", "/register"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK, "{uri}");
    }

    let (alice, _) = register!(app, "a@x.com", "A");
    let req = test::TestRequest::get()
        .uri("/posts/new")
        .cookie(alice)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
