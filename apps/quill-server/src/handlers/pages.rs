//! Page shell routes. These sit behind the gatekeeper; the browser app does
//! the rendering and talks to `/api`.

use actix_web::{HttpResponse, http::header::ContentType, web};
use uuid::Uuid;

use crate::middleware::error::AppResult;
use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .route("/login", web::get().to(login))
        .route("/register", web::get().to(register))
        .route("/posts", web::get().to(posts))
        .route("/posts/new", web::get().to(new_post))
        .route("/posts/{id}", web::get().to(post))
        .route("/posts/{id}/edit", web::get().to(edit_post));
}

fn shell(title: &str, view: &str) -> HttpResponse {
    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} | Quill</title></head>\n\
         <body><div id=\"app\" data-view=\"{}\"></div></body>\n</html>\n",
        escape(title),
        escape(view),
    );
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

async fn home() -> HttpResponse {
    shell("Home", "home")
}

async fn login() -> HttpResponse {
    shell("Sign in", "login")
}

async fn register() -> HttpResponse {
    shell("Create account", "register")
}

async fn posts() -> HttpResponse {
    shell("Posts", "posts")
}

async fn new_post() -> HttpResponse {
    shell("New post", "post-editor")
}

async fn post(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let view = state.posts.detail(path.into_inner()).await?;
    Ok(shell(&view.post.title, "post"))
}

async fn edit_post(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let view = state.posts.detail(path.into_inner()).await?;
    Ok(shell(&format!("Edit {}", view.post.title), "post-editor"))
}
