//! services/api/src/web/pages.rs
//!
//! Thin navigation entry points. Rendering lives in the client; these only
//! give the access gate something to guard.

use axum::{extract::Path, response::Html};

fn shell(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        title, body
    ))
}

pub async fn index_page() -> Html<String> {
    shell("Reading list", "<main id=\"articles\"></main>")
}

pub async fn login_page() -> Html<String> {
    shell("Login", "<main id=\"login\"></main>")
}

pub async fn article_page(Path(id): Path<String>) -> Html<String> {
    let id: String = id.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    shell("Article", &format!("<main id=\"article\" data-id=\"{}\"></main>", id))
}
