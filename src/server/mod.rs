//! HTTP server: the contact API plus the generated site

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use notify_debouncer_mini::new_debouncer;
use serde_json::json;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::contact::{ContactSubmission, DocumentBackend, SubmissionStore};
use crate::error::SubmissionError;
use crate::Blog;

/// Route accepting contact form submissions
pub const CONTACT_ROUTE: &str = "/api/contact";

/// Build the application router
///
/// `POST /api/contact` stores submissions; every other path is served from
/// `public_dir`, with its `404.html` as the not-found page.
pub fn router<B>(store: Arc<SubmissionStore<B>>, public_dir: &Path) -> Router
where
    B: DocumentBackend + 'static,
{
    let not_found = ServeFile::new(public_dir.join("404.html"));
    let static_files = ServeDir::new(public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found);

    Router::new()
        .route(CONTACT_ROUTE, post(contact_handler::<B>))
        .with_state(store)
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
}

/// Handle one contact form submission
async fn contact_handler<B>(
    State(store): State<Arc<SubmissionStore<B>>>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Response
where
    B: DocumentBackend + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::debug!("Rejected contact payload: {}", rejection);
            return invalid_inputs();
        }
    };

    let result = tokio::task::spawn_blocking(move || store.submit(&submission))
        .await
        .unwrap_or_else(|e| Err(SubmissionError::Write(format!("submission task failed: {}", e))));

    match result {
        Ok(stored) => (
            StatusCode::CREATED,
            Json(json!({
                "response": "Successfully stored message",
                "message": stored,
            })),
        )
            .into_response(),
        Err(SubmissionError::Validation(e)) => {
            tracing::debug!("Contact submission rejected: {}", e);
            invalid_inputs()
        }
        Err(SubmissionError::Connection(_)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Could not connect to database")
        }
        Err(SubmissionError::Write(_)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Storing message failed, please try again",
        ),
    }
}

fn invalid_inputs() -> Response {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, "Invalid inputs!")
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let store = Arc::new(blog.submissions()?);
    let app = router(store, &blog.public_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    tokio::spawn(revalidate_periodically(
        blog.clone(),
        blog.config.revalidate_interval(),
    ));

    if watch {
        let blog = blog.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_regenerate(&blog) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Regenerate the site on a fixed interval
async fn revalidate_periodically(blog: Blog, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // The site was generated before the server started
    ticker.tick().await;

    loop {
        ticker.tick().await;
        tracing::info!("Revalidating site...");

        let blog = blog.clone();
        match tokio::task::spawn_blocking(move || blog.generate()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Generation failed: {}", e),
            Err(e) => tracing::error!("Generation task failed: {}", e),
        }
    }
}

/// Watch the sources and regenerate on change; blocks until the watcher stops
fn watch_and_regenerate(blog: &Blog) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let watched: [(PathBuf, notify::RecursiveMode); 3] = [
        (blog.posts_dir.clone(), notify::RecursiveMode::Recursive),
        (blog.images_dir.clone(), notify::RecursiveMode::Recursive),
        (
            blog.base_dir.join(crate::CONFIG_FILE),
            notify::RecursiveMode::NonRecursive,
        ),
    ];
    for (path, mode) in &watched {
        if path.exists() {
            debouncer.watcher().watch(path, *mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".DS_Store") && !path_str.ends_with('~')
                    })
                    .count();
                if relevant == 0 {
                    continue;
                }

                for event in &events {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match blog.generate() {
                    Ok(()) => tracing::info!("Regenerated successfully"),
                    Err(e) => tracing::error!("Generation failed: {}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::SqliteBackend;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir, database: PathBuf) -> Router {
        let public = dir.path().join("public");
        fs::create_dir_all(&public).unwrap();
        fs::write(public.join("index.html"), "<h1>home</h1>").unwrap();
        fs::write(public.join("404.html"), "<h1>missing</h1>").unwrap();

        let store = Arc::new(SubmissionStore::new(SqliteBackend::new(database)));
        router(store, &public)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(CONTACT_ROUTE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_valid_submission_is_created() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, dir.path().join("messages.db"));

        let response = app
            .oneshot(post_json(
                r#"{"email":"a@b.com","name":"Jane","message":"Hello"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["response"], "Successfully stored message");
        assert_eq!(body["message"]["email"], "a@b.com");
        assert!(body["message"]["id"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_submission_is_rejected() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, dir.path().join("messages.db"));

        let response = app
            .oneshot(post_json(r#"{"email":"abc","name":"Jane","message":"Hi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["message"], "Invalid inputs!");
        assert!(!dir.path().join("messages.db").exists());
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_input() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, dir.path().join("messages.db"));

        let response = app.oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["message"], "Invalid inputs!");
    }

    #[tokio::test]
    async fn test_unreachable_store_is_server_error() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, dir.path().join("missing").join("messages.db"));

        let response = app
            .oneshot(post_json(
                r#"{"email":"a@b.com","name":"Jane","message":"Hello"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["message"],
            "Could not connect to database"
        );
    }

    #[tokio::test]
    async fn test_other_methods_not_allowed() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, dir.path().join("messages.db"));

        let request = Request::builder()
            .uri(CONTACT_ROUTE)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_serves_generated_pages() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, dir.path().join("messages.db"));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>home</h1>");

        let request = Request::builder()
            .uri("/posts/nope/")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>missing</h1>");
    }
}
