//! HTTP server: `/`, `/post/{slug}`, `/user/{slug}` and comment submission

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    handler::Handler,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::comments::{self, CommentForm, FormView, SubmissionState};
use crate::pages::{Pages, RenderError};
use crate::Blog;

/// Server state
struct ServerState {
    pages: Pages,
}

impl ServerState {
    fn respond(&self, result: Result<String, RenderError>) -> Response {
        match result {
            Ok(html) => Html(html).into_response(),
            Err(err) => self.error_page(err),
        }
    }

    fn error_page(&self, err: RenderError) -> Response {
        if err.is_not_found() {
            tracing::debug!("{}", err);
            return (
                StatusCode::NOT_FOUND,
                page_or_plain(self.pages.not_found(), "Not found"),
            )
                .into_response();
        }

        tracing::error!("Failed to render page: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            page_or_plain(self.pages.failure(), "Internal Server Error"),
        )
            .into_response()
    }
}

fn page_or_plain(page: Result<String, RenderError>, fallback: &str) -> Html<String> {
    Html(page.unwrap_or_else(|err| {
        tracing::error!("Failed to render error page: {}", err);
        fallback.to_string()
    }))
}

/// Build the application router
pub fn router(pages: Pages, static_dir: &std::path::Path) -> Router {
    let state = Arc::new(ServerState { pages });

    // Anything that is not a page route is looked up in the static
    // directory (favicon and friends) before falling through to 404
    let static_files =
        ServeDir::new(static_dir).not_found_service(not_found_handler.with_state(state.clone()));

    Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(post_handler).post(post_comment_handler))
        .route("/user/:slug", get(author_handler))
        .route("/api/createComment", post(create_comment_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let app = router(blog.pages()?, &blog.static_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    state.respond(state.pages.listing().await)
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let form = FormView::idle(state.pages.ack_seconds());
    state.respond(state.pages.post(&slug, &form).await)
}

/// HTML form submission
///
/// Missing fields re-render the form with inline messages and nothing is
/// sent. Otherwise the comment goes out; success shows the thank-you
/// banner until the refresh brings the form back, failure shows the
/// empty form again.
async fn post_comment_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    Form(mut form): Form<CommentForm>,
) -> Response {
    let ack_seconds = state.pages.ack_seconds();

    if let Err(missing) = form.validate() {
        let view = FormView::invalid(&form, &missing, ack_seconds);
        return match state.pages.post(&slug, &view).await {
            Ok(html) => (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response(),
            Err(err) => state.error_page(err),
        };
    }

    let post = match state.pages.fetch_post(&slug).await {
        Ok(post) => post,
        Err(err) => return state.error_page(err),
    };
    if form.post_id.is_empty() {
        form.post_id = post.id.clone();
    }

    let submission = SubmissionState::default().begin();
    let outcome = comments::submit(state.pages.client(), form).await;
    if let Err(err) = &outcome {
        tracing::warn!("Comment submission for {} failed: {}", slug, err);
    }
    let submission = submission.finish(outcome.is_ok(), Instant::now());

    let view = FormView::from_state(submission, Instant::now(), ack_seconds);
    state.respond(state.pages.render_post(&post, &view))
}

async fn author_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    state.respond(state.pages.author(&slug).await)
}

/// JSON comment endpoint
///
/// The body is read raw so clients that omit the JSON content type still
/// get through, and any undecodable body gets the same JSON error shape.
async fn create_comment_handler(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let form: CommentForm = match serde_json::from_slice(&body) {
        Ok(form) => form,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Couldn't submit comment", "err": err.to_string()})),
            )
                .into_response();
        }
    };

    match comments::submit(state.pages.client(), form).await {
        Ok(_) => (StatusCode::OK, Json(json!({"message": "Comment submitted"}))).into_response(),
        Err(err) => {
            tracing::warn!("Comment submission failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "Couldn't submit comment", "err": err.to_string()})),
            )
                .into_response()
        }
    }
}

async fn not_found_handler(State(state): State<Arc<ServerState>>) -> Response {
    (
        StatusCode::NOT_FOUND,
        page_or_plain(state.pages.not_found(), "Not found"),
    )
        .into_response()
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
