use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{jobs, users};

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .merge(users::router())
        .merge(jobs::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Write a `kill -9 <pid>` script so a redeploy can stop the running server.
pub fn record_pid(config: &AppConfig) -> anyhow::Result<PathBuf> {
    let path = match &config.pid_file {
        Some(p) => p.clone(),
        None => {
            let exe = std::env::current_exe().context("locate executable")?;
            exe.parent()
                .map(|dir| dir.join("kill_jobwizard.sh"))
                .context("executable has no parent directory")?
        }
    };
    let pid = std::process::id();
    std::fs::write(&path, format!("kill -9 {pid}\n"))
        .with_context(|| format!("write pid file {}", path.display()))?;
    tracing::info!(pid, path = %path.display(), "pid recorded");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn register(app: &Router, email: &str, education: i64) {
        let (status, body) = call(
            app,
            json_request(
                Method::POST,
                "/register",
                json!({
                    "email": email,
                    "first": "Sam",
                    "last": "Smith",
                    "phone": "0899999999",
                    "education": education
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    async fn app() -> Router {
        build_app(AppState::fake().await)
    }

    #[tokio::test]
    async fn register_then_duplicate() {
        let app = app().await;
        register(&app, "sam@example.com", 2).await;

        let (status, body) = call(
            &app,
            json_request(
                Method::POST,
                "/register",
                json!({
                    "email": "sam@example.com",
                    "first": "Sam",
                    "last": "Smith",
                    "phone": "0899999999",
                    "education": 2
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Email is not unique; user not created" }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_error() {
        let app = app().await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/job/create")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn job_lifecycle_over_http() {
        let app = app().await;
        register(&app, "boss@example.com", 4).await;
        register(&app, "seeker@example.com", 1).await;

        let (status, body) = call(
            &app,
            json_request(
                Method::POST,
                "/job/create",
                json!({
                    "creator": "boss@example.com",
                    "title": "Data engineer",
                    "description": "Pipelines",
                    "min_education": 3,
                    "min_experience": 2,
                    "salary": 70000
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "job_id": "00001" }));

        let (status, body) = call(
            &app,
            get_request("/search/detail?user_email=seeker@example.com&job_id=00001"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Data engineer");
        assert_eq!(body["salary"], 70000);
        assert_eq!(body["creator"], "boss@example.com");

        let (status, body) = call(
            &app,
            json_request(
                Method::POST,
                "/job/submit",
                json!({ "email": "seeker@example.com", "job_id": "1" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["applied_job_id"], "00001");
        assert_eq!(
            body["warning"],
            "Applied but user education is less than job requires"
        );

        let (status, body) = call(
            &app,
            get_request("/search/candidates?creator=boss@example.com&job_id=1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["email"], "seeker@example.com");
        assert_eq!(body[0]["name"], "Sam Smith");

        let (status, body) = call(
            &app,
            json_request(
                Method::PUT,
                "/job/modify",
                json!({ "creator": "seeker@example.com", "job_id": "1", "salary": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Specified user did not create this job");

        let (status, body) = call(
            &app,
            json_request(
                Method::PUT,
                "/job/modify",
                json!({ "creator": "boss@example.com", "job_id": "1", "is_open": false }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "modified_job_id": "00001" }));

        let (status, body) = call(
            &app,
            get_request("/search/applied?user_email=seeker@example.com"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["job_id"], "00001");
        assert_eq!(body[0]["is_open"], false);

        let (_, body) = call(&app, get_request("/search/offered?creator=seeker@example.com")).await;
        assert_eq!(body, json!({ "warning": "No matching jobs found" }));
    }

    #[tokio::test]
    async fn search_reports_bad_numbers_and_empty_results() {
        let app = app().await;
        register(&app, "seeker@example.com", 1).await;

        let (status, body) = call(
            &app,
            get_request("/search?user_email=seeker@example.com&salary=lots"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Invalid salary format - must be integer less than one million"
        );

        let (status, body) = call(
            &app,
            get_request("/search?user_email=seeker@example.com&experience=5"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "warning": "No matching jobs found" }));

        let (status, body) = call(&app, get_request("/search?user_email=nobody@example.com")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown user email");
    }

    #[tokio::test]
    async fn health_is_plain_ok() {
        let app = app().await;
        let res = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn pid_file_contains_kill_command() {
        let path = std::env::temp_dir().join(format!("jobwizard-pid-{}.sh", std::process::id()));
        let config = AppConfig {
            pid_file: Some(path.clone()),
            ..AppConfig::from_lookup(|_| None).unwrap()
        };
        let written = record_pid(&config).unwrap();
        assert_eq!(written, path);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("kill -9 {}\n", std::process::id()));
        std::fs::remove_file(path).ok();
    }
}
