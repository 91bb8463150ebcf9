//! HTTP request handlers.

use super::AppState;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};

const ROOT_DOC: &str = r#"<html>
<head><title>Redash Exporter</title></head>
<body>
<h1>Redash Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>
"#;

pub async fn handle_root() -> Html<&'static str> {
    Html(ROOT_DOC)
}

pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.registry.render() {
        Ok(body) => (
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
