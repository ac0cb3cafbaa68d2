use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use meetbot_core::protocol::{ActionCall, ActionErrorResponse, ActionInfo};
use meetbot_core::{ActionExecutor, MeetbotError};

pub struct AppState {
    pub executor: ActionExecutor,
}

pub fn router(executor: ActionExecutor) -> Router {
    let state = Arc::new(AppState { executor });
    Router::new()
        .route("/health", get(health))
        .route("/actions", get(list_actions))
        .route("/webhook", post(webhook))
        .with_state(state)
}

pub async fn start_server(bind: &str, executor: ActionExecutor) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind server")?;

    tracing::info!(
        %addr,
        actions = ?executor.registry().names(),
        "meetbot action server listening"
    );

    axum::serve(listener, router(executor))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown requested");
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_actions(State(state): State<Arc<AppState>>) -> Json<Vec<ActionInfo>> {
    let actions = state
        .executor
        .registry()
        .names()
        .into_iter()
        .map(|name| ActionInfo { name })
        .collect();
    Json(actions)
}

async fn webhook(State(state): State<Arc<AppState>>, Json(call): Json<ActionCall>) -> Response {
    match state.executor.run(&call).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            let status = match err {
                MeetbotError::ActionNotFound { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!(action = %call.next_action, error = %err, "action call rejected");
            let body = ActionErrorResponse {
                error: err.to_string(),
                action_name: Some(call.next_action.clone()),
            };
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetbot_core::resolver::testing::FakeResolver;
    use meetbot_core::{ActionRegistry, Config};

    /// Serve the router on an ephemeral loopback port and return its base url.
    async fn spawn_app() -> String {
        let resolver = FakeResolver::new()
            .with_values("tomorrow", &["2024-06-02T00:00:00"])
            .with_values("3pm", &["2024-06-01T15:00:00"]);
        let registry = ActionRegistry::with_defaults(&Config::default(), Arc::new(resolver));
        let app = router(ActionExecutor::new(registry));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{}", addr)
    }

    async fn post_json(body: serde_json::Value) -> (reqwest::StatusCode, serde_json::Value) {
        let base = spawn_app().await;
        let response = reqwest::Client::new()
            .post(format!("{}/webhook", base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_schedule_over_http() {
        let (status, body) = post_json(serde_json::json!({
            "next_action": "action_a_meeting",
            "sender_id": "user-1",
            "tracker": {"sender_id": "user-1", "slots": {"date": "tomorrow", "time": "3pm"}},
            "domain": {}
        }))
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "events": [
                    {"event": "slot", "name": "date", "value": null},
                    {"event": "slot", "name": "time", "value": null}
                ],
                "responses": [{"text": "Date and time of meeting is 02/06/2024 and T15:00:00"}]
            })
        );
    }

    #[tokio::test]
    async fn test_missing_slots_over_http() {
        let (status, body) = post_json(serde_json::json!({
            "next_action": "action_a_meeting",
            "tracker": {"slots": {"date": null, "time": null}}
        }))
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["events"], serde_json::json!([]));
        assert_eq!(
            body["responses"][0]["text"],
            "please provide date and time of meeting"
        );
    }

    #[tokio::test]
    async fn test_join_over_http() {
        let (status, body) = post_json(serde_json::json!({
            "next_action": "action_join_meeting",
            "tracker": {"slots": {"meeting_id": "123456789"}}
        }))
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["responses"][0]["text"], "add me into meeting 123-456-789");
        assert_eq!(body["events"][0]["name"], "meeting_id");
    }

    #[tokio::test]
    async fn test_unknown_action_is_404() {
        let (status, body) =
            post_json(serde_json::json!({"next_action": "action_unknown", "tracker": {}})).await;
        assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
        assert_eq!(body["action_name"], "action_unknown");
    }

    #[tokio::test]
    async fn test_health_and_actions() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let health: serde_json::Value = client
            .get(format!("{}/health", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");

        let actions: serde_json::Value = client
            .get(format!("{}/actions", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(actions.as_array().map(|a| a.len()), Some(2));
    }
}
