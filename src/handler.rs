use axum::{
    Json, Router,
    body::Body,
    extract::{Query, Request, State, rejection::JsonRejection},
    http::{Response, StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::auth::require_api_key;
use crate::error::{ProxyError, Result};
use crate::metrics::{LiveRequest, RequestStats};
use crate::models::openai::{ChatCompletionRequest, ChatCompletionResponse, ModelInfo, ModelList};
use crate::state::AppState;
use crate::streaming::{aggregate_content, reframe_stream};
use crate::transform::translate_request;

/// `POST /v1/chat/completions`. Translates the request, forwards it to
/// TalkAI, and answers either as one consolidated JSON body or as an SSE
/// stream, per the resolved streaming mode.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    payload: std::result::Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Response<Body>> {
    let Json(req) = payload.map_err(|e| {
        debug!(error = %e, "rejected request body");
        ProxyError::InvalidRequest("Invalid request body".to_string())
    })?;

    let stream_param = params.get("stream").map(String::as_str);
    let translated = translate_request(&req, &state.config, stream_param)?;

    info!(
        model = %translated.model,
        stream = translated.stream,
        turns = translated.backend.messages_history.len(),
        "chat completion"
    );

    let upstream = state.client.send_chat(&translated.backend).await?;

    if translated.stream {
        // The client disconnecting drops this stream, which closes the
        // backend connection with it.
        let sse = reframe_stream(upstream, translated.model);
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/event-stream")
            .header("Cache-Control", "no-cache")
            .header("Connection", "keep-alive")
            .body(Body::from_stream(sse))
            .unwrap())
    } else {
        let content = aggregate_content(upstream).await;
        let response = ChatCompletionResponse::completed(&translated.model, content);
        Ok(Json(response).into_response())
    }
}

/// `GET /v1/models`. Model ids come from the configured map, sorted by id so
/// the listing is stable across restarts.
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelList> {
    let data = state.model_map.keys().map(|id| ModelInfo::new(id)).collect();
    Json(ModelList::new(data))
}

pub async fn dashboard_stats(State(state): State<Arc<AppState>>) -> Json<RequestStats> {
    Json(state.stats.snapshot())
}

pub async fn dashboard_requests(State(state): State<Arc<AppState>>) -> Json<Vec<LiveRequest>> {
    Json(state.live_log.snapshot())
}

pub async fn dashboard_page() -> Html<&'static str> {
    Html(include_str!("../static/dashboard.html"))
}

pub async fn docs_page() -> Html<&'static str> {
    Html(include_str!("../static/docs.html"))
}

/// Record every `/v1` request, whatever its outcome. Sits outside the auth
/// layer so rejected requests are counted too. For streaming replies the
/// duration covers up to the response head, not the full body.
pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> axum::response::Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let start = Instant::now();
    let response = next.run(req).await;
    let duration = start.elapsed();
    let status = response.status().as_u16();

    state.stats.record(status, duration);
    state
        .live_log
        .push(LiveRequest::new(&method, &path, status, duration, &user_agent));

    response
}

/// Assemble the full application router. Dashboard routes are only mounted
/// when enabled; `/docs` is always served.
pub fn build_router(state: Arc<AppState>) -> Router {
    let v1 = Router::new()
        .route("/chat/completions", post(chat_completions))
        .route("/models", get(list_models))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests));

    let mut app = Router::new().nest("/v1", v1);

    if state.config.dashboard_enabled {
        app = app
            .route("/dashboard", get(dashboard_page))
            .route("/dashboard/stats", get(dashboard_stats))
            .route("/dashboard/requests", get(dashboard_requests));
    }

    app.route("/docs", get(docs_page)).with_state(state)
}
