// local axum stand-in for the AI gateway, records what it receives

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

pub const MOCK_ANALYSIS: &str = "## Market Position\n**Above average**";
pub const MOCK_STREAM: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Minimum 20 working days\"}}]}\n\ndata: [DONE]\n\n";

#[derive(Default)]
struct Recorded {
    hits: AtomicUsize,
    last_body: Mutex<Option<Value>>,
    last_auth: Mutex<Option<String>>,
}

struct MockState {
    status: u16,
    recorded: Arc<Recorded>,
}

pub struct MockGateway {
    pub url: String,
    recorded: Arc<Recorded>,
}

impl MockGateway {
    /// Binds an ephemeral port. Any status other than 200 is returned as-is.
    pub async fn spawn(status: u16) -> Self {
        let recorded = Arc::new(Recorded::default());
        let state = Arc::new(MockState { status, recorded: Arc::clone(&recorded) });
        let app = Router::new().route("/v1/chat/completions", post(completions)).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url: format!("http://{addr}"), recorded }
    }

    pub fn hits(&self) -> usize {
        self.recorded.hits.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.recorded.last_body.lock().unwrap().clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.recorded.last_auth.lock().unwrap().clone()
    }
}

async fn completions(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.recorded.hits.fetch_add(1, Ordering::SeqCst);
    *state.recorded.last_auth.lock().unwrap() =
        headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_string);
    let stream = body["stream"].as_bool().unwrap_or(false);
    *state.recorded.last_body.lock().unwrap() = Some(body);

    if state.status != 200 {
        let status = StatusCode::from_u16(state.status).unwrap();
        return (status, "upstream refused").into_response();
    }

    if stream {
        ([(header::CONTENT_TYPE, "text/event-stream")], MOCK_STREAM).into_response()
    } else {
        Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": MOCK_ANALYSIS } }]
        }))
        .into_response()
    }
}
