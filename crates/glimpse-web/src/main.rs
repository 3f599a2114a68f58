use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use glimpse_store::ProfileStore;
use serde_json::json;
use tracing_subscriber::EnvFilter;

mod ad;

use ad::AdTemplate;

/// Display page: polls /latest and redirects to /ad once a visitor shows up.
const INDEX_TEMPLATE: &str = r#"<!doctype html>
<html><head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>Display</title></head>
<body style="margin:0;display:grid;place-items:center;height:100vh;font-family:sans-serif;background:#0b1220;color:#e6edf3">
<div id="s">Waiting for a visitor…</div>
<script>
const delay = __DELAY_MS__;
async function tick(){
  try{
    const r = await fetch('/latest');
    const j = await r.json();
    if(j && j.member_id){ location.href = '/ad?member_id=' + encodeURIComponent(j.member_id); return; }
  }catch(e){}
  setTimeout(tick, delay);
}
setTimeout(tick, delay);
</script>
</body></html>
"#;

#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<ProfileStore>>,
    template: Arc<AdTemplate>,
    index_page: Arc<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bind = std::env::var("GLIMPSE_HTTP_BIND").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let addr: SocketAddr = bind.parse().context("parsing GLIMPSE_HTTP_BIND")?;
    let db_path = std::env::var("GLIMPSE_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data/glimpse.db"));
    let template_path = std::env::var("GLIMPSE_AD_TEMPLATE_PATH").ok().map(PathBuf::from);
    let push_delay_ms: u64 = std::env::var("GLIMPSE_PUSH_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5_000);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let store = ProfileStore::open(&db_path)
        .with_context(|| format!("opening store at {}", db_path.display()))?;

    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        template: Arc::new(AdTemplate::load(template_path.as_deref())),
        index_page: Arc::new(INDEX_TEMPLATE.replace("__DELAY_MS__", &push_delay_ms.to_string())),
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/latest", get(latest))
        .route("/ad", get(ad_page))
        .with_state(state);

    tracing::info!(%addr, db = %db_path.display(), "glimpse-web listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html((*state.index_page).clone())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn latest(State(state): State<AppState>) -> Response {
    let store = match state.store.lock() {
        Ok(store) => store,
        Err(_) => return server_error("store lock poisoned"),
    };
    match glimpse_store::latest_visitor_id(&store) {
        Ok(member_id) => Json(json!({ "member_id": member_id })).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "latest-visitor query failed");
            server_error("query failed")
        }
    }
}

async fn ad_page(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    // Missing parameter is a client error; an unknown id is not — it just
    // renders a page with zero history entries.
    let Some(member_id) = params.get("member_id") else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing member_id" })),
        )
            .into_response();
    };

    let store = match state.store.lock() {
        Ok(store) => store,
        Err(_) => return server_error("store lock poisoned"),
    };
    match glimpse_store::history_for(&store, member_id, unix_now()) {
        Ok(history) => Html(state.template.render(member_id, &history)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "history query failed");
            server_error("query failed")
        }
    }
}

fn server_error(reason: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": reason })),
    )
        .into_response()
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
