use axum::{
    Json, Router,
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::{Html, IntoResponse},
    routing::get,
};
use futures::StreamExt;
use madam_core::GraphState;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::Registry;
use crate::commands::{Flow, process_command};
use crate::error::{AppResult, InfraError};
use crate::input::parser::parse_message;
use crate::net::output::spawn_session_out;
use crate::net::sink::websocket::WebSocketSink;
use crate::state::session::Protocol;

static NEXT_WS_ID: AtomicU64 = AtomicU64::new(1);

/// Run the HTTP server with the page and its WebSocket endpoint
pub async fn serve(addr: std::net::SocketAddr, registry: Arc<Registry>) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(InfraError::from)?;
    tracing::info!(%addr, "http listening");
    axum::serve(listener, router(registry)).await.map_err(InfraError::from)?;
    Ok(())
}

pub fn router(registry: Arc<Registry>) -> Router {
    let images = ServeDir::new(&registry.config.images_dir);

    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_upgrade))
        .route("/healthz", get(healthz))
        .nest_service("/images", images)
        .with_state(registry)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

async fn index(State(registry): State<Arc<Registry>>) -> Html<String> {
    let mut cards = String::new();
    for card in registry.gallery.cards() {
        cards.push_str(&format!(
            r#"<button class="card" data-id="{}">{}</button>"#,
            escape_html(&card.id),
            escape_html(&card.title)
        ));
    }

    Html(INDEX_HTML.replace("{{CARDS}}", &cards))
}

async fn healthz(State(registry): State<Arc<Registry>>) -> impl IntoResponse {
    let conversation = match registry.store.state() {
        GraphState::Pending => "pending",
        GraphState::Ready(_) => "ready",
        GraphState::Failed(_) => "failed",
    };

    Json(serde_json::json!({
        "status": "ok",
        "conversation": conversation,
        "online": registry.online_count(),
    }))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(registry): State<Arc<Registry>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_handler(socket, registry))
}

async fn ws_handler(socket: WebSocket, registry: Arc<Registry>) {
    let (ws_write, mut ws_read) = socket.split();

    let peer = format!("ws-{}", NEXT_WS_ID.fetch_add(1, Ordering::Relaxed));
    let (mut sess, frames) = registry.new_session(Protocol::WebSocket, peer);
    let output = spawn_session_out(frames, WebSocketSink::new(ws_write));

    tracing::info!(peer = %sess.peer, "websocket connected");
    registry.set_online(&sess.peer, true);
    registry.attach(&mut sess).await;

    while let Some(Ok(msg)) = ws_read.next().await {
        let text = match msg {
            Message::Text(t) => t.to_string(),
            Message::Binary(b) => String::from_utf8_lossy(&b).to_string(),
            Message::Ping(_) => {
                // Axum already handles Pong responses automatically
                continue;
            }
            Message::Pong(_) => continue,
            Message::Close(_) => break,
        };

        let cmd = parse_message(&text);
        match process_command(cmd, &mut sess, &registry) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => sess.notice(format!("error: {e}")),
        }

        if sess.overflowed() {
            tracing::warn!(peer = %sess.peer, "client is not reading, disconnecting");
            break;
        }
    }

    registry.set_online(&sess.peer, false);
    tracing::info!(peer = %sess.peer, "websocket disconnected");
    let stalled = sess.overflowed();
    drop(sess);
    if stalled {
        output.abort();
    } else {
        let _ = output.await;
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Madame's</title>
<style>
  body { font-family: Georgia, serif; background: #f6efe6; color: #3b2a1e; margin: 2rem; }
  .hidden { display: none !important; }
  #overlay { position: fixed; inset: 0; background: rgba(0,0,0,.5); display: flex; align-items: center; justify-content: center; }
  #coffee-modal, #card-dialog { background: #fff8ef; padding: 1.5rem; border-radius: 8px; max-width: 32rem; width: 90%; }
  #madam-sprite { height: 8rem; }
  #coffee-dialog-text, #gallery-text { white-space: pre-wrap; min-height: 3rem; }
  #coffee-choices button, .card { display: block; margin: .3rem 0; }
</style>
</head>
<body>
<h1>Madame's</h1>
<button id="order">Order coffee</button>
<section id="gallery">{{CARDS}}</section>

<div id="overlay" class="hidden">
  <div id="coffee-modal">
    <img id="madam-sprite" alt="">
    <p id="coffee-dialog-text"></p>
    <div id="coffee-choices"></div>
    <div id="coffee-entry" class="hidden">
      <input id="coffee-input">
      <button id="coffee-submit">Submit</button>
    </div>
    <button id="close-modal">Close</button>
  </div>
</div>

<dialog id="card-dialog">
  <h2 id="card-title"></h2>
  <p id="gallery-text"></p>
  <button id="dismiss-card">Close</button>
</dialog>

<script>
const ws = new WebSocket(`${location.protocol === "https:" ? "wss" : "ws"}://${location.host}/ws`);
const $ = (id) => document.getElementById(id);
const send = (event) => ws.send(JSON.stringify(event));
const surfaces = { conversation: $("coffee-dialog-text"), gallery: $("gallery-text") };

ws.onmessage = (msg) => {
  const f = JSON.parse(msg.data);
  switch (f.type) {
    case "clear_text": surfaces[f.target].textContent = ""; break;
    case "append_text": surfaces[f.target].textContent += f.ch; break;
    case "set_text": surfaces[f.target].textContent = f.text; break;
    case "sprite":
      $("madam-sprite").src = f.src ?? "";
      $("madam-sprite").alt = f.alt ?? "";
      $("madam-sprite").classList.toggle("hidden", !f.src);
      break;
    case "choices":
      $("coffee-entry").classList.add("hidden");
      $("coffee-choices").replaceChildren(...f.labels.map((label, index) => {
        const b = document.createElement("button");
        b.textContent = label;
        b.onclick = () => send({ type: "choose", index });
        return b;
      }));
      break;
    case "entry":
      $("coffee-choices").replaceChildren();
      $("coffee-input").placeholder = f.placeholder;
      $("coffee-input").value = "";
      $("coffee-entry").classList.remove("hidden");
      $("coffee-input").focus();
      break;
    case "clear_entry": $("coffee-input").value = ""; break;
    case "hide_interactive":
      $("coffee-choices").replaceChildren();
      $("coffee-entry").classList.add("hidden");
      break;
    case "modal": $("overlay").classList.toggle("hidden", !f.open); break;
    case "card_dialog":
      if (f.open) { $("card-title").textContent = f.title ?? ""; $("card-dialog").showModal(); }
      else { $("card-dialog").close(); }
      break;
    case "notice": console.log(f.text); break;
  }
};

$("order").onclick = () => send({ type: "open_modal" });
$("close-modal").onclick = () => send({ type: "close_modal" });
$("overlay").onclick = (e) => { if (e.target === $("overlay")) send({ type: "close_modal" }); };
const submitEntry = () => send({ type: "submit", text: $("coffee-input").value });
$("coffee-submit").onclick = submitEntry;
$("coffee-input").onkeydown = (e) => {
  if (e.key === "Enter") submitEntry();
};
$("dismiss-card").onclick = () => send({ type: "dismiss_card" });
document.querySelectorAll(".card").forEach((card) => {
  card.onclick = () => send({ type: "click_card", id: card.dataset.id });
});
</script>
</body>
</html>
"#;
