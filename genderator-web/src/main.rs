//! Servidor web Axum para consultar o genderator via HTTP e WebSocket

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use genderator_core::{
    sample::demo_names, Answer, GenderPipeline, Outcome, PipelineEvent, ReferenceData,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Estado compartilhado da aplicação
///
/// Os dois pipelines dividem o mesmo `Arc<ReferenceData>`.
struct AppState {
    strict: GenderPipeline,
    split: GenderPipeline,
    default_force_split: bool,
}

impl AppState {
    fn pipeline(&self, force_split: Option<bool>) -> &GenderPipeline {
        if force_split.unwrap_or(self.default_force_split) {
            &self.split
        } else {
            &self.strict
        }
    }
}

#[derive(Deserialize)]
struct GuessRequest {
    name: String,
    #[serde(default)]
    force_split: Option<bool>,
}

#[derive(Deserialize)]
struct BatchRequest {
    names: Vec<String>,
    #[serde(default)]
    force_split: Option<bool>,
}

#[derive(Serialize)]
struct GuessResponse {
    answer: Option<Answer>,
    outcome: Outcome,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!(?config, "Configuração carregada");

    let data = match &config.data_dir {
        Some(dir) => ReferenceData::load_dir(dir)
            .with_context(|| format!("falha ao carregar tabelas de {}", dir.display()))?,
        None => {
            warn!("GENDERATOR_DATA_DIR não definido, usando tabelas de exemplo embutidas");
            ReferenceData::bundled()?
        }
    };
    let data = Arc::new(data);

    let state = Arc::new(AppState {
        strict: GenderPipeline::new(Arc::clone(&data), false),
        split: GenderPipeline::new(data, true),
        default_force_split: config.force_split,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/guess", post(guess_handler))
        .route("/guess/batch", post(batch_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-names", get(demo_names_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("falha ao escutar em {}", config.addr))?;
    info!("🚀 Servidor genderator iniciado em http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Inferência via HTTP POST (sem streaming)
async fn guess_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GuessRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        warn!("Requisição rejeitada: nome vazio");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Nome vazio"})),
        )
            .into_response();
    }

    let (answer, outcome) = state.pipeline(req.force_split).guess_with_outcome(&req.name);
    Json(GuessResponse { answer, outcome }).into_response()
}

/// Inferência em lote; a resposta segue a ordem dos nomes enviados
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> impl IntoResponse {
    info!("Lote recebido: {} nomes", req.names.len());

    // rayon bloqueia a thread atual até o lote terminar
    let result = tokio::task::spawn_blocking(move || {
        state.pipeline(req.force_split).guess_batch(req.names.as_slice())
    })
    .await;

    match result {
        Ok(answers) => Json(answers).into_response(),
        Err(err) => {
            warn!("Falha no processamento em lote: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Falha no processamento em lote"})),
            )
                .into_response()
        }
    }
}

/// Retorna nomes de demonstração
async fn demo_names_handler() -> impl IntoResponse {
    let names: Vec<serde_json::Value> = demo_names()
        .iter()
        .map(|(case, name)| {
            serde_json::json!({
                "case": case,
                "name": name
            })
        })
        .collect();
    Json(names)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe um nome, executa o pipeline e devolve os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // Aceita {name, force_split} em JSON ou o nome como texto puro
                let (name, force_split) = match serde_json::from_str::<GuessRequest>(&text) {
                    Ok(req) => (req.name.trim().to_string(), req.force_split),
                    Err(_) => (text.trim().to_string(), None),
                };

                if name.is_empty() {
                    continue;
                }

                let pipeline = state.pipeline(force_split).clone();
                let events = match tokio::task::spawn_blocking(move || {
                    let (tx, rx) = std::sync::mpsc::channel();
                    pipeline.guess_streaming(&name, tx);
                    let events: Vec<PipelineEvent> = rx.try_iter().collect();
                    events
                })
                .await
                {
                    Ok(events) => events,
                    Err(err) => {
                        warn!("Pipeline falhou no WebSocket: {err}");
                        continue;
                    }
                };

                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                        // Pequena pausa para a animação passo a passo
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
