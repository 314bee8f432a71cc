use crate::audio_io::{samples_from_wav_bytes, wav_bytes};
use crate::error::CliError;
use crate::report::DecodeReport;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bfskmodem_core::{ChannelParams, Decoder, Encoder};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Base64 WAV bodies for long payloads overrun axum's 2 MB default
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    params: ChannelParams,
}

#[derive(Debug, Deserialize)]
pub struct EncodeRequest {
    /// UTF-8 text payload
    pub message: Option<String>,
    /// Binary payload, used when `message` is absent
    pub payload_base64: Option<String>,
    /// Per-request carrier override
    pub carrier_frequency: Option<f64>,
    pub params: Option<ChannelParams>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub sample_rate: f64,
    pub samples: usize,
    pub duration_secs: f64,
    pub wav_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub wav_base64: String,
    pub params: Option<ChannelParams>,
    #[serde(default)]
    pub trim_padding: bool,
    #[serde(default)]
    pub symbols: bool,
}

struct ApiError(CliError);

impl From<CliError> for ApiError {
    fn from(err: CliError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        tracing::warn!("Request failed ({}): {}", status, self.0);
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(params: ChannelParams) -> Router {
    Router::new()
        .route("/api/params", get(get_params))
        .route("/api/encode", post(encode))
        .route("/api/decode", post(decode))
        .with_state(AppState { params })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}

/// Serve until Ctrl-C
pub async fn run(addr: SocketAddr, params: ChannelParams) -> Result<(), CliError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(params))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn get_params(State(state): State<AppState>) -> Json<ChannelParams> {
    Json(state.params)
}

async fn encode(
    State(state): State<AppState>,
    Json(request): Json<EncodeRequest>,
) -> Result<Json<EncodeResponse>, ApiError> {
    let payload = match (request.message, request.payload_base64) {
        (Some(message), _) => message.into_bytes(),
        (None, Some(encoded)) => STANDARD.decode(encoded).map_err(CliError::from)?,
        (None, None) => {
            return Err(CliError::BadRequest("message or payload_base64 is required".to_string()).into())
        }
    };
    let params = request.params.unwrap_or(state.params);
    let carrier = request.carrier_frequency.unwrap_or(params.carrier_frequency);

    let response = tokio::task::spawn_blocking(move || -> Result<EncodeResponse, CliError> {
        let encoder = Encoder::new(params)?;
        let samples = encoder.encode_with_carrier(carrier, &payload)?;
        Ok(EncodeResponse {
            sample_rate: params.sample_rate,
            samples: samples.len(),
            duration_secs: samples.len() as f64 / params.sample_rate,
            wav_base64: STANDARD.encode(wav_bytes(&samples, params.sample_rate)?),
        })
    })
    .await
    .map_err(CliError::from)??;

    tracing::info!("Encoded {} samples", response.samples);
    Ok(Json(response))
}

async fn decode(
    State(state): State<AppState>,
    Json(request): Json<DecodeRequest>,
) -> Result<Json<DecodeReport>, ApiError> {
    let params = request.params.unwrap_or(state.params);
    // reject the channel before any buffer is sized from it
    let decoder = Decoder::new(params).map_err(CliError::from)?;
    let wav = STANDARD.decode(request.wav_base64).map_err(CliError::from)?;

    let report = tokio::task::spawn_blocking(move || -> Result<DecodeReport, CliError> {
        let samples = samples_from_wav_bytes(&wav, params.sample_rate)?;
        let result = decoder.decode(&samples);
        Ok(DecodeReport::new(&result, request.trim_padding, request.symbols))
    })
    .await
    .map_err(CliError::from)??;

    tracing::info!("Decoded {} bytes ({})", report.payload_len, report.status);
    Ok(Json(report))
}
