use super::intake::{UploadSettings, missing_file_message, stage_upload};
use super::types::{AnalysisResponse, ErrorResponse, PING_MESSAGE, PingResponse, TextRequest};
use crate::{
    Error,
    predictor::{Input, ModelRegistry, Modality},
};
use axum::{
    extract::{
        Multipart, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub uploads: Arc<UploadSettings>,
}

/// Ceiling on `/analyze_text` request bodies.
pub const TEXT_MAX_MB: u64 = 2;

type HandlerResult = Result<Json<AnalysisResponse>, (StatusCode, Json<ErrorResponse>)>;

pub fn error_response(e: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: PING_MESSAGE.to_string(),
    })
}

pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    analyze_file(state, Modality::Image, multipart).await
}

pub async fn analyze_video(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    analyze_file(state, Modality::Video, multipart).await
}

pub async fn analyze_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    analyze_file(state, Modality::Audio, multipart).await
}

async fn analyze_file(
    state: AppState,
    modality: Modality,
    multipart: Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    let request_id = Uuid::new_v4();

    let multipart = multipart.map_err(|rejection| {
        warn!(%request_id, "Rejected {} request: {}", modality, rejection);
        error_response(Error::missing_input(missing_file_message()))
    })?;

    let staged = stage_upload(multipart, modality, &state.uploads)
        .await
        .map_err(|e| {
            warn!(%request_id, "Rejected {} upload: {}", modality, e);
            error_response(e)
        })?;

    info!(
        %request_id,
        "Received {} upload {:?} ({} bytes)",
        modality,
        staged.original_name(),
        staged.size()
    );

    // `staged` lives until the end of this function, so the temp file is gone
    // by the time the response is written on every path.
    match state
        .registry
        .predict(modality, Input::File(staged.path()))
        .await
    {
        Ok(prediction) => {
            info!(
                %request_id,
                "{} verdict: {} ({:.2})", modality, prediction.label, prediction.confidence
            );
            Ok(Json(AnalysisResponse::from(prediction)))
        }
        Err(e) => {
            error!(%request_id, "Failed to analyze {} upload: {}", modality, e);
            Err(error_response(e))
        }
    }
}

pub async fn analyze_text(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> HandlerResult {
    let request_id = Uuid::new_v4();
    let missing = || {
        error_response(Error::missing_input(
            "No text provided. Please send JSON with key 'text'.",
        ))
    };

    let Json(request) = payload.map_err(|rejection| {
        warn!(%request_id, "Rejected text request: {}", rejection);
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            error_response(Error::payload_too_large(format!(
                "Text too large (max {}MB).",
                TEXT_MAX_MB
            )))
        } else {
            missing()
        }
    })?;

    let text = match request.text {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(missing()),
    };

    info!(%request_id, "Received text analysis request ({} chars)", text.chars().count());

    match state
        .registry
        .predict(Modality::Text, Input::Text(&text))
        .await
    {
        Ok(prediction) => {
            info!(
                %request_id,
                "text verdict: {} ({:.2})", prediction.label, prediction.confidence
            );
            Ok(Json(AnalysisResponse::from(prediction)))
        }
        Err(e) => {
            error!(%request_id, "Failed to analyze text: {}", e);
            Err(error_response(e))
        }
    }
}
