use super::types::{DiagnoseResponse, ErrorResponse};
use crate::diagnosis::{DiagnosisEngine, DiagnosisRequest, DEFAULT_PROMPT};
use axum::{extract::Multipart, extract::State, http::StatusCode, response::Json};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Wire-level message for absent required file fields.
pub const MISSING_FILES_ERROR: &str = "Missing image or audio file";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn DiagnosisEngine>,
}

pub async fn diagnose(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DiagnoseResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = match extract_request(&mut multipart).await {
        Ok(request) => request,
        Err(e) if e.is_client_error() => {
            warn!("Rejecting request: {}", e);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: MISSING_FILES_ERROR.to_string(),
                }),
            ));
        }
        Err(e) => {
            error!("Failed to read multipart request: {}", e);
            return Err(internal_error(&e));
        }
    };

    info!(
        image_bytes = request.image.len(),
        audio_bytes = request.audio.len(),
        "Received diagnosis request"
    );

    match state.engine.diagnose(&request).await {
        Ok(diagnosis) => {
            info!("Diagnosis request complete");
            Ok(Json(DiagnoseResponse { diagnosis }))
        }
        Err(e) => {
            error!("Failed to process diagnosis request: {}", e);
            Err(internal_error(&e))
        }
    }
}

/// Pulls `image`, `audio` and the optional `prompt` out of the multipart
/// form. Fields may arrive in any order; duplicates keep the last value.
async fn extract_request(multipart: &mut Multipart) -> crate::Result<DiagnosisRequest> {
    let mut image = None;
    let mut audio = None;
    let mut prompt = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => image = Some(field.bytes().await?.to_vec()),
            Some("audio") => audio = Some(field.bytes().await?.to_vec()),
            Some("prompt") => prompt = Some(field.text().await?),
            _ => {}
        }
    }

    let image = image.ok_or_else(|| crate::Error::missing_input("image"))?;
    let audio = audio.ok_or_else(|| crate::Error::missing_input("audio"))?;

    Ok(DiagnosisRequest {
        image,
        audio,
        prompt: prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
    })
}

fn internal_error(e: &crate::Error) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("An internal error occurred: {e}"),
        }),
    )
}
