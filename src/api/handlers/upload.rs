use crate::AppState;
use crate::api::error::AppError;
use crate::infrastructure::uploads::{ReservedUpload, UploadStore};
use crate::models::Upload;
use crate::utils::validation::{EXCEL_ONLY_MESSAGE, validate_spreadsheet};
use axum::{
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
};
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use utoipa::ToSchema;

pub const NO_FILE_MESSAGE: &str = "No file selected!";
pub const UNEXPECTED_FIELD_MESSAGE: &str = "Unexpected field";
pub const SUCCESS_MESSAGE: &str = "File uploaded and data inserted!";

/// Multipart body of `POST /upload`
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// The .xlsx or .xls workbook to import
    #[serde(rename = "excelFile")]
    #[schema(value_type = String, format = Binary)]
    excel_file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, description = "Spreadsheet upload", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored and every row inserted", body = String, content_type = "text/plain"),
        (status = 400, description = "No file, unexpected field, rejected file type or malformed multipart", body = String, content_type = "text/plain"),
        (status = 413, description = "Upload exceeds the size limit", body = String, content_type = "text/plain"),
        (status = 500, description = "Spreadsheet unreadable or an insert failed", body = String, content_type = "text/plain")
    ),
    tag = "import"
)]
pub async fn upload_spreadsheet(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<&'static str, AppError> {
    let mut upload: Option<Upload> = None;

    if let Err(e) = receive_upload(&state, &mut multipart, &mut upload).await {
        // A file saved before the request was rejected is never imported.
        if let Some(saved) = upload {
            state.uploads.discard(&saved.path).await;
        }
        return Err(e);
    }

    let Some(upload) = upload else {
        return Err(AppError::BadRequest(NO_FILE_MESSAGE.to_string()));
    };

    info!(
        "📦 Stored '{}' ({}) as {} ({} bytes)",
        upload.original_name,
        upload.content_type.as_deref().unwrap_or("unknown type"),
        upload.stored_name,
        upload.size
    );

    state.import_service.import(&upload.path).await?;

    Ok(SUCCESS_MESSAGE)
}

/// Walks every multipart part, saving the single accepted file into `upload`.
async fn receive_upload(
    state: &AppState,
    multipart: &mut Multipart,
    upload: &mut Option<Upload>,
) -> Result<(), AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        // Parts without a filename are plain form fields.
        let Some(original_name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_owned)
        else {
            continue;
        };

        let field_name = field.name().unwrap_or_default().to_owned();
        if field_name != state.config.upload_field_name || upload.is_some() {
            warn!(
                "🚫 Unexpected file part '{}' ({}) in upload",
                field_name, original_name
            );
            return Err(AppError::BadRequest(UNEXPECTED_FIELD_MESSAGE.to_string()));
        }

        let content_type = field.content_type().map(str::to_owned);
        if let Err(e) = validate_spreadsheet(&original_name, content_type.as_deref()) {
            warn!("🚫 Rejected upload '{}': {}", original_name, e);
            return Err(AppError::BadRequest(EXCEL_ONLY_MESSAGE.to_string()));
        }

        *upload = Some(
            save_field(
                &state.uploads,
                &field_name,
                original_name,
                content_type,
                &mut field,
            )
            .await?,
        );
    }

    Ok(())
}

async fn save_field(
    uploads: &UploadStore,
    field_name: &str,
    original_name: String,
    content_type: Option<String>,
    field: &mut Field<'_>,
) -> Result<Upload, AppError> {
    let ReservedUpload {
        mut file,
        stored_name,
        path,
    } = uploads.reserve(field_name, &original_name).await?;

    match write_field(&mut file, field).await {
        Ok(size) => Ok(Upload {
            original_name,
            content_type,
            stored_name,
            path,
            size,
        }),
        Err(e) => {
            drop(file);
            uploads.discard(&path).await;
            Err(e)
        }
    }
}

async fn write_field(file: &mut File, field: &mut Field<'_>) -> Result<u64, AppError> {
    let mut size = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(size)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}
