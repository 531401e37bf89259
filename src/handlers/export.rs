// src/handlers/export.rs

use axum::{
    extract::{Extension, Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{
    config::Config,
    error::AppError,
    export::{build_matrix, fetch::bounded, fetch_class_snapshot, render_class_report, render_exercise_report},
    handlers::exercises::{completions_with_names, find_exercise},
    store::DynStore,
    utils::jwt::Claims,
};

/// Downloads the completion matrix of a whole class as CSV.
///
/// The document is built completely before the response starts, so a failed
/// export never produces a partial file.
pub async fn export_class(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(class_id): Path<i64>,
) -> Result<Response, AppError> {
    tracing::info!("Exporting comprehensive CSV for class {}", class_id);

    let snapshot = fetch_class_snapshot(store.as_ref(), class_id, config.fetch_timeout)
        .await
        .map_err(export_failure)?;

    let matrix = build_matrix(&snapshot);
    let csv = render_class_report(&matrix);

    tracing::info!(
        "Exported class {} for {}: {} students x {} exercises",
        class_id,
        claims.username,
        matrix.total_students,
        matrix.total_exercises
    );

    Ok(csv_attachment(
        &format!("{}_all_exercises.csv", snapshot.class.name),
        csv,
    ))
}

/// Downloads the completions of one exercise as CSV.
pub async fn export_exercise(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Path(exercise_id): Path<i64>,
) -> Result<Response, AppError> {
    tracing::info!("Exporting exercise {}", exercise_id);

    let (exercise, completions) = bounded(config.fetch_timeout, async {
        let exercise = find_exercise(store.as_ref(), exercise_id).await?;
        let completions = completions_with_names(store.as_ref(), &exercise).await?;
        Ok::<_, AppError>((exercise, completions))
    })
    .await
    .map_err(export_failure)?;

    let csv = render_exercise_report(&completions);
    tracing::info!("Exported exercise {} ({} completions)", exercise_id, completions.len());

    Ok(csv_attachment(
        &format!("{}_completions.csv", exercise.name),
        csv,
    ))
}

/// Maps failures of the export path onto responses: missing data stays a
/// 404 and timeouts stay retryable, everything else becomes a 400 carrying
/// the error text.
fn export_failure(err: AppError) -> AppError {
    match err {
        AppError::NotFound(_) | AppError::AuthError(_) | AppError::Timeout(_) => err,
        other => {
            tracing::error!("Export failed: {:?}", other);
            AppError::BadRequest(other.message().to_string())
        }
    }
}

/// RFC 5987 `attr-char`: everything else in `filename*` is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Wraps a finished CSV document as a file download.
fn csv_attachment(filename: &str, body: String) -> Response {
    let disposition = content_disposition(filename);
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"export.csv\""));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// Builds the `Content-Disposition` value for a download.
///
/// Names that survive as a quoted ASCII string are sent as is. Anything else
/// gets a sanitized `filename` fallback plus the exact name as UTF-8 in
/// `filename*`.
fn content_disposition(filename: &str) -> String {
    let fallback = header_safe(filename);
    if fallback == filename {
        return format!("attachment; filename=\"{}\"", fallback);
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}

/// Replaces characters that cannot appear in a quoted header filename.
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect()
}
