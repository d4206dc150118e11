use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::Json;
use tracing::{info, warn};

use backend_application::commands::analyze_commands;
use backend_application::AppState;
use backend_domain::ActivityReport;

use crate::error::HttpError;
use crate::middleware::{extract_csv_upload, CsvUpload};

const UPLOAD_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Vigil Activity Analysis</title>
    <meta charset="UTF-8">
</head>
<body>
    <h1>Vigil Activity Analysis</h1>
    <p>Upload a CSV with columns <code>timestamp, user_id, action</code>.</p>
    <form action="/v1/analyze/upload" method="post" enctype="multipart/form-data">
        <input type="file" name="file" accept=".csv">
        <button type="submit">Analyze</button>
    </form>
</body>
</html>
"#;

pub async fn upload_page() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}

pub async fn upload_activity(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ActivityReport>, HttpError> {
    let CsvUpload { filename, text } = extract_csv_upload(multipart).await.map_err(|err| {
        warn!("rejected upload: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;

    info!(%filename, bytes = text.len(), "received activity upload");
    let report = analyze_commands::run_analysis(&state, text).await?;
    Ok(Json(report))
}
