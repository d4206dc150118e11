use anyhow::anyhow;
use tokio::task;
use tracing::info;

use backend_domain::{analyze_csv, ActivityReport, AnalysisLimits};

use crate::{AppError, AppState};

/// Run one uploaded dataset through the analysis core. The pass is
/// CPU-bound, so it runs on a blocking worker instead of the async runtime.
pub async fn run_analysis(state: &AppState, csv_text: String) -> Result<ActivityReport, AppError> {
    let limits = AnalysisLimits::from_config(&state.config);
    let outcome = task::spawn_blocking(move || analyze_csv(csv_text.as_bytes(), &limits))
        .await
        .map_err(|err| AppError::Internal(anyhow!("analysis task failed: {err}")))?;

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            state.metrics.record_analysis_error();
            return Err(AppError::BadRequest(err.to_string()));
        }
    };

    state.metrics.record_analysis(&report);
    info!(
        rows = report.rows_processed,
        skipped = report.rows_skipped,
        flagged = report.flagged_users.len(),
        "analysis completed"
    );
    Ok(report)
}
