use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::ActivityReport;

#[derive(Debug, Default)]
pub struct Metrics {
    analyses: AtomicU64,
    analysis_errors: AtomicU64,
    rows: AtomicU64,
    rows_skipped: AtomicU64,
    flagged_users: AtomicU64,
}

impl Metrics {
    pub fn record_analysis(&self, report: &ActivityReport) {
        self.analyses.fetch_add(1, Ordering::Relaxed);
        self.rows.fetch_add(report.rows_processed, Ordering::Relaxed);
        self.rows_skipped
            .fetch_add(report.rows_skipped, Ordering::Relaxed);
        self.flagged_users
            .fetch_add(report.flagged_users.len() as u64, Ordering::Relaxed);
    }

    pub fn record_analysis_error(&self) {
        self.analysis_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let analyses = self.analyses.load(Ordering::Relaxed);
        let errors = self.analysis_errors.load(Ordering::Relaxed);
        let rows = self.rows.load(Ordering::Relaxed);
        let skipped = self.rows_skipped.load(Ordering::Relaxed);
        let flagged = self.flagged_users.load(Ordering::Relaxed);

        format!(
            "# TYPE vigil_analyses_total counter\n\
vigil_analyses_total {}\n\
# TYPE vigil_analysis_errors_total counter\n\
vigil_analysis_errors_total {}\n\
# TYPE vigil_rows_total counter\n\
vigil_rows_total {}\n\
# TYPE vigil_rows_skipped_total counter\n\
vigil_rows_skipped_total {}\n\
# TYPE vigil_flagged_users_total counter\n\
vigil_flagged_users_total {}\n",
            analyses, errors, rows, skipped, flagged
        )
    }
}
