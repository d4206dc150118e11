use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Read;

use chrono::{DateTime, Duration, Utc};

use crate::entities::{ActivityRecord, ActivityReport, RuntimeConfig, UserCount};
use crate::error::SchemaError;
use crate::services::ingest::CsvRowSource;
use crate::utils::parse_timestamp;
use crate::value_objects::WindowKey;

pub const DEFAULT_WINDOW_SECONDS: u64 = 300;
pub const DEFAULT_REPEAT_THRESHOLD: usize = 10;
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone)]
pub struct AnalysisLimits {
    pub window_seconds: u64,
    pub repeat_threshold: usize,
    pub top_k: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECONDS,
            repeat_threshold: DEFAULT_REPEAT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl AnalysisLimits {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            window_seconds: config.window_seconds,
            repeat_threshold: config.repeat_threshold,
            top_k: config.top_k,
        }
    }
}

#[derive(Debug)]
struct UserTotal {
    count: u64,
    // index of first appearance; tie-break for equal counts
    first_seen: usize,
}

// One instance owns the full state of one analysis and is consumed by
// finish(); nothing survives across calls.
#[derive(Debug)]
pub struct ActivityAnalyzer {
    limits: AnalysisLimits,
    window: Duration,
    totals: HashMap<String, UserTotal>,
    windows: HashMap<WindowKey, VecDeque<DateTime<Utc>>>,
    flagged: HashSet<String>,
    rows_processed: u64,
    rows_skipped: u64,
}

impl ActivityAnalyzer {
    pub fn new(limits: AnalysisLimits) -> Self {
        let window = Duration::seconds(limits.window_seconds as i64);
        Self {
            limits,
            window,
            totals: HashMap::new(),
            windows: HashMap::new(),
            flagged: HashSet::new(),
            rows_processed: 0,
            rows_skipped: 0,
        }
    }

    // The total is recorded unconditionally; the window tracker only sees
    // rows whose timestamp parses.
    pub fn record_row(&mut self, record: &ActivityRecord) {
        self.rows_processed += 1;
        self.record_total(&record.user_id);
        match parse_timestamp(&record.timestamp) {
            Ok(timestamp) => self.observe(&record.user_id, &record.action, timestamp),
            Err(_) => self.rows_skipped += 1,
        }
    }

    fn record_total(&mut self, user_id: &str) {
        let next_index = self.totals.len();
        let total = self.totals.entry(user_id.to_string()).or_insert(UserTotal {
            count: 0,
            first_seen: next_index,
        });
        total.count += 1;
    }

    // Eviction is strict greater-than: an entry exactly at the window edge
    // stays. Assumes per-key timestamps arrive non-decreasing; a regressing
    // timestamp fails the predicate and leaves older entries in place.
    pub fn observe(&mut self, user_id: &str, action: &str, timestamp: DateTime<Utc>) {
        let key = WindowKey::new(user_id, action);
        let window = self.windows.entry(key).or_default();
        window.push_back(timestamp);
        while let Some(front) = window.front() {
            if timestamp - *front > self.window {
                window.pop_front();
            } else {
                break;
            }
        }
        if window.len() > self.limits.repeat_threshold && !self.flagged.contains(user_id) {
            self.flagged.insert(user_id.to_string());
        }
    }

    pub fn finish(self) -> ActivityReport {
        let ActivityAnalyzer {
            limits,
            totals,
            flagged,
            rows_processed,
            rows_skipped,
            ..
        } = self;

        let mut ranked: Vec<(String, UserTotal)> = totals.into_iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen))
        });
        ranked.truncate(limits.top_k);
        let top_users = ranked
            .into_iter()
            .map(|(user_id, total)| UserCount {
                user_id,
                count: total.count,
            })
            .collect();

        let mut flagged_users: Vec<String> = flagged.into_iter().collect();
        flagged_users.sort();

        ActivityReport {
            generated_at: Utc::now(),
            rows_processed,
            rows_skipped,
            top_users,
            flagged_users,
        }
    }
}

/// One full analysis over uploaded CSV text: schema gate, a single pass
/// over the rows, then the assembled report. The only fatal outcome is a
/// `SchemaError` from the header gate; once the loop starts, no row can
/// abort the analysis.
pub fn analyze_csv<R: Read>(
    reader: R,
    limits: &AnalysisLimits,
) -> Result<ActivityReport, SchemaError> {
    let source = CsvRowSource::new(reader)?;
    let mut analyzer = ActivityAnalyzer::new(limits.clone());
    for row in source {
        // A row the reader cannot decode never reaches the analyzer; the
        // contract leaves malformed row shapes to the caller.
        let Ok(record) = row else { continue };
        analyzer.record_row(&record);
    }
    Ok(analyzer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(seconds_past_midnight: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::seconds(seconds_past_midnight)
    }

    fn csv_of(rows: &[(&str, &str, &str)]) -> String {
        let mut out = String::from("timestamp,user_id,action\n");
        for (timestamp, user, action) in rows {
            out.push_str(&format!("{timestamp},{user},{action}\n"));
        }
        out
    }

    #[test]
    fn repeated_action_inside_window_flags_user() {
        // 12 rows 10s apart span 110s, all inside the 300s window. The
        // queue length passes 10 on the 11th row.
        let mut input = String::from("timestamp,user_id,action\n");
        for i in 0..12 {
            let minute = (i * 10) / 60;
            let second = (i * 10) % 60;
            input.push_str(&format!("2024-01-01T00:{minute:02}:{second:02},u1,login\n"));
        }
        let report = analyze_csv(input.as_bytes(), &AnalysisLimits::default()).expect("analyze");
        assert_eq!(report.flagged_users, vec!["u1".to_string()]);
        assert_eq!(
            report.top_users,
            vec![UserCount {
                user_id: "u1".to_string(),
                count: 12
            }]
        );
        assert_eq!(report.rows_processed, 12);
        assert_eq!(report.rows_skipped, 0);
    }

    #[test]
    fn wrong_header_fails_before_any_row() {
        let input = "timestamp,user,action\n2024-01-01T00:00:00,u1,login\n";
        let err = analyze_csv(input.as_bytes(), &AnalysisLimits::default()).expect_err("schema");
        assert!(matches!(err, SchemaError::ColumnMismatch { .. }));
    }

    #[test]
    fn unparseable_timestamp_still_counts_toward_totals() {
        let input = csv_of(&[("not-a-date", "u2", "click")]);
        let report = analyze_csv(input.as_bytes(), &AnalysisLimits::default()).expect("analyze");
        assert_eq!(
            report.top_users,
            vec![UserCount {
                user_id: "u2".to_string(),
                count: 1
            }]
        );
        assert!(report.flagged_users.is_empty());
        assert_eq!(report.rows_skipped, 1);
    }

    #[test]
    fn top_users_returns_all_when_fewer_than_k() {
        let mut rows = Vec::new();
        for _ in 0..5 {
            rows.push(("2024-01-01T00:00:00", "userA", "view"));
        }
        for _ in 0..3 {
            rows.push(("2024-01-01T00:00:00", "userB", "view"));
        }
        rows.push(("2024-01-01T00:00:00", "userC", "view"));
        let input = csv_of(&rows);
        let report = analyze_csv(input.as_bytes(), &AnalysisLimits::default()).expect("analyze");
        let expected = vec![
            UserCount {
                user_id: "userA".to_string(),
                count: 5,
            },
            UserCount {
                user_id: "userB".to_string(),
                count: 3,
            },
            UserCount {
                user_id: "userC".to_string(),
                count: 1,
            },
        ];
        assert_eq!(report.top_users, expected);
    }

    #[test]
    fn top_users_is_capped_at_k() {
        let mut rows = Vec::new();
        for user in ["a", "b", "c", "d", "e", "f", "g"] {
            rows.push(("2024-01-01T00:00:00", user, "view"));
        }
        let input = csv_of(&rows);
        let report = analyze_csv(input.as_bytes(), &AnalysisLimits::default()).expect("analyze");
        assert_eq!(report.top_users.len(), 5);
    }

    #[test]
    fn equal_counts_rank_by_first_appearance() {
        let input = csv_of(&[
            ("2024-01-01T00:00:00", "late", "view"),
            ("2024-01-01T00:00:01", "early", "view"),
            ("2024-01-01T00:00:02", "early", "view"),
            ("2024-01-01T00:00:03", "late", "view"),
        ]);
        let report = analyze_csv(input.as_bytes(), &AnalysisLimits::default()).expect("analyze");
        assert_eq!(report.top_users[0].user_id, "late");
        assert_eq!(report.top_users[1].user_id, "early");
    }

    #[test]
    fn totals_sum_to_rows_processed() {
        let input = csv_of(&[
            ("2024-01-01T00:00:00", "a", "x"),
            ("bad", "b", "y"),
            ("2024-01-01T00:00:02", "a", "z"),
            ("", "", ""),
        ]);
        let source = CsvRowSource::new(input.as_bytes()).expect("schema");
        let mut analyzer = ActivityAnalyzer::new(AnalysisLimits::default());
        for row in source {
            analyzer.record_row(&row.expect("row"));
        }
        let summed: u64 = analyzer.totals.values().map(|total| total.count).sum();
        assert_eq!(summed, analyzer.rows_processed);
        assert_eq!(analyzer.rows_processed, 4);
        // The bad-timestamp row never reached the tracker.
        assert!(!analyzer.windows.contains_key(&WindowKey::new("b", "y")));
    }

    #[test]
    fn empty_user_and_action_are_valid_keys() {
        let input = csv_of(&[("2024-01-01T00:00:00", "", "")]);
        let report = analyze_csv(input.as_bytes(), &AnalysisLimits::default()).expect("analyze");
        assert_eq!(report.top_users.len(), 1);
        assert_eq!(report.top_users[0].user_id, "");
        assert_eq!(report.top_users[0].count, 1);
    }

    #[test]
    fn entry_exactly_at_window_edge_is_retained() {
        let mut analyzer = ActivityAnalyzer::new(AnalysisLimits::default());
        analyzer.observe("u1", "login", ts(0));
        analyzer.observe("u1", "login", ts(300));
        let key = WindowKey::new("u1", "login");
        assert_eq!(analyzer.windows[&key].len(), 2);

        analyzer.observe("u1", "login", ts(301));
        assert_eq!(analyzer.windows[&key].len(), 2);
        assert_eq!(analyzer.windows[&key].front(), Some(&ts(300)));
    }

    #[test]
    fn windows_are_scoped_per_action_not_per_user() {
        let mut analyzer = ActivityAnalyzer::new(AnalysisLimits::default());
        // 11 observations inside the window, but spread over two actions:
        // neither queue passes the threshold.
        for i in 0..6 {
            analyzer.observe("u1", "login", ts(i));
        }
        for i in 6..11 {
            analyzer.observe("u1", "logout", ts(i));
        }
        assert!(analyzer.flagged.is_empty());

        // Pushing one action past the threshold flags the user.
        for i in 11..17 {
            analyzer.observe("u1", "login", ts(i));
        }
        assert_eq!(analyzer.flagged.len(), 1);
        assert!(analyzer.flagged.contains("u1"));
    }

    #[test]
    fn flagged_set_is_monotonic_and_deduplicated() {
        let mut analyzer = ActivityAnalyzer::new(AnalysisLimits::default());
        let mut sizes = Vec::new();
        // Keep breaching the threshold long past the first flag; the set
        // never shrinks and never gains a duplicate.
        for i in 0..40 {
            analyzer.observe("u1", "spam", ts(i));
            sizes.push(analyzer.flagged.len());
        }
        assert!(sizes.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(analyzer.flagged.len(), 1);
    }

    #[test]
    fn stale_entries_are_evicted_as_the_window_slides() {
        let mut analyzer = ActivityAnalyzer::new(AnalysisLimits::default());
        let key = WindowKey::new("u1", "login");
        // 20 observations 60s apart: only entries within 300s of the
        // newest remain, so the queue never exceeds 6 and u1 is never
        // flagged.
        for i in 0..20 {
            analyzer.observe("u1", "login", ts(i * 60));
            let window = &analyzer.windows[&key];
            let newest = *window.back().expect("non-empty");
            assert!(window
                .iter()
                .all(|entry| newest - *entry <= Duration::seconds(300)));
            assert!(window.len() <= 6);
        }
        assert!(analyzer.flagged.is_empty());
    }

    #[test]
    fn out_of_order_timestamp_leaves_queue_untouched() {
        let mut analyzer = ActivityAnalyzer::new(AnalysisLimits::default());
        analyzer.observe("u1", "login", ts(1000));
        analyzer.observe("u1", "login", ts(0));
        let key = WindowKey::new("u1", "login");
        // The regressing timestamp fails the eviction predicate; both stay.
        assert_eq!(analyzer.windows[&key].len(), 2);
    }

    #[test]
    fn rerunning_identical_input_yields_identical_output() {
        let input = csv_of(&[
            ("2024-01-01T00:00:00", "a", "x"),
            ("2024-01-01T00:00:01", "b", "x"),
            ("2024-01-01T00:00:02", "a", "y"),
        ]);
        let first = analyze_csv(input.as_bytes(), &AnalysisLimits::default()).expect("first");
        let second = analyze_csv(input.as_bytes(), &AnalysisLimits::default()).expect("second");
        assert_eq!(first.top_users, second.top_users);
        assert_eq!(first.flagged_users, second.flagged_users);
        assert_eq!(first.rows_processed, second.rows_processed);
    }
}
