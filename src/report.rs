use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::StepFailure;

pub const SUCCESS_MESSAGE: &str =
    "MongoDB collections and indexes created successfully for restaurant ordering system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Created,
    AlreadyPresent,
    /// Collection exists with a different or missing validator and was left as is.
    ValidatorMismatch,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTarget {
    Collection,
    Index,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub target: StepTarget,
    pub collection: String,
    pub index: Option<String>,
    pub outcome: StepOutcome,
}

/// Label used in log lines and failure output, e.g. `index carts.expiresAt_1`.
pub fn step_label(collection: &str, index: Option<&str>) -> String {
    match index {
        Some(index) => format!("index {collection}.{index}"),
        None => format!("collection {collection}"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub run_id: Uuid,
    pub database: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepRecord>,
    pub failures: Vec<StepFailure>,
}

impl BootstrapReport {
    pub fn new(run_id: Uuid, database: impl Into<String>) -> Self {
        Self {
            run_id,
            database: database.into(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        target: StepTarget,
        collection: &str,
        index: Option<&str>,
        outcome: StepOutcome,
    ) {
        self.steps.push(StepRecord {
            target,
            collection: collection.to_string(),
            index: index.map(str::to_string),
            outcome,
        });
    }

    pub fn fail(
        &mut self,
        target: StepTarget,
        collection: &str,
        index: Option<&str>,
        failure: StepFailure,
    ) {
        self.record(target, collection, index, StepOutcome::Failed);
        self.failures.push(failure);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, target: StepTarget, outcome: StepOutcome) -> usize {
        self.steps
            .iter()
            .filter(|s| s.target == target && s.outcome == outcome)
            .count()
    }

    fn count_outcome(&self, outcome: StepOutcome) -> usize {
        self.steps.iter().filter(|s| s.outcome == outcome).count()
    }

    fn count_target(&self, target: StepTarget) -> usize {
        self.steps.iter().filter(|s| s.target == target).count()
    }

    pub fn summary_line(&self) -> String {
        let created = self.count_outcome(StepOutcome::Created);
        let present = self.count_outcome(StepOutcome::AlreadyPresent);
        let mismatched = self.count(StepTarget::Collection, StepOutcome::ValidatorMismatch);

        let mut line = format!(
            "{SUCCESS_MESSAGE} (database {}: {} collections, {} indexes; {created} created, {present} already present",
            self.database,
            self.count_target(StepTarget::Collection),
            self.count_target(StepTarget::Index),
        );
        if mismatched > 0 {
            line.push_str(&format!(", {mismatched} left untouched with differing validator"));
        }
        line.push(')');
        line
    }

    pub fn failure_lines(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootstrapError;

    fn report() -> BootstrapReport {
        BootstrapReport::new(Uuid::new_v4(), "restaurant_app")
    }

    #[test]
    fn summary_counts_created_and_present() {
        let mut report = report();
        report.record(StepTarget::Collection, "users", None, StepOutcome::Created);
        report.record(StepTarget::Index, "users", Some("userId_1"), StepOutcome::Created);
        report.record(StepTarget::Index, "users", Some("email_1"), StepOutcome::AlreadyPresent);
        report.finish();

        assert!(report.is_success());
        assert_eq!(
            report.summary_line(),
            "MongoDB collections and indexes created successfully for restaurant ordering system \
             (database restaurant_app: 1 collections, 2 indexes; 2 created, 1 already present)"
        );
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn summary_mentions_untouched_collections() {
        let mut report = report();
        report.record(
            StepTarget::Collection,
            "carts",
            None,
            StepOutcome::ValidatorMismatch,
        );
        assert!(report.summary_line().ends_with("1 left untouched with differing validator)"));
    }

    #[test]
    fn failures_render_one_line_each() {
        let mut report = report();
        let conflict = BootstrapError::ConfigurationConflict("expireAfterSeconds differs".into());
        report.fail(
            StepTarget::Index,
            "carts",
            Some("expiresAt_1"),
            StepFailure::new(step_label("carts", Some("expiresAt_1")), &conflict),
        );
        report.record(
            StepTarget::Index,
            "carts",
            Some("cartId_1"),
            StepOutcome::AlreadyPresent,
        );

        assert!(!report.is_success());
        assert_eq!(
            report.failure_lines(),
            ["index carts.expiresAt_1 failed: ConfigurationConflict: expireAfterSeconds differs"]
        );
        assert_eq!(report.count(StepTarget::Index, StepOutcome::Failed), 1);
    }

    #[test]
    fn serializes_outcomes_in_snake_case() {
        let mut report = report();
        report.record(StepTarget::Collection, "users", None, StepOutcome::AlreadyPresent);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0]["outcome"], "already_present");
        assert_eq!(json["steps"][0]["target"], "collection");
        assert_eq!(json["database"], "restaurant_app");
    }
}
