//! In-memory report produced by one pipeline run.

use chrono::{DateTime, Utc};

use crate::stage::Stage;

/// Text produced by the LLM for one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub stage: Stage,
    pub text: String,
}

/// Ordered stage results for a single job title.
///
/// Sections are appended strictly in [`Stage::ALL`] order; a report is
/// complete only once all five are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub job_title: String,
    pub started_at: DateTime<Utc>,
    sections: Vec<Section>,
}

impl Report {
    pub fn new(job_title: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            started_at: Utc::now(),
            sections: Vec::with_capacity(Stage::ALL.len()),
        }
    }

    /// The stage that must be produced next, or `None` when complete.
    pub fn next_stage(&self) -> Option<Stage> {
        Stage::ALL.get(self.sections.len()).copied()
    }

    /// Append the result for the next stage in order.
    ///
    /// Returns `false` (and leaves the report unchanged) when `stage` is not
    /// the expected next stage.
    pub(crate) fn push(&mut self, stage: Stage, text: String) -> bool {
        if self.next_stage() != Some(stage) {
            return false;
        }
        self.sections.push(Section { stage, text });
        true
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn get(&self, stage: Stage) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.sections.len() == Stage::ALL.len()
    }

    /// `(stage, text)` pairs in order, for comparisons and display.
    pub fn pairs(&self) -> Vec<(Stage, &str)> {
        self.sections
            .iter()
            .map(|s| (s.stage, s.text.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_report_is_empty_and_expects_description() {
        let report = Report::new("Nurse");
        assert!(report.is_empty());
        assert!(!report.is_complete());
        assert_eq!(report.next_stage(), Some(Stage::Description));
    }

    #[test]
    fn push_accepts_stages_in_order_only() {
        let mut report = Report::new("Nurse");
        assert!(!report.push(Stage::Missions, "skipped".to_owned()));
        assert!(report.is_empty());

        assert!(report.push(Stage::Description, "desc".to_owned()));
        assert!(!report.push(Stage::Description, "again".to_owned()));
        assert_eq!(report.len(), 1);
        assert_eq!(report.next_stage(), Some(Stage::Missions));
    }

    #[test]
    fn complete_after_all_five() {
        let mut report = Report::new("Nurse");
        for (i, stage) in Stage::ALL.into_iter().enumerate() {
            assert!(report.push(stage, format!("text {i}")));
        }
        assert!(report.is_complete());
        assert_eq!(report.next_stage(), None);
        assert_eq!(report.get(Stage::Enhancements), Some("text 3"));
    }

    #[test]
    fn get_missing_stage_is_none() {
        let mut report = Report::new("Nurse");
        report.push(Stage::Description, "desc".to_owned());
        assert_eq!(report.get(Stage::TransitionPlan), None);
    }
}
