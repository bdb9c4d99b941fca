//! Prompt pipeline: runs the five stages for one job title, in order.
//!
//! Each stage's prompt embeds the job title and every earlier result, so a
//! stage starts only after all earlier ones succeeded. The first failure
//! stops the run (no retries); the stages completed so far travel with the
//! error for diagnostics.
//!
//! The pipeline does no console or disk I/O. Callers observe progress via
//! the callback passed to [`Pipeline::run_with_progress`].

use std::time::Instant;

use tracing::{error, info};

use crate::error::JobshiftError;
use crate::llm::Generator;
use crate::prompt;
use crate::report::Report;
use crate::stage::Stage;

/// Model parameters sent with every request of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f64,
}

/// Where a run is. Transitions only move forward on success; any failure
/// moves to `Failed` and the run halts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Completed(Stage),
    Failed(Stage),
}

impl RunState {
    /// The stage to run next, or `None` when finished or failed.
    pub fn next_stage(self) -> Option<Stage> {
        match self {
            RunState::NotStarted => Some(Stage::Description),
            RunState::Completed(stage) => Stage::ALL.get(stage.position()).copied(),
            RunState::Failed(_) => None,
        }
    }

    pub fn is_finished(self) -> bool {
        self == RunState::Completed(Stage::TransitionPlan)
    }
}

/// Five-stage pipeline bound to one generator and one set of model settings.
pub struct Pipeline<G> {
    generator: G,
    settings: GenerationSettings,
}

impl<G: Generator> Pipeline<G> {
    pub fn new(generator: G, settings: GenerationSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Run all stages for `job_title`.
    pub fn run(&self, job_title: &str) -> Result<Report, JobshiftError> {
        self.run_with_progress(job_title, |_| {})
    }

    /// Run all stages, calling `on_stage` just before each stage's request.
    ///
    /// The title is trimmed; an empty title fails with
    /// [`JobshiftError::EmptyJobTitle`] before any request is made.
    pub fn run_with_progress(
        &self,
        job_title: &str,
        mut on_stage: impl FnMut(Stage),
    ) -> Result<Report, JobshiftError> {
        let job_title = job_title.trim();
        if job_title.is_empty() {
            return Err(JobshiftError::EmptyJobTitle);
        }

        let stage_count = Stage::ALL.len();
        info!(
            job_title,
            model = %self.settings.model,
            temperature = self.settings.temperature,
            stage_count,
            "starting pipeline"
        );

        let mut report = Report::new(job_title);
        let mut state = RunState::NotStarted;
        let run_start = Instant::now();

        while let Some(stage) = state.next_stage() {
            let position = stage.position();
            on_stage(stage);

            let prompt = prompt::build(stage, job_title, report.sections());
            info!(
                stage = stage.key(),
                position,
                stage_count,
                prompt_len = prompt.len(),
                "stage {position}/{stage_count}"
            );

            let start = Instant::now();
            let text = match self.generator.generate(
                &prompt,
                &self.settings.model,
                self.settings.temperature,
            ) {
                Ok(text) => text,
                Err(source) => {
                    state = RunState::Failed(stage);
                    error!(
                        stage = stage.key(),
                        position,
                        stage_count,
                        completed = report.len(),
                        ?state,
                        err = %source,
                        "stage failed"
                    );
                    return Err(JobshiftError::StageFailed {
                        stage,
                        completed: Box::new(report),
                        source,
                    });
                }
            };

            info!(
                stage = stage.key(),
                position,
                stage_count,
                duration_ms = start.elapsed().as_millis() as u64,
                response_len = text.len(),
                "stage complete"
            );

            let accepted = report.push(stage, text);
            debug_assert!(accepted, "stage {stage} produced out of order");
            state = RunState::Completed(stage);
        }

        debug_assert!(state.is_finished());
        info!(
            job_title,
            duration_ms = run_start.elapsed().as_millis() as u64,
            "pipeline complete"
        );

        Ok(report)
    }
}
