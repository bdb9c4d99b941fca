//! Console presentation and the interactive job-title session.
//!
//! Everything here writes to a caller-supplied `Write` and reads from a
//! caller-supplied `BufRead`, so the session loop is testable without a
//! terminal.

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::config::JobshiftConfig;
use crate::error::JobshiftError;
use crate::export;
use crate::llm::Generator;
use crate::pipeline::Pipeline;
use crate::report::Report;

/// Inputs (case-insensitive) that end an interactive session.
pub const QUIT_WORDS: [&str; 3] = ["quit", "exit", "end"];

const PROMPT: &str = "Enter a job title (or 'quit' to exit): ";
const BANNER_WIDTH: usize = 70;

/// One line read from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Title(String),
    Quit,
    Eof,
}

/// Outcome counts for an interactive session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub completed: usize,
    pub failed: usize,
}

pub fn banner(config: &JobshiftConfig) -> String {
    let rule = "*".repeat(BANNER_WIDTH);
    format!(
        "\n{rule}\n\
         AI JOB ENHANCEMENT TOOL\n\
         {rule}\n\
         Analyzes a job and recommends how to augment it with AI.\n\
         Using model: {model} | Temperature: {temperature}",
        model = config.model_name,
        temperature = config.temperature,
    )
}

/// Render the report sections under their labels, framed by rule lines.
pub fn render_report(report: &Report) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    let mut out = format!("\n{rule}\n");
    for section in report.sections() {
        out.push_str(&format!(
            "**{label}:**\n{text}\n\n",
            label = section.stage.label(),
            text = section.text.trim_end(),
        ));
    }
    out.push_str(&rule);
    out
}

/// Human-readable failure text. For stage failures, lists the stages that
/// completed before the failure.
pub fn render_failure(err: &JobshiftError) -> String {
    let mut out = format!("\nError: {err}");
    if let JobshiftError::StageFailed { completed, .. } = err {
        let done: Vec<&str> = completed
            .sections()
            .iter()
            .map(|s| s.stage.label())
            .collect();
        out.push_str(&format!(
            "\nCompleted before failure: {}/5{}",
            done.len(),
            if done.is_empty() {
                String::new()
            } else {
                format!(" ({})", done.join(", "))
            }
        ));
    }
    out
}

/// Prompt for and read one job title.
pub fn read_entry<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Entry> {
    write!(out, "\n{PROMPT}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(Entry::Eof);
    }

    let trimmed = line.trim();
    if QUIT_WORDS.iter().any(|w| trimmed.eq_ignore_ascii_case(w)) {
        return Ok(Entry::Quit);
    }
    Ok(Entry::Title(trimmed.to_owned()))
}

/// Run the pipeline for one title, printing progress and the report, then
/// saving it when `save_results` is on.
///
/// Export happens after the report is printed, so an export failure still
/// leaves the results on screen.
pub fn analyze<G: Generator, W: Write>(
    pipeline: &Pipeline<G>,
    config: &JobshiftConfig,
    job_title: &str,
    out: &mut W,
) -> Result<Report, JobshiftError> {
    if job_title.trim().is_empty() {
        return Err(JobshiftError::EmptyJobTitle);
    }

    print_line(out, &format!("\nAnalyzing: {}\n", job_title.trim()));

    let report =
        pipeline.run_with_progress(job_title, |stage| print_line(out, stage.progress_message()))?;

    print_line(out, &render_report(&report));

    if config.save_results {
        let path = export::save_report(&report, &config.output_dir, &config.model_name)?;
        print_line(out, &format!("\nReport saved to {}", path.display()));
    }

    Ok(report)
}

/// Interactive session.
///
/// With `repeat == false`, reads one title and runs once; a failure is
/// printed and returned. With `repeat == true`, keeps prompting until a quit
/// word or end of input; failures are printed and the loop continues.
/// Print the banner and analyze one title given up front. A failure is
/// rendered to `out` before it is returned.
pub fn run_single<G: Generator, W: Write>(
    pipeline: &Pipeline<G>,
    config: &JobshiftConfig,
    job_title: &str,
    out: &mut W,
) -> Result<Report, JobshiftError> {
    print_line(out, &banner(config));
    analyze(pipeline, config, job_title, out).inspect_err(|err| {
        print_line(out, &render_failure(err));
    })
}

pub fn run_session<G: Generator, R: BufRead, W: Write>(
    pipeline: &Pipeline<G>,
    config: &JobshiftConfig,
    input: &mut R,
    out: &mut W,
    repeat: bool,
) -> Result<SessionSummary, JobshiftError> {
    print_line(out, &banner(config));
    let mut summary = SessionSummary::default();

    loop {
        let entry = read_entry(input, out).unwrap_or_else(|e| {
            warn!(err = %e, "failed to read job title");
            Entry::Eof
        });

        let title = match entry {
            Entry::Title(title) => title,
            Entry::Quit => break,
            Entry::Eof if repeat => break,
            Entry::Eof => {
                let err = JobshiftError::NoJobTitle;
                print_line(out, &render_failure(&err));
                return Err(err);
            }
        };

        match analyze(pipeline, config, &title, out) {
            Ok(_) => summary.completed += 1,
            Err(err) => {
                summary.failed += 1;
                print_line(out, &render_failure(&err));
                if !repeat {
                    return Err(err);
                }
            }
        }

        if !repeat {
            return Ok(summary);
        }
    }

    print_line(out, "\nThank you for using the AI Job Enhancement Tool!\n");
    Ok(summary)
}

/// Console writes are best-effort; a broken stdout must not abort a run.
fn print_line<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = writeln!(out, "{text}") {
        warn!(err = %e, "failed to write to console");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;
    use crate::pipeline::GenerationSettings;
    use crate::stage::Stage;
    use std::cell::Cell;
    use std::io::Cursor;

    /// Replies "OK-n"; fails every call whose prompt mentions `fail_title`.
    struct Stub {
        calls: Cell<usize>,
        fail_title: Option<&'static str>,
    }

    impl Stub {
        fn new(fail_title: Option<&'static str>) -> Self {
            Self {
                calls: Cell::new(0),
                fail_title,
            }
        }
    }

    impl Generator for Stub {
        fn generate(&self, prompt: &str, _: &str, _: f64) -> Result<String, GenerationError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_title.is_some_and(|t| prompt.contains(t)) {
                return Err(GenerationError::EmptyResponse);
            }
            Ok(format!("OK-{}", self.calls.get()))
        }
    }

    fn config() -> JobshiftConfig {
        JobshiftConfig {
            endpoint_url: "http://localhost:11434/api/generate".to_owned(),
            model_name: "llama3".to_owned(),
            temperature: 0.7,
            save_results: false,
            output_dir: "job_results".into(),
            log_level: None,
            log_file: None,
        }
    }

    fn pipeline(stub: &Stub) -> Pipeline<&Stub> {
        Pipeline::new(
            stub,
            GenerationSettings {
                model: "llama3".to_owned(),
                temperature: 0.7,
            },
        )
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    // -- read_entry --

    #[test]
    fn read_entry_trims_title() {
        let mut input = Cursor::new("  Accountant \n");
        let mut out = Vec::new();
        let entry = read_entry(&mut input, &mut out).unwrap();
        assert_eq!(entry, Entry::Title("Accountant".to_owned()));
        assert!(output(out).contains(PROMPT));
    }

    #[test]
    fn read_entry_recognizes_quit_words_case_insensitively() {
        for word in ["quit", "EXIT", "End", " end \n"] {
            let mut input = Cursor::new(format!("{word}\n"));
            let entry = read_entry(&mut input, &mut Vec::new()).unwrap();
            assert_eq!(entry, Entry::Quit, "{word:?} should quit");
        }
    }

    #[test]
    fn read_entry_reports_eof() {
        let mut input = Cursor::new("");
        assert_eq!(read_entry(&mut input, &mut Vec::new()).unwrap(), Entry::Eof);
    }

    #[test]
    fn read_entry_keeps_blank_line_as_empty_title() {
        let mut input = Cursor::new("\n");
        assert_eq!(
            read_entry(&mut input, &mut Vec::new()).unwrap(),
            Entry::Title(String::new())
        );
    }

    // -- rendering --

    #[test]
    fn banner_shows_model_and_temperature() {
        let text = banner(&config());
        assert!(text.contains("AI JOB ENHANCEMENT TOOL"));
        assert!(text.contains("Using model: llama3 | Temperature: 0.7"));
    }

    #[test]
    fn render_report_lists_labels_in_order() {
        let stub = Stub::new(None);
        let report = pipeline(&stub).run("Accountant").unwrap();
        let text = render_report(&report);

        let mut last = 0;
        for stage in Stage::ALL {
            let pos = text.find(stage.label()).unwrap();
            assert!(pos > last, "{} out of order", stage.label());
            last = pos;
        }
        assert!(text.contains("**Job Description:**\nOK-1"));
    }

    #[test]
    fn render_failure_lists_completed_stages() {
        let mut report = Report::new("Accountant");
        report.push(Stage::Description, "d".to_owned());
        report.push(Stage::Missions, "m".to_owned());

        let err = JobshiftError::StageFailed {
            stage: Stage::Technologies,
            completed: Box::new(report),
            source: GenerationError::EmptyResponse,
        };
        let text = render_failure(&err);
        assert!(text.contains("Technologies"), "got: {text}");
        assert!(
            text.contains("Completed before failure: 2/5 (Job Description, Missions, Deliverables & Tasks)"),
            "got: {text}"
        );
    }

    #[test]
    fn render_failure_for_input_error_has_no_stage_list() {
        let text = render_failure(&JobshiftError::EmptyJobTitle);
        assert!(text.contains("Job title must not be empty."));
        assert!(!text.contains("Completed before failure"));
    }

    // -- analyze --

    #[test]
    fn analyze_prints_progress_then_report() {
        let stub = Stub::new(None);
        let mut out = Vec::new();

        let report = analyze(&pipeline(&stub), &config(), "Accountant", &mut out).unwrap();
        let text = output(out);

        assert!(report.is_complete());
        assert!(text.contains("Analyzing: Accountant"));
        let progress = text.find("Creating transition plan...").unwrap();
        let results = text.find("**Transition to AI-Augmented Role:**").unwrap();
        assert!(progress < results, "progress should precede results");
        assert!(!text.contains("Report saved"));
    }

    #[test]
    fn analyze_rejects_empty_title_without_calls() {
        let stub = Stub::new(None);
        let err = analyze(&pipeline(&stub), &config(), "  ", &mut Vec::new()).unwrap_err();
        assert!(matches!(err, JobshiftError::EmptyJobTitle));
        assert_eq!(stub.calls.get(), 0);
    }

    #[test]
    fn analyze_saves_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = JobshiftConfig {
            save_results: true,
            output_dir: dir.path().join("reports"),
            ..config()
        };
        let stub = Stub::new(None);
        let mut out = Vec::new();

        analyze(&pipeline(&stub), &cfg, "Data Analyst", &mut out).unwrap();

        let text = output(out);
        assert!(text.contains("Report saved to"), "got: {text}");
        let saved: Vec<_> = std::fs::read_dir(dir.path().join("reports"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].starts_with("data_analyst_"), "got: {saved:?}");
    }

    // -- run_session --

    #[test]
    fn single_session_runs_once_and_exits() {
        let stub = Stub::new(None);
        let mut input = Cursor::new("Accountant\nNurse\n");
        let mut out = Vec::new();

        let summary =
            run_session(&pipeline(&stub), &config(), &mut input, &mut out, false).unwrap();

        assert_eq!(summary, SessionSummary { completed: 1, failed: 0 });
        assert_eq!(stub.calls.get(), 5);
        assert!(!output(out).contains("Nurse"));
    }

    #[test]
    fn single_session_returns_stage_failure() {
        let stub = Stub::new(Some("Accountant"));
        let mut input = Cursor::new("Accountant\n");
        let mut out = Vec::new();

        let err = run_session(&pipeline(&stub), &config(), &mut input, &mut out, false)
            .unwrap_err();

        assert!(matches!(
            err,
            JobshiftError::StageFailed {
                stage: Stage::Description,
                ..
            }
        ));
        assert!(output(out).contains("Error: Stage 1/5 (Description) failed"));
    }

    #[test]
    fn single_session_eof_is_input_error() {
        let stub = Stub::new(None);
        let err = run_session(
            &pipeline(&stub),
            &config(),
            &mut Cursor::new(""),
            &mut Vec::new(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, JobshiftError::NoJobTitle));
        assert_eq!(stub.calls.get(), 0);
    }

    #[test]
    fn single_session_empty_title_is_input_error() {
        let stub = Stub::new(None);
        let err = run_session(
            &pipeline(&stub),
            &config(),
            &mut Cursor::new("\n"),
            &mut Vec::new(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, JobshiftError::EmptyJobTitle));
        assert_eq!(stub.calls.get(), 0);
    }

    #[test]
    fn repeat_session_continues_after_failure_until_quit() {
        let stub = Stub::new(Some("Astronaut"));
        let mut input = Cursor::new("Accountant\nAstronaut\n\nNurse\nquit\nChef\n");
        let mut out = Vec::new();

        let summary =
            run_session(&pipeline(&stub), &config(), &mut input, &mut out, true).unwrap();

        assert_eq!(summary, SessionSummary { completed: 2, failed: 2 });
        let text = output(out);
        assert!(text.contains("Analyzing: Nurse"));
        assert!(!text.contains("Analyzing: Chef"), "input after quit must be ignored");
        assert!(text.contains("Thank you for using the AI Job Enhancement Tool!"));
    }

    #[test]
    fn repeat_session_ends_cleanly_on_eof() {
        let stub = Stub::new(None);
        let summary = run_session(
            &pipeline(&stub),
            &config(),
            &mut Cursor::new("Accountant\n"),
            &mut Vec::new(),
            true,
        )
        .unwrap();
        assert_eq!(summary, SessionSummary { completed: 1, failed: 0 });
    }

    #[test]
    fn quit_in_single_session_runs_nothing() {
        let stub = Stub::new(None);
        let summary = run_session(
            &pipeline(&stub),
            &config(),
            &mut Cursor::new("quit\n"),
            &mut Vec::new(),
            false,
        )
        .unwrap();
        assert_eq!(summary, SessionSummary::default());
        assert_eq!(stub.calls.get(), 0);
    }

    // -- run_single --

    #[test]
    fn run_single_prints_banner_and_report() {
        let stub = Stub::new(None);
        let mut out = Vec::new();

        let report = run_single(&pipeline(&stub), &config(), "Accountant", &mut out).unwrap();

        assert!(report.is_complete());
        let text = output(out);
        assert!(text.contains("AI JOB ENHANCEMENT TOOL"));
        assert!(text.contains("**Transition to AI-Augmented Role:**\nOK-5"), "got: {text}");
    }

    #[test]
    fn run_single_renders_stage_failure_once() {
        let stub = Stub::new(Some("Accountant"));
        let mut out = Vec::new();

        let err = run_single(&pipeline(&stub), &config(), "Accountant", &mut out).unwrap_err();

        assert!(matches!(err, JobshiftError::StageFailed { .. }));
        let text = output(out);
        assert_eq!(text.matches("Stage 1/5").count(), 1, "got: {text}");
        assert_eq!(text.matches("empty response").count(), 1, "got: {text}");
    }
}
