use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use jobshift::cli::{Cli, Commands, PromptsArgs, RunArgs};
use jobshift::config::JobshiftConfig;
use jobshift::console;
use jobshift::llm::OllamaClient;
use jobshift::pipeline::Pipeline;
use jobshift::prompt;

const PREVIEW_TITLE: &str = "<job title>";

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, tracing::dispatcher::has_been_set(), &mut io::stderr());
            ExitCode::FAILURE
        }
    }
}

/// Report a terminal error. Without a subscriber (logging failed to come up)
/// the message goes straight to `stderr`.
fn report_error<W: Write>(e: &anyhow::Error, logging_ready: bool, stderr: &mut W) {
    if logging_ready {
        error!("{e}");
    } else {
        let _ = writeln!(stderr, "Error: {e}");
    }
}

/// Errors returned here have not been shown to the user yet. Failures the
/// console already rendered come back as `Ok(ExitCode::FAILURE)`.
fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.into_command() {
        Commands::Run(args) => run_pipeline(args),
        Commands::Prompts(args) => {
            jobshift::logging::init(None, None)?;
            print_prompts(&args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_pipeline(args: RunArgs) -> anyhow::Result<ExitCode> {
    let config = match JobshiftConfig::load(args.config.as_deref(), &args) {
        Ok(config) => config,
        Err(e) => {
            // Bring up logging from CLI flags alone so the error is reported.
            jobshift::logging::init(args.log_level.as_deref(), args.log_file.as_deref())?;
            return Err(e.into());
        }
    };

    jobshift::logging::init(config.log_level.as_deref(), config.log_file.as_deref())?;

    config.validate()?;

    info!(
        endpoint = %config.endpoint_url,
        model = %config.model_name,
        temperature = config.temperature,
        save_results = config.save_results,
        output_dir = %config.output_dir.display(),
        "config loaded"
    );

    let client = OllamaClient::new(config.endpoint_url.clone())?;
    let pipeline = Pipeline::new(client, config.generation_settings());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = match args.job {
        Some(job) => console::run_single(&pipeline, &config, &job, &mut out).map(|_| ()),
        None => {
            let stdin = io::stdin();
            console::run_session(&pipeline, &config, &mut stdin.lock(), &mut out, args.repeat)
                .map(|summary| {
                    info!(
                        completed = summary.completed,
                        failed = summary.failed,
                        "session finished"
                    );
                })
        }
    };

    Ok(match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}

fn print_prompts(args: &PromptsArgs) -> anyhow::Result<()> {
    let title = args.job.as_deref().unwrap_or(PREVIEW_TITLE);
    let mut text = String::new();
    for (stage, body) in prompt::preview(title) {
        text.push_str(&format!(
            "===== Stage {}/5: {} =====\n{}\n\n",
            stage.position(),
            stage.label(),
            body
        ));
    }

    match &args.output {
        Some(path) => fs::write(path, &text)
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display())),
        None => {
            io::stdout().write_all(text.as_bytes())?;
            Ok(())
        }
    }
}
