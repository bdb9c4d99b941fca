use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;

use crate::cli::RunArgs;
use crate::error::JobshiftError;
use crate::pipeline::GenerationSettings;

// Precedence: CLI > env > file > defaults.

const DEFAULT_ENDPOINT_URL: &str = "http://localhost:11434/api/generate";
const DEFAULT_MODEL_NAME: &str = "llama3";
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_OUTPUT_DIR: &str = "job_results";
const MAX_TEMPERATURE: f64 = 2.0;

const ENV_ENDPOINT_URL: &str = "OLLAMA_URL";
const ENV_MODEL_NAME: &str = "OLLAMA_MODEL";
const ENV_TEMPERATURE: &str = "TEMPERATURE";
const ENV_SAVE_RESULTS: &str = "SAVE_RESULTS";
const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";
const ENV_LOG_LEVEL: &str = "JOBSHIFT_LOG_LEVEL";
const ENV_LOG_FILE: &str = "JOBSHIFT_LOG_FILE";

/// Resolved configuration for a jobshift run.
///
/// Built from three layers with precedence CLI > env > file > defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct JobshiftConfig {
    pub endpoint_url: String,
    pub model_name: String,
    pub temperature: f64,
    /// When true, each completed report is written as markdown to `output_dir`.
    pub save_results: bool,
    pub output_dir: PathBuf,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// TOML-deserializable config file representation. All fields optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    endpoint_url: Option<String>,
    model_name: Option<String>,
    temperature: Option<f64>,
    save_results: Option<bool>,
    output_dir: Option<PathBuf>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
}

/// Intermediate layer where every field is optional, used to merge sources.
#[derive(Debug, Default)]
struct ConfigLayer {
    endpoint_url: Option<String>,
    model_name: Option<String>,
    temperature: Option<f64>,
    save_results: Option<bool>,
    output_dir: Option<PathBuf>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
}

impl JobshiftConfig {
    /// Load configuration with precedence: CLI > env > file > defaults.
    ///
    /// A `.env` file in the working directory is loaded first if present;
    /// it never overrides variables already set in the process environment.
    pub fn load(config_path: Option<&Path>, cli_args: &RunArgs) -> Result<Self, JobshiftError> {
        dotenvy::dotenv().ok();
        Self::load_with_env(config_path, cli_args, real_env_var)
    }

    /// Check that the resolved settings are usable before any stage runs.
    pub fn validate(&self) -> Result<(), JobshiftError> {
        validate_endpoint_url(&self.endpoint_url)?;
        if !self.temperature.is_finite()
            || self.temperature < 0.0
            || self.temperature > MAX_TEMPERATURE
        {
            return Err(JobshiftError::InvalidTemperature {
                value: self.temperature,
            });
        }
        if self.model_name.trim().is_empty() {
            return Err(JobshiftError::EmptyModelName);
        }
        Ok(())
    }

    /// Model parameters handed to the pipeline.
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.model_name.clone(),
            temperature: self.temperature,
        }
    }

    /// Internal constructor that accepts an env-var lookup function,
    /// enabling deterministic testing without process-global mutation.
    fn load_with_env(
        config_path: Option<&Path>,
        cli_args: &RunArgs,
        env_fn: fn(&str) -> Option<String>,
    ) -> Result<Self, JobshiftError> {
        let file_layer = match config_path {
            Some(path) => load_file_layer(path)?,
            None => ConfigLayer::default(),
        };
        let env_layer = load_env_layer(env_fn)?;
        let cli_layer = cli_layer_from(cli_args);

        let merged = merge_layers(file_layer, env_layer, cli_layer);

        Ok(JobshiftConfig {
            endpoint_url: merged
                .endpoint_url
                .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_owned()),
            model_name: merged
                .model_name
                .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_owned()),
            temperature: merged.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            save_results: merged.save_results.unwrap_or(false),
            output_dir: merged
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            log_level: merged.log_level,
            log_file: merged.log_file,
        })
    }
}

fn validate_endpoint_url(url: &str) -> Result<(), JobshiftError> {
    let invalid = |detail: String| JobshiftError::InvalidEndpointUrl {
        url: url.to_owned(),
        detail,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid(format!(
            "unsupported scheme '{}' (expected http or https)",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(())
}

fn load_file_layer(path: &Path) -> Result<ConfigLayer, JobshiftError> {
    let contents = fs::read_to_string(path).map_err(|e| JobshiftError::ConfigFileReadFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let fc: FileConfig =
        toml::from_str(&contents).map_err(|e| JobshiftError::ConfigFileParseFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    Ok(ConfigLayer {
        endpoint_url: fc.endpoint_url,
        model_name: fc.model_name,
        temperature: fc.temperature,
        save_results: fc.save_results,
        output_dir: fc.output_dir,
        log_level: fc.log_level,
        log_file: fc.log_file,
    })
}

fn real_env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn load_env_layer(env_fn: fn(&str) -> Option<String>) -> Result<ConfigLayer, JobshiftError> {
    Ok(ConfigLayer {
        endpoint_url: env_fn(ENV_ENDPOINT_URL),
        model_name: env_fn(ENV_MODEL_NAME),
        temperature: parse_env_f64(env_fn, ENV_TEMPERATURE)?,
        save_results: parse_env_bool(env_fn, ENV_SAVE_RESULTS)?,
        output_dir: env_fn(ENV_OUTPUT_DIR).map(PathBuf::from),
        log_level: env_fn(ENV_LOG_LEVEL),
        log_file: env_fn(ENV_LOG_FILE).map(PathBuf::from),
    })
}

fn parse_env_f64(
    env_fn: fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<f64>, JobshiftError> {
    match env_fn(key) {
        Some(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| JobshiftError::ConfigEnvParseError {
                var: key.to_owned(),
                detail: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Accepts `true/false`, `1/0`, `yes/no` in any case.
fn parse_env_bool(
    env_fn: fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<bool>, JobshiftError> {
    match env_fn(key) {
        Some(s) => parse_bool_str(&s)
            .map(Some)
            .ok_or_else(|| JobshiftError::ConfigEnvParseError {
                var: key.to_owned(),
                detail: format!("expected true or false, got '{s}'"),
            }),
        None => Ok(None),
    }
}

fn parse_bool_str(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn cli_layer_from(args: &RunArgs) -> ConfigLayer {
    ConfigLayer {
        endpoint_url: args.endpoint.clone(),
        model_name: args.model.clone(),
        temperature: args.temperature,
        save_results: if args.save { Some(true) } else { None },
        output_dir: args.output_dir.clone(),
        log_level: args.log_level.clone(),
        log_file: args.log_file.clone(),
    }
}

/// Merge three layers. For each field, pick CLI first, then env, then file.
fn merge_layers(file: ConfigLayer, env: ConfigLayer, cli: ConfigLayer) -> ConfigLayer {
    ConfigLayer {
        endpoint_url: cli.endpoint_url.or(env.endpoint_url).or(file.endpoint_url),
        model_name: cli.model_name.or(env.model_name).or(file.model_name),
        temperature: cli.temperature.or(env.temperature).or(file.temperature),
        save_results: cli.save_results.or(env.save_results).or(file.save_results),
        output_dir: cli.output_dir.or(env.output_dir).or(file.output_dir),
        log_level: cli.log_level.or(env.log_level).or(file.log_level),
        log_file: cli.log_file.or(env.log_file).or(file.log_file),
    }
}
