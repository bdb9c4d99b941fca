pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod stage;
