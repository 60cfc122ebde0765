pub mod analysis;
pub mod config;

pub use analysis::{run_check, run_glob, run_match, run_template, LimitOverrides};
pub use config::{handle_config_command, load_config, ConfigCommand};

use anyhow::Result;
use serde::Serialize;

/// How command results are printed
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `report` as pretty JSON, or hand it to `human` for text output.
    pub fn emit<T: Serialize>(self, report: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else {
            human(report);
        }
        Ok(())
    }
}
