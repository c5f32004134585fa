mod cli;
mod config;
mod service;

use anyhow::Result;
use clap::Parser;
use crate::cli::Cli;
use crate::config::Config;
use crate::service::SkillPackService;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load()?;

    skillpack_logging::init_logging(&config.logging.level, config.logging.json)?;

    // Run the requested command
    let service = SkillPackService::new(config, cli.skills_dirs, cli.json);
    if service.run(cli.command)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
