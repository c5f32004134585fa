use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "skillpack")]
#[command(about = "Inspect, route and check AI skill packs", version)]
pub struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Additional skills directory (repeatable)
    #[arg(short = 'd', long = "skills-dir", global = true)]
    pub skills_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List discovered skills
    List,
    /// Show a skill's metadata and routing table
    Show {
        /// Skill name
        skill: String,
    },
    /// Print the skills summary used in an agent system prompt
    Prompt,
    /// Show which skills a situation triggers
    Activate {
        /// Free-text situation description
        #[arg(required = true)]
        situation: Vec<String>,
    },
    /// Route a situation to a skill's reference documents
    Resolve {
        /// Skill name
        skill: String,
        /// Free-text situation description
        #[arg(required = true)]
        situation: Vec<String>,
        /// Load and print the referenced documents
        #[arg(short, long)]
        load: bool,
    },
    /// Evaluate source files against a rule checklist
    Evaluate {
        /// Rule set file (.toml, .yaml, .yml or .json)
        #[arg(short, long)]
        rules: PathBuf,
        /// Platform version rules are evaluated against
        #[arg(short, long)]
        target_version: Option<u32>,
        /// Exit with failure when any file scores below this
        #[arg(long)]
        min_score: Option<f64>,
        /// Source files to evaluate
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Check routing tables and rule sets for integrity problems
    Check {
        /// Rule set files to check (defaults to checklist.rulesets from config)
        #[arg(short, long)]
        rules: Vec<PathBuf>,
    },
}
