//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{inspect, load, path_cmd, suggest_cmd, validate_cmd, warn_cmd};
use crate::engine::Schedule;

#[derive(Parser)]
#[command(name = "gantt")]
#[command(author, version, about = "Task-graph scheduling engine for Gantt charts")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the task forest with nesting indexes
    Inspect {
        /// JSON task list
        file: PathBuf,

        /// Restrict output to one comparison level
        #[arg(long)]
        level: Option<u32>,
    },

    /// Show the critical path per comparison level
    CriticalPath {
        /// JSON task list
        file: PathBuf,

        /// Restrict output to one comparison level
        #[arg(long)]
        level: Option<u32>,
    },

    /// Show containment and dependency warnings
    Warnings {
        /// JSON task list
        file: PathBuf,

        /// Restrict output to one comparison level
        #[arg(long)]
        level: Option<u32>,
    },

    /// Suggest date changes for moving or resizing a task
    Suggest {
        /// JSON task list
        file: PathBuf,

        /// Id of the task to move
        #[arg(long)]
        task: String,

        /// Comparison level of the task
        #[arg(long, default_value_t = 1)]
        level: u32,

        /// Proposed start date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Proposed end date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Print the task list with the change and suggestions applied
        #[arg(long)]
        apply: bool,
    },

    /// Check the task list for structural problems
    Validate {
        /// JSON task list
        file: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    match cli.command {
        Commands::Inspect { file, level } => {
            let tasks = load::load_tasks(&file)?;
            output.verbose_ctx("inspect", &format!("Loaded {} tasks", tasks.len()));
            inspect::run(&output, &Schedule::build(tasks), level)?;
        }

        Commands::CriticalPath { file, level } => {
            let tasks = load::load_tasks(&file)?;
            output.verbose_ctx("critical-path", &format!("Loaded {} tasks", tasks.len()));
            path_cmd::run(&output, &Schedule::build(tasks), level)?;
        }

        Commands::Warnings { file, level } => {
            let tasks = load::load_tasks(&file)?;
            output.verbose_ctx("warnings", &format!("Loaded {} tasks", tasks.len()));
            warn_cmd::run(&output, &Schedule::build(tasks), level)?;
        }

        Commands::Suggest {
            file,
            task,
            level,
            start,
            end,
            apply,
        } => {
            let tasks = load::load_tasks(&file)?;
            let new_start = load::parse_date(&start)?;
            let new_end = load::parse_date(&end)?;
            output.verbose_ctx(
                "suggest",
                &format!("Proposing {}..{} for '{}'", new_start, new_end, task),
            );
            suggest_cmd::run(
                &output,
                &Schedule::build(tasks),
                &task,
                level,
                new_start,
                new_end,
                apply,
            )?;
        }

        Commands::Validate { file } => {
            let tasks = load::load_tasks(&file)?;
            let problems = validate_cmd::run(&output, &tasks)?;
            if problems > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
