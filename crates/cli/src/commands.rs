//! Subcommand definitions and handlers.

use crate::args::{parse_hyper, parse_param};
use crate::output;
use clap::Subcommand;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use rk_core::config::{load_config, load_run_file, AppConfig};
use rk_core::engine::SweepController;
use rk_core::report::ReportRenderer;
use rk_core::rundb::get_run_db;
use rk_core::runtimes::RuntimeRegistry;
use rk_core::sweep::{expand, TaskGenerator};
use rk_protocol::{HyperParamStrategy, RunSpec};
use serde_json::Value;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a run definition, sweeping its hyperparameters
    Run {
        #[command(flatten)]
        target: RunTarget,

        /// Runtime kind overriding the definition (local, mock)
        #[arg(long)]
        runtime: Option<String>,

        /// Execute with the mock runtime, echoing parameters as outputs
        #[arg(long)]
        dry_run: bool,

        /// Write pipeline report documents into this directory
        #[arg(long)]
        report_dir: Option<std::path::PathBuf>,

        /// Run database location overriding config.toml
        #[arg(long)]
        rundb: Option<String>,

        /// Print the final run as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the child tasks a sweep would run, without running them
    Expand {
        #[command(flatten)]
        target: RunTarget,
    },

    /// List run definitions found in the project
    List,
}

/// A run definition and command line overrides.
#[derive(clap::Args, Debug)]
pub struct RunTarget {
    /// Run name from `.runkit/runs/`, or a path to a YAML file
    run: String,

    /// Set a parameter (NAME=VALUE)
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// Set a hyperparameter list (NAME=[V1,V2] or NAME=V1,V2)
    #[arg(long = "hyper", value_parser = parse_hyper)]
    hyperparams: Vec<(String, Vec<Value>)>,

    /// Combine hyperparameters position-wise instead of as a grid
    #[arg(long)]
    list: bool,

    /// Best-iteration selector (max.OUTPUT or min.OUTPUT)
    #[arg(long)]
    selector: Option<String>,

    /// Failed iterations tolerated before the sweep fails
    #[arg(long)]
    max_errors: Option<usize>,
}

impl RunTarget {
    /// Resolve the run definition and apply overrides and config defaults.
    fn resolve(&self, config: &AppConfig) -> Result<RunSpec> {
        let path = Path::new(&self.run);
        let mut run = if path.is_file() {
            load_run_file(path)?
        } else {
            config
                .find_run(&self.run)
                .cloned()
                .ok_or_else(|| eyre!("no run named '{}' in the project", self.run))?
        };
        config.apply_defaults(&mut run);

        run.spec.parameters.extend(self.params.iter().cloned());
        let hyperparams = self.hyperparams.iter().cloned();
        run.spec.hyperparams.extend(hyperparams);
        if self.list {
            run.spec.hyper_param_options.strategy = HyperParamStrategy::List;
        }
        if self.selector.is_some() {
            run.spec.hyper_param_options.selector = self.selector.clone();
        }
        if self.max_errors.is_some() {
            run.spec.hyper_param_options.max_errors = self.max_errors;
        }
        Ok(run)
    }
}

pub async fn dispatch(command: Command, project: &Path, quiet: bool) -> Result<()> {
    let config = load_config(project)
        .await
        .wrap_err_with(|| format!("failed to load configuration from {}", project.display()))?;
    debug!(runs = config.runs.len(), "Configuration loaded");

    match command {
        Command::Run {
            target,
            runtime,
            dry_run,
            report_dir,
            rundb,
            json,
        } => {
            let mut run = target.resolve(&config)?;
            if dry_run {
                run.spec.runtime.kind = "mock".to_string();
            } else if let Some(kind) = runtime {
                run.spec.runtime.kind = kind;
            }
            execute(&config, run, report_dir, rundb, quiet, json).await
        }
        Command::Expand { target } => {
            let run = target.resolve(&config)?;
            let grid = expand(&run.spec.hyperparams, run.spec.hyper_param_options.strategy)?;
            if grid.is_sweep() {
                output::print_tasks(TaskGenerator::new(&run, &grid));
            } else {
                println!("'{}' has no hyperparameters: single run", run.metadata.name);
            }
            Ok(())
        }
        Command::List => {
            output::print_definitions(&config);
            Ok(())
        }
    }
}

async fn execute(
    config: &AppConfig,
    run: RunSpec,
    report_dir: Option<std::path::PathBuf>,
    rundb: Option<String>,
    quiet: bool,
    json: bool,
) -> Result<()> {
    let runtime = RuntimeRegistry::with_defaults().for_run(&run)?;
    let mut executor = config.executor(runtime);
    if let Some(dir) = report_dir {
        let renderer = ReportRenderer::from_config(&config.global.report).with_dir(dir);
        executor = executor.with_report(renderer);
    }
    if let Some(db) = rundb.as_deref().and_then(get_run_db) {
        executor = executor.with_rundb(db);
    }

    let (tx, rx) = mpsc::channel(256);
    let printer = tokio::spawn(output::print_events(rx, quiet));

    let hyperparams = run.spec.hyperparams.clone();
    let result = {
        let controller = SweepController::new(executor.with_events(tx));
        controller.run(run, &hyperparams).await
    };
    printer.await?;

    let parent = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&parent)?);
    } else {
        output::print_summary(&parent);
    }
    Ok(())
}
