//! Terminal output.

use colored::Colorize;
use rk_core::config::AppConfig;
use rk_core::report::markdown::markdown_table;
use rk_protocol::{RunEvent, RunSpec, RunState};
use tokio::sync::mpsc::Receiver;

fn state_label(state: Option<RunState>) -> colored::ColoredString {
    match state {
        Some(RunState::Completed) => "completed".green(),
        Some(RunState::Error) => "error".red(),
        Some(other) => other.as_str().yellow(),
        None => "unknown".dimmed(),
    }
}

/// Print progress events until the sender side is dropped.
pub async fn print_events(mut rx: Receiver<RunEvent>, quiet: bool) {
    while let Some(event) = rx.recv().await {
        if quiet {
            continue;
        }
        match event {
            RunEvent::RunStarted {
                name, iteration, ..
            } => {
                if iteration == 0 {
                    eprintln!("{} {}", "▶".cyan(), name.bold());
                }
            }
            RunEvent::LogLine { content, .. } => eprintln!("  {}", content.dimmed()),
            RunEvent::RunFinished { .. } => {}
            RunEvent::SweepStarted { tasks, .. } => {
                eprintln!("{} sweeping {} iterations", "▶".cyan(), tasks);
            }
            RunEvent::IterationFinished {
                iteration, state, ..
            } => eprintln!("  iteration {:>3}: {}", iteration, state_label(state)),
            RunEvent::SweepFinished { best_iteration, .. } => {
                if let Some(best) = best_iteration {
                    eprintln!("  best iteration: {}", best.to_string().bold());
                }
            }
        }
    }
}

pub fn print_summary(run: &RunSpec) {
    println!("{} {}", "run".bold(), run.metadata.name);
    println!("  uid:   {}", run.uid());
    println!("  state: {}", state_label(run.state()));

    let Some(status) = &run.status else {
        return;
    };
    if let Some(error) = &status.error {
        println!("  error: {}", error.red());
    }
    if !status.outputs.is_empty() {
        println!("  outputs:");
        for (key, value) in &status.outputs {
            println!("    {key}: {value}");
        }
    }
    for artifact in &status.output_artifacts {
        println!(
            "  artifact {} -> {}",
            artifact.key.cyan(),
            artifact.location().unwrap_or("(inline)")
        );
    }
    if let Some(table) = &status.iterations {
        println!();
        print!("{}", markdown_table(table.header(), table.rows()));
    }
}

/// Print one line per child task with its iteration and parameters.
pub fn print_tasks(tasks: impl ExactSizeIterator<Item = RunSpec>) {
    println!("{} tasks", tasks.len());
    for task in tasks {
        let params = serde_json::to_string(&task.spec.parameters).unwrap_or_default();
        println!("  {:>3}  {}", task.metadata.iteration, params);
    }
}

pub fn print_definitions(config: &AppConfig) {
    if config.runs.is_empty() {
        println!("No run definitions found in .runkit/runs/");
        return;
    }
    for def in &config.runs {
        let run = &def.run;
        let kind = if run.spec.runtime.kind.is_empty() {
            "local"
        } else {
            run.spec.runtime.kind.as_str()
        };
        let names: Vec<&str> = run.spec.hyperparams.keys().map(String::as_str).collect();
        let sweep = if names.is_empty() {
            String::new()
        } else {
            format!(" sweep over {}", names.join(", "))
        };
        println!(
            "{:<20} {:<8}{}  {}",
            run.metadata.name.bold(),
            kind,
            sweep,
            def.path.display().to_string().dimmed()
        );
    }
}
