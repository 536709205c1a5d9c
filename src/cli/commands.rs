//! Command dispatch

use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{describe, ApplicationError};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::ContentTree;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => config_command(cli.config.as_deref(), command),
        Commands::Tree { fixture } => {
            let container = load(cli.config.as_deref(), fixture)?;
            print_tree(&container.store.snapshot())
        }
        Commands::Rename {
            fixture,
            path,
            seed,
            show_tree,
        } => rename(cli.config.as_deref(), fixture, path, *seed, *show_tree),
        Commands::Run {
            fixture,
            iterations,
            threads,
            seed,
        } => run(cli.config.as_deref(), fixture, *iterations, *threads, *seed),
    }
}

fn load(config: Option<&Path>, fixture: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(config)?;
    Ok(ServiceContainer::from_fixture(settings, fixture)?)
}

#[instrument]
fn rename(
    config: Option<&Path>,
    fixture: &Path,
    path: &str,
    seed: Option<u64>,
    show_tree: bool,
) -> CliResult<()> {
    let container = load(config, fixture)?;
    let seed = seed.unwrap_or_else(|| container.settings.effective_seed());
    debug!("seed: {}", seed);

    let node = container
        .store
        .node(path)
        .map_err(|source| ApplicationError::Store {
            context: "resolve node".to_string(),
            source,
        })?;
    let outcome = container
        .renamer(seed)
        .rename(&node, &container.workflows)?;

    output::action(
        "Renamed",
        &format!("{} -> {}", outcome.original_name, describe(&outcome.content)),
    );
    output::detail(&format!(
        "{} attempt(s), {} collision(s), seed {}",
        outcome.attempts, outcome.collisions, seed
    ));

    if show_tree {
        print_tree(&container.store.snapshot())?;
    }
    Ok(())
}

#[instrument]
fn run(
    config: Option<&Path>,
    fixture: &Path,
    iterations: Option<usize>,
    threads: Option<usize>,
    seed: Option<u64>,
) -> CliResult<()> {
    let container = load(config, fixture)?;
    let iterations = iterations.unwrap_or(container.settings.stress.iterations);
    let threads = threads.unwrap_or(container.settings.stress.threads);
    if threads == 0 {
        return Err(CliError::InvalidArgs("threads must be at least 1".to_string()));
    }
    let seed = seed.unwrap_or_else(|| container.settings.effective_seed());

    output::header(&format!(
        "Stress run: {} action(s) on {} thread(s), seed {}",
        iterations, threads, seed
    ));
    let report = container.stress_runner(seed).run(iterations, threads)?;

    output::action("Done", &report);
    if report.failed() > 0 {
        output::warning(&format!("{} action(s) failed", report.failed()));
        for (kind, count) in report.failures.iter().sorted_by(|a, b| b.1.cmp(a.1)) {
            output::failure(&format!("{kind}: {count}"));
        }
    }
    Ok(())
}

fn config_command(config: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(CliError::InvalidArgs(
                    "cannot determine config directory".to_string(),
                ))
            }
        },
    }
    Ok(())
}

fn print_tree(tree: &ContentTree) -> CliResult<()> {
    if let Some(rendered) = tree.to_termtree() {
        output::info(&rendered);
    }
    io::stdout()
        .flush()
        .map_err(|e| InfraError::io("flush stdout", e))?;
    Ok(())
}
