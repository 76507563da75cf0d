// src/bin/anvil.rs

use anvil::{
    cli::{Cli, dispatcher::Shell},
    core::{
        config_loader,
        environment::{Environment, SystemEnvironment},
        error::ShellError,
    },
    t,
};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::*;
use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// The main entry point of the `anvil` shell.
/// Sets up logging, parses arguments and reports any failure in one place.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("{} {}", format!("{}:", t!("cli.error.prefix")).red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let config = config_loader::load_shell_config(cli.config.as_deref())?;
    let environment: Arc<dyn Environment> = Arc::new(SystemEnvironment::new());
    let start = match &cli.dir {
        Some(dir) => dir.clone(),
        None => environment
            .current_dir()
            .ok_or_else(|| anyhow!(t!("cli.error.no_current_dir")))?,
    };
    log::debug!("Starting on {} in '{}'.", environment.os_name(), start.display());

    let mut shell = Shell::new(&config, &start, environment)?;

    if cli.is_script_only() {
        shell.set_script_only(true);
        return run_script(&mut shell, &cli);
    }
    run_interactive(&mut shell)
}

/// Runs `-e` commands, then the script file. Keeps going after a failure and
/// reports it through the exit status.
fn run_script(shell: &mut Shell, cli: &Cli) -> Result<()> {
    let mut lines: Vec<String> = cli.execute.clone();
    if let Some(script) = &cli.script {
        let content = fs::read_to_string(script)
            .with_context(|| format!(t!("cli.error.read_script"), path = script.display()))?;
        lines.extend(content.lines().map(str::to_string));
    }

    let mut failures = 0;
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !run_line(shell, line) {
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(anyhow!(t!("cli.error.script_failed"), count = failures));
    }
    Ok(())
}

/// Reads commands from stdin until `exit`, `quit` or end of input.
fn run_interactive(shell: &mut Shell) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print!("{}", shell.prompt().cyan());
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let line = line.trim();
        if line == "exit" || line == "quit" {
            break;
        }
        run_line(shell, line);
    }
    Ok(())
}

/// Runs one line, printing its output or its error. Returns whether it succeeded.
fn run_line(shell: &mut Shell, line: &str) -> bool {
    match shell.execute_line(line) {
        Ok(output) => {
            print!("{}", output);
            if !output.is_empty() && !output.ends_with('\n') {
                println!();
            }
            true
        }
        Err(e) => {
            report(&e);
            false
        }
    }
}

fn report(error: &ShellError) {
    let label = format!("{}:", t!("cli.error.prefix"));
    // Missing facets and scope mismatches are refusals, not failures.
    if error.is_constraint() {
        eprintln!("{} {}", label.yellow().bold(), error);
    } else {
        eprintln!("{} {}", label.red().bold(), error);
    }
}
