//! # CLI
//!
//! The `anvil` command-line surface and the line dispatcher behind it.
use clap::Parser;
use std::path::PathBuf;

/// The line dispatcher and shell state.
pub mod dispatcher;

/// Builds the color-aware after-help text from the translated template.
fn build_after_help() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let title = if use_colors { "\x1b[1;33m" } else { "" };
    let cmd = if use_colors { "\x1b[36m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted = t!("cli.help.after")
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset);

    Box::leak(formatted.into_boxed_str())
}

/// anvil: an extensible, facet-aware command shell over a project's file tree.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = t!("cli.about"),
    after_help = build_after_help(),
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
pub struct Cli {
    /// Directory to start in (defaults to the current directory).
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Configuration file to use instead of the one in the config directory.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run a command and exit. May be repeated; commands run in order.
    #[arg(short = 'e', long = "execute", value_name = "COMMAND")]
    pub execute: Vec<String>,

    /// Script file with one command per line.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,
}

impl Cli {
    /// Whether the shell runs without a person at the keyboard.
    pub fn is_script_only(&self) -> bool {
        !self.execute.is_empty() || self.script.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_execute_and_script() {
        let cli = Cli::parse_from(["anvil", "-e", "pwd", "--execute", "ls -a", "setup.anvil"]);
        assert_eq!(cli.execute, vec!["pwd".to_string(), "ls -a".to_string()]);
        assert_eq!(cli.script, Some(PathBuf::from("setup.anvil")));
        assert!(cli.is_script_only());
    }

    #[test]
    fn test_interactive_by_default() {
        let cli = Cli::parse_from(["anvil", "--dir", "/tmp"]);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp")));
        assert!(!cli.is_script_only());
    }
}
