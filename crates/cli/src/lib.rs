//! `pydemit` command line.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;

#[derive(Parser)]
#[command(
    name = "pydemit",
    version,
    about = "Emit pydantic models and HTTP API docs from a schema program"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured emitters over a program
    Emit(commands::emit::EmitArgs),
    /// Print the input/output/roundtrip usage of every referenced type
    Classify(commands::classify::ClassifyArgs),
}

/// Parse `args` (program name first) and run the selected command.
pub fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => {
            init_tracing();
            match cli.command {
                Some(Commands::Emit(args)) => commands::emit::run(args),
                Some(Commands::Classify(args)) => commands::classify::run(args),
                None => {
                    let mut cmd = Cli::command();
                    let _ = cmd.print_help();
                    println!();
                    0
                }
            }
        }
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn init_tracing() {
    // PYDEMIT_LOG controls log level: "trace", "debug", "info", "warn", "error"
    // or a full tracing filter spec like "pydemit_core=debug"
    let filter = match std::env::var("PYDEMIT_LOG") {
        Ok(level) if is_plain_level(&level) => format!("pydemit={level}"),
        Ok(spec) => spec,
        Err(_) => "pydemit=warn".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    // Repeated runs in one process keep the first subscriber.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_levels() {
        assert!(is_plain_level("debug"));
        assert!(is_plain_level("WARN"));
        assert!(!is_plain_level("pydemit_core=debug"));
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
