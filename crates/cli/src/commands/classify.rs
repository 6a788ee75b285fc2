use std::path::PathBuf;

use clap::Args;
use pydemit_core::classify;

use super::load_program;

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// Program document (JSON) handed over by the schema compiler
    #[arg(long, value_name = "FILE")]
    pub program: PathBuf,
}

/// Print the usage of every operation-reachable type as JSON.
pub fn run(args: ClassifyArgs) -> i32 {
    let graph = match load_program(&args.program) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let usage = classify(&graph).to_named(&graph);
    match serde_json::to_string_pretty(&usage) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(err) => {
            eprintln!("Failed to serialize usage map: {err}");
            1
        }
    }
}
