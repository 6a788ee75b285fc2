use std::path::PathBuf;

use clap::Args;
use indexmap::IndexSet;
use pydemit_core::docs::emit_api_docs;
use pydemit_core::pydantic::emit_pydantic;
use pydemit_core::{EmitError, EmitterKind, FsHost, ProjectConfig};
use tracing::{debug, info};

use super::load_program;

#[derive(Args, Debug, Clone)]
pub struct EmitArgs {
    /// Program document (JSON) handed over by the schema compiler
    #[arg(long, value_name = "FILE")]
    pub program: PathBuf,
    /// Project config (YAML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Overrides `output-dir` from the config
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Emitter to run; repeat to run several. Overrides `emit` from the config
    #[arg(long = "emitter", value_name = "NAME", value_parser = parse_emitter)]
    pub emitters: Vec<EmitterKind>,
}

fn parse_emitter(name: &str) -> Result<EmitterKind, String> {
    EmitterKind::parse(name)
        .ok_or_else(|| format!("unknown emitter '{name}' (expected pydantic or http-api-docs)"))
}

pub fn run(args: EmitArgs) -> i32 {
    match emit(&args) {
        Ok(Some(written)) => {
            for path in written {
                println!("{}", path.display());
            }
            0
        }
        Ok(None) => {
            eprintln!("Program has errors, nothing was emitted.");
            1
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

/// Run the selected emitters. `None` when the program carries errors.
fn emit(args: &EmitArgs) -> Result<Option<Vec<PathBuf>>, EmitError> {
    let mut config = match &args.config {
        Some(path) => ProjectConfig::from_path(path)?,
        None => ProjectConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if !args.emitters.is_empty() {
        config.emit = args.emitters.clone();
    }

    let graph = load_program(&args.program)?;
    if graph.has_errors() {
        return Ok(None);
    }

    let mut written = Vec::new();
    let emitters: IndexSet<EmitterKind> = config.emit.iter().copied().collect();
    for kind in emitters {
        let out_dir = config.output_dir.join(kind.as_str());
        debug!(emitter = %kind, out_dir = %out_dir.display(), "Running emitter.");
        let mut host = FsHost::new(&out_dir);
        let outputs = match kind {
            EmitterKind::Pydantic => emit_pydantic(&graph, &config.options.pydantic, &mut host)?,
            EmitterKind::HttpApiDocs => {
                emit_api_docs(&graph, &config.options.http_api_docs, &mut host)?
            }
        };
        written.extend(outputs.keys().map(|file| out_dir.join(file)));
    }
    info!(files = written.len(), "Emission finished.");
    Ok(Some(written))
}
