use serde::Deserialize;
use shellmarks::module::{self, ModuleOutcome, ModuleParams};
use shellmarks::{ShellmarksError, ShellmarksResult};
use std::path::Path;
use std::process::ExitCode;
use std::{env, fs};

/// The JSON arguments file handed over by the orchestration tool.
#[derive(Debug, Deserialize)]
struct ModuleArgs {
    #[serde(flatten)]
    params: ModuleParams,

    #[serde(rename = "_ansible_check_mode", default)]
    check_mode: bool,
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();

    let outcome = match env::args().nth(1) {
        Some(args_file) => invoke(Path::new(&args_file))
            .unwrap_or_else(|e| ModuleOutcome::failure(e.to_string())),
        None => ModuleOutcome::failure("usage: shellmarks <arguments file>"),
    };

    match serde_json::to_string(&outcome) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "could not serialize module result");
            println!(r#"{{"failed": true, "msg": "could not serialize module result"}}"#);
            return ExitCode::FAILURE;
        }
    }

    if outcome.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn invoke(args_file: &Path) -> ShellmarksResult<ModuleOutcome> {
    let raw = fs::read_to_string(args_file)?;
    let args: ModuleArgs = serde_json::from_str(&raw)?;

    let home_dir = dirs::home_dir()
        .ok_or_else(|| ShellmarksError::Other("home directory not found".into()))?;

    Ok(module::run(
        &args.params,
        args.check_mode,
        &home_dir.to_string_lossy(),
    ))
}
