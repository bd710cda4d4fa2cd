//! dupelink - collapse duplicate files into hardlinks
//!
//! Entry point for the dupelink CLI application.

use clap::error::ErrorKind;
use clap::Parser;
use dupelink::{
    cli::Cli,
    error::{exit_code_for, ExitCode, StructuredError},
};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success,
                _ => ExitCode::UsageError,
            };
            // Printing only fails if stdout/stderr are gone.
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };
    let json = cli.json;

    match dupelink::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = exit_code_for(&err);

            if json {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{}", json);
                } else {
                    eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
                }
            } else {
                eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
