//! Command routing

use std::process::ExitCode;

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;

/// Dispatch the parsed command line
pub async fn route(cli: Cli) -> Result<ExitCode> {
    let root = cli.root;

    match cli.command {
        Commands::Run {
            model,
            suite,
            options,
        } => {
            commands::run::execute(&root, &model, &suite, &options).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Matrix {
            suite,
            models,
            options,
            aggregate,
        } => commands::matrix::execute(&root, &suite, &models, &options, aggregate).await,
        Commands::Aggregate {
            runs_dir,
            out_csv,
            out_md,
        } => {
            commands::aggregate::execute(
                &root,
                runs_dir.as_deref(),
                out_csv.as_deref(),
                out_md.as_deref(),
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::List { target } => {
            commands::list::execute(&root, target)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
