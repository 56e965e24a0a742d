use crate::cli::{ParArgs, ParCommands};
use crate::error::{CliError, Result};
use irfkit::params::ParameterStore;
use tracing::info;

pub fn run(args: &ParArgs) -> Result<()> {
    let mut store = match &args.pfiles {
        Some(raw) => ParameterStore::from_pfiles_value(raw),
        None => ParameterStore::from_pfiles()?,
    };

    match &args.command {
        ParCommands::List { app } => {
            let group = store.group(app)?;
            for name in group.names().collect::<Vec<_>>() {
                let param = group.get(name)?;
                println!("{:<16} = {:<24} {}", name, param.as_str(), param.prompt());
            }
        }
        ParCommands::Get { app, name } => {
            let group = store.group(app)?;
            let value = group.get(name)?.typed_value()?;
            println!("{}", value);
        }
        ParCommands::Set { app, assignment } => {
            let (name, value) = split_assignment(assignment)?;
            let group = store.group(app)?;
            group.set(name, value)?;
            group.save()?;
            info!("Updated '{}.par': {} = {}", app, name, value);
        }
    }
    Ok(())
}

fn split_assignment(assignment: &str) -> Result<(&str, &str)> {
    match assignment.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(CliError::Argument(format!(
            "expected NAME=VALUE, got '{}'",
            assignment
        ))),
    }
}
