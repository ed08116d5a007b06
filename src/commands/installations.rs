use crate::cli::InstallationsCommands;
use crate::commands::helpers::{confirm, find_installation};
use crate::config::ConfigStore;
use crate::error::{MultiClaudeError, Result};

pub fn execute(store: &ConfigStore, command: &InstallationsCommands) -> Result<()> {
    match command {
        InstallationsCommands::List => {
            let config = store.load_migrated();
            println!("{:<10} {:<28} {}", "ID", "NAME", "DIRECTORY");
            println!("{}", "-".repeat(72));
            println!("{:<10} {:<28} {}", "default", "Default", "(managed by Claude Code)");
            for inst in &config.installations {
                println!(
                    "{:<10} {:<28} {}",
                    inst.id,
                    inst.name,
                    store.layout().installation_path(&inst.dir_name).display()
                );
            }
            Ok(())
        }
        InstallationsCommands::Add { name } => {
            let name = valid_name(name)?;
            let inst = store.add_installation(name)?;
            println!(
                "Created installation \"{}\" in {}",
                inst.name,
                store.layout().installation_path(&inst.dir_name).display()
            );
            Ok(())
        }
        InstallationsCommands::Rename {
            installation,
            new_name,
        } => {
            let new_name = valid_name(new_name)?;
            let inst = find_installation(&store.load_migrated(), installation)?;
            let renamed = store.rename_installation(&inst.id, new_name)?;
            println!("Renamed \"{}\" to \"{}\".", inst.name, renamed.name);
            Ok(())
        }
        InstallationsCommands::Remove { installation, yes } => {
            let inst = find_installation(&store.load_migrated(), installation)?;
            let dir = store.layout().installation_path(&inst.dir_name);

            if !*yes {
                println!("This deletes {} and everything in it.", dir.display());
                if !confirm(&format!("Remove installation \"{}\"?", inst.name))? {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            store.remove_installation(&inst.id)?;
            println!("Removed installation \"{}\".", inst.name);
            Ok(())
        }
    }
}

fn valid_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MultiClaudeError::InvalidArgs(
            "The installation name can't be empty.".to_string(),
        ));
    }
    if name.eq_ignore_ascii_case(crate::config::DEFAULT_INSTALLATION_ID) {
        return Err(MultiClaudeError::InvalidArgs(
            "\"default\" is reserved for Claude Code's own directory.".to_string(),
        ));
    }
    Ok(name)
}
