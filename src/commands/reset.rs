use crate::commands::helpers::confirm;
use crate::config::ConfigStore;
use crate::error::Result;

pub fn execute(store: &ConfigStore, yes: bool) -> Result<()> {
    let config = store.load();

    println!("This deletes everything under {}:", store.layout().root().display());
    println!("  - {} provider(s) and their login credentials", config.providers.len());
    println!("  - {} installation(s) and their directories", config.installations.len());
    println!("  - debug logs");
    println!();

    if !yes && !confirm("Reset multi-claude?")? {
        println!("Aborted.");
        return Ok(());
    }

    store.reset_all()?;
    println!("Reset complete.");
    Ok(())
}
