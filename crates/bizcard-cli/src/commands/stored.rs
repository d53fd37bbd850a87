//! Stored command - inspect or clear previously persisted rows.

use clap::Args;
use console::style;

use bizcard_core::SupabaseTable;
use bizcard_core::sink::CardStore;

/// Arguments for the stored command.
#[derive(Args)]
pub struct StoredArgs {
    /// Delete every stored record instead of listing them
    #[arg(long)]
    delete_all: bool,

    /// Confirm deletion without prompting
    #[arg(long)]
    yes: bool,
}

pub fn run(args: StoredArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = SupabaseTable::new(&config.storage)?;

    if args.delete_all {
        if !args.yes {
            anyhow::bail!(
                "Refusing to delete all records from '{}' without --yes",
                config.storage.table
            );
        }
        store.delete_all()?;
        println!(
            "{} All records deleted from table '{}'",
            style("✓").green(),
            config.storage.table
        );
        return Ok(());
    }

    let records = store.select_all()?;
    if records.is_empty() {
        println!(
            "{} No records stored in table '{}'",
            style("ℹ").blue(),
            config.storage.table
        );
        return Ok(());
    }

    println!(
        "{:<8} {:<6} {:<24} {:<16} {:<36} {:>10}",
        "id", "card", "file", "field", "value", "confidence"
    );
    for record in &records {
        println!(
            "{:<8} {:<6} {:<24} {:<16} {:<36} {:>10.2}",
            record
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            record.row.card_number,
            record.row.file_name,
            record.row.field_name,
            record.row.value,
            record.row.confidence
        );
    }

    println!();
    println!("{} {} records stored", style("ℹ").blue(), records.len());

    Ok(())
}
