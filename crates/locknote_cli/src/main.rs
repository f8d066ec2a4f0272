//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `locknote_core` linkage.
//! - Open the configured store and print a deterministic JSON summary.

use locknote_core::{open_store, CoreConfig, NoteDao};
use log::info;
use serde_json::json;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_lookup(|key| std::env::var(key).ok());
    let file_logging = config.init_logging()?;

    println!("locknote_core ping={}", locknote_core::ping());
    println!("locknote_core version={}", locknote_core::core_version());

    let dao = open_store(&config)?;
    let notes = dao.list_all().await?;
    info!(
        "event=cli_probe module=cli status=ok notes={} file_logging={file_logging}",
        notes.len()
    );

    let summary = json!({
        "store": config
            .db_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string()),
        "schema_version": locknote_core::db::migrations::latest_version(),
        "note_count": notes.len(),
        "notes": notes,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
