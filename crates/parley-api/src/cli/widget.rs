//! `parley widget`: manage widget configuration blobs.

use anyhow::{Context, Result, bail};
use console::style;

use parley_core::repository::widget::WidgetConfigRepository;
use parley_types::error::RepositoryError;

use crate::cli::WidgetCommand;
use crate::state::AppState;

/// Resolve the `data` argument: inline JSON or `@path`. The document must parse as JSON.
async fn read_document(data: &str) -> Result<String> {
    let text = match data.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {path}"))?,
        None => data.to_string(),
    };
    serde_json::from_str::<serde_json::Value>(&text).context("widget config must be valid JSON")?;
    Ok(text)
}

pub async fn run(state: &AppState, command: WidgetCommand, json: bool) -> Result<()> {
    match command {
        WidgetCommand::Set { data, id } => set(state, &data, id, json).await,
        WidgetCommand::Show { id } => show(state, id).await,
        WidgetCommand::Delete { id } => delete(state, id, json).await,
    }
}

async fn set(state: &AppState, data: &str, id: Option<i64>, json: bool) -> Result<()> {
    let document = read_document(data).await?;
    let id = match id {
        Some(id) => match state.widgets.update(id, &document).await {
            Err(RepositoryError::NotFound) => bail!("widget config {id} not found"),
            other => other.map(|()| id)?,
        },
        None => state.widgets.save(&document).await?,
    };

    if json {
        println!("{}", serde_json::json!({ "saved": true, "id": id }));
    } else {
        println!(
            "  {} Widget config {} saved",
            style("✓").green().bold(),
            style(id).bold()
        );
    }
    Ok(())
}

async fn show(state: &AppState, id: i64) -> Result<()> {
    let Some(document) = state.widgets.get(id).await? else {
        bail!("widget config {id} not found");
    };
    match serde_json::from_str::<serde_json::Value>(&document) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{document}"),
    }
    Ok(())
}

async fn delete(state: &AppState, id: i64, json: bool) -> Result<()> {
    if !state.widgets.delete(id).await? {
        bail!("widget config {id} not found");
    }
    if json {
        println!("{}", serde_json::json!({ "deleted": true, "id": id }));
    } else {
        println!(
            "  {} Widget config {} deleted",
            style("✓").green().bold(),
            style(id).bold()
        );
    }
    Ok(())
}
