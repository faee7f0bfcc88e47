//! `parley services`: show the service picker entries.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use parley_types::config::DEFAULT_SERVICE_KEY;
use parley_types::llm::Delivery;

use crate::state::AppState;

/// Print the services map the widget receives from `get_available_services`.
pub fn list_services(state: &AppState, json: bool) -> Result<()> {
    let registry = state.router.service().providers();
    let services = registry.available_services();

    if json {
        println!("{}", serde_json::to_string_pretty(&services)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key").fg(Color::White),
        Cell::new("Label").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Mode").fg(Color::White),
    ]);

    for (key, label) in &services {
        let (model, mode) = if key == DEFAULT_SERVICE_KEY {
            let target = registry.default_key().unwrap_or("(unset)");
            (format!("-> {target}"), String::new())
        } else {
            match registry.get(key) {
                Some(provider) => (
                    provider.model().to_string(),
                    match provider.delivery() {
                        Delivery::Buffered => "buffered".to_string(),
                        Delivery::Streaming => "streaming".to_string(),
                    },
                ),
                None => (String::new(), String::new()),
            }
        };
        table.add_row(vec![
            Cell::new(key).fg(Color::Cyan),
            Cell::new(label),
            Cell::new(model),
            Cell::new(mode),
        ]);
    }

    println!();
    println!("{table}");
    if registry.list_names().is_empty() {
        println!();
        println!(
            "  {} No providers configured. Add a {} table to config.toml.",
            style("i").blue().bold(),
            style("[providers.openai]").yellow()
        );
    }
    println!();
    Ok(())
}
