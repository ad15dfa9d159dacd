use comfy_table::{Cell, Color, Table};
use serde::Serialize;

use crate::error::Result;
use crate::OutputFormat;
use flashgate_core::KvCacheType;

#[derive(Debug, Serialize)]
struct CacheTypeRecord {
    name: &'static str,
    quantized: bool,
    embedding_models: bool,
}

fn records() -> Vec<CacheTypeRecord> {
    KvCacheType::ALL
        .into_iter()
        .map(|cache_type| CacheTypeRecord {
            name: cache_type.as_str(),
            quantized: cache_type.is_quantized(),
            embedding_models: cache_type.allowed_for_embedding(),
        })
        .collect()
}

pub fn execute(format: OutputFormat) -> Result<()> {
    let records = records();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Plain => {
            for record in &records {
                println!("{}", record.name);
            }
        }
        OutputFormat::Table => print_table(&records),
    }

    Ok(())
}

fn print_table(records: &[CacheTypeRecord]) {
    let mut table = Table::new();
    table.set_header(vec!["Type", "Quantized", "Embedding models"]);

    for record in records {
        table.add_row(vec![
            Cell::new(record.name).fg(Color::Cyan),
            yes_no_cell(record.quantized),
            yes_no_cell(record.embedding_models),
        ]);
    }

    println!("{}", table);
    println!();
    println!("Quantized cache types are only applied when flash attention is enabled.");
}

fn yes_no_cell(value: bool) -> Cell {
    if value {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::DarkGrey)
    }
}
