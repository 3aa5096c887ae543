use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::json;

use stockroom_app::{ImportOptions, Settings, System, reports};
use stockroom_infra::AppConfig;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Print stockroom reports from the current backup", long_about = None)]
struct Cli {
    /// Report to print as JSON
    #[arg(value_enum, default_value_t = Report::Overview)]
    report: Report,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Report {
    /// Restock suggestions and the sales summary
    Overview,
    /// Every record with its levels and location
    Inventory,
    /// The whole movement ledger
    Movements,
    /// Records below their minimum
    Critical,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    stockroom_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let mut system = System::new(Settings::from(&config));

    if config.backup_path.exists() {
        let report = system
            .load(&config.backup_path, &ImportOptions::default())
            .with_context(|| format!("failed to load backup {}", config.backup_path.display()))?;
        tracing::info!(
            path = %config.backup_path.display(),
            records = report.records_added,
            movements = report.movements_added,
            "backup loaded"
        );
    } else {
        tracing::warn!(path = %config.backup_path.display(), "no backup found, starting empty");
    }

    let output = match cli.report {
        Report::Overview => json!({
            "restock_suggestions": system.inventory().restock_suggestions(),
            "sales_summary": reports::sales_summary(&system, None)?,
        }),
        Report::Inventory => serde_json::to_value(reports::inventory_rows(&system))?,
        Report::Movements => serde_json::to_value(reports::movement_rows(&system))?,
        Report::Critical => serde_json::to_value(reports::critical_stock_rows(&system))?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
