use chrono::{DateTime, Utc};
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::services::RetentionSweeper;

pub async fn migrate(ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    ctx.database.migrate().await?;
    output_success(output_format, "Migrations applied", None)
}

pub async fn sweep(ctx: &Context, at: Option<&str>, output_format: OutputFormat) -> anyhow::Result<()> {
    let now = match at {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map_err(|e| anyhow::anyhow!("Invalid --at timestamp '{}': {}", value, e))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let sweeper = RetentionSweeper::new(ctx.state.stores.clone(), &ctx.config.retention);
    let report = sweeper.sweep_at(now).await;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "sweep": report }))?);
        }
        OutputFormat::Text => {
            println!("Sweep {} at {} (threshold {})", report.run_id, report.ran_at, report.threshold);
            println!("{:<15} {:>8}", "TYPE", "PURGED");
            println!("{}", "-".repeat(24));
            let mut purged: Vec<_> = report.purged.iter().collect();
            purged.sort_by_key(|(kind, _)| kind.label());
            for (kind, count) in purged {
                println!("{:<15} {:>8}", kind.label(), count);
            }
            for (kind, error) in &report.failures {
                eprintln!("FAILED {}: {}", kind.label(), error);
            }
            println!("Total purged: {}", report.total());
        }
    }

    if !report.is_clean() {
        return Err(anyhow::anyhow!("{} content types failed to purge", report.failures.len()));
    }
    Ok(())
}
