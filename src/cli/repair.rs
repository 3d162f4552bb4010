use crate::services::repair::{self, RepairSummary};
use crate::Config;
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;
    db.migrate()?;

    let summary = repair::repair_all(&db, config.content.slug_max_attempts)?;
    print_summary(&summary);
    summary.check()?;
    Ok(())
}

fn print_summary(summary: &RepairSummary) {
    println!("\n  Slug repair\n");
    println!(
        "  {:<10} {:>8} {:>8} {:>8} {:>11}",
        "Table", "Scanned", "Fixed", "Failed", "Unresolved"
    );
    println!("  {}", "-".repeat(49));

    for report in &summary.scopes {
        println!(
            "  {:<10} {:>8} {:>8} {:>8} {:>11}",
            report.scope.table(),
            report.scanned,
            report.fixes.len(),
            report.failures.len(),
            report.unresolved.len()
        );
    }

    for report in &summary.scopes {
        for fix in &report.fixes {
            println!(
                "  \x1b[32m✓\x1b[0m {} {} \"{}\" -> {} (was {})",
                report.scope,
                fix.id,
                fix.display,
                fix.new_slug,
                fix.old_slug
                    .as_deref()
                    .map(|s| format!("\"{}\"", s))
                    .unwrap_or_else(|| "null".to_string())
            );
        }
        for failure in &report.failures {
            println!(
                "  \x1b[31m✗\x1b[0m {} {}: {}",
                report.scope, failure.id, failure.error
            );
        }
    }

    println!();
    println!(
        "  Fixed {} of {} record(s).",
        summary.fixed(),
        summary.scanned()
    );

    if let Err(incomplete) = summary.check() {
        println!("  \x1b[31m{}\x1b[0m", incomplete);
        for report in &summary.scopes {
            for record in &report.unresolved {
                println!(
                    "    {} {}: \"{}\" -> slug: {:?}",
                    report.scope, record.id, record.display, record.slug
                );
            }
        }
    }
    println!();
}
