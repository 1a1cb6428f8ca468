use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::classifier::ClassifierConfig;
use crate::cli::StatementArgs;
use crate::error::Result;
use crate::export::{render_itemized_text, write_all};
use crate::fmt::money;
use crate::importer::load_statement;
use crate::models::Period;
use crate::pipeline::{classify_batch, finalize, merge_review, pending_review};
use crate::reports::{build_itemized, summarize, Summary};
use crate::reviewer::ReviewSource;
use crate::settings::{load_settings, resolve_output_dir};

fn summary_table(summary: &Summary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["IRS Category", "Amount"]);
    for row in &summary.rows {
        table.add_row(vec![
            Cell::new(row.category.label()),
            Cell::new(money(row.total)),
        ]);
    }
    table.add_row(vec![Cell::new("Total".bold()), Cell::new(money(summary.total()))]);
    table
}

pub fn run(args: &StatementArgs, interactive: bool, review: Option<&str>) -> Result<()> {
    let period = Period::new(args.month, args.year)?;
    let settings = load_settings();
    let raw = load_statement(Path::new(&args.file))?;

    let mut rows = classify_batch(raw, period, &ClassifierConfig::default());
    let pending = pending_review(&rows);

    let source = match (interactive, review) {
        (true, _) => ReviewSource::Interactive,
        (false, Some(path)) => ReviewSource::Sheet(PathBuf::from(path)),
        (false, None) => ReviewSource::Skip,
    };
    if matches!(source, ReviewSource::Skip) && !pending.is_empty() {
        println!(
            "{}",
            format!(
                "{} transactions need review; keeping the suggested categories. \
                 Use --interactive or `treasurer pending` to review them.",
                pending.len()
            )
            .yellow()
        );
    }
    let edits = source.collect(&pending)?;
    merge_review(&mut rows, edits)?;

    let txns = finalize(rows);
    let summary = summarize(&txns, period);
    let report = build_itemized(&txns, &summary);

    println!(
        "Totals by IRS category ({}-{:02})\n{}",
        period.year,
        period.month,
        summary_table(&summary)
    );
    println!("\n{}", render_itemized_text(&report, &settings.organization_name));

    let dir = resolve_output_dir(&settings, args.output_dir.as_deref());
    for path in write_all(&dir, &txns, &summary, &report, &settings.organization_name)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
