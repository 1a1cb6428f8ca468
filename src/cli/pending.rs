use std::path::Path;

use colored::Colorize;

use crate::classifier::ClassifierConfig;
use crate::cli::StatementArgs;
use crate::error::Result;
use crate::importer::load_statement;
use crate::models::Period;
use crate::pipeline::{classify_batch, pending_review};
use crate::reviewer::write_sheet_file;
use crate::settings::{load_settings, resolve_output_dir};

pub fn run(args: &StatementArgs) -> Result<()> {
    let period = Period::new(args.month, args.year)?;
    let raw = load_statement(Path::new(&args.file))?;
    let rows = classify_batch(raw, period, &ClassifierConfig::default());
    let pending = pending_review(&rows);

    if pending.is_empty() {
        println!("{}", "No transactions need review.".green());
        return Ok(());
    }

    let dir = resolve_output_dir(&load_settings(), args.output_dir.as_deref());
    let path = dir.join(period.file_name("Review", "csv"));
    write_sheet_file(&path, &pending)?;
    println!(
        "{} transactions need review. Edit {} and pass it to `treasurer classify --review`.",
        pending.len(),
        path.display()
    );
    Ok(())
}
