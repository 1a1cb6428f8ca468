//! The human review round-trip: hand out the rows that need a decision,
//! collect the reviewer's versions back as `ReviewEdit`s.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use serde::{Deserialize, Serialize};

use crate::categories::{self, Category};
use crate::error::{Result, TreasurerError};
use crate::fmt::{amount, money};
use crate::models::{Annotations, Transaction};
use crate::pipeline::ReviewEdit;

/// Where reviewer decisions come from.
#[derive(Debug, Clone)]
pub enum ReviewSource {
    /// Accept the classifier's output as-is.
    Skip,
    /// An edited review sheet previously written by `write_sheet`.
    Sheet(PathBuf),
    /// Prompt on the terminal, one row at a time.
    Interactive,
}

impl ReviewSource {
    pub fn collect(&self, pending: &[Transaction]) -> Result<Vec<ReviewEdit>> {
        if pending.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Self::Skip => Ok(Vec::new()),
            Self::Sheet(path) => {
                let file = std::fs::File::open(path)?;
                read_sheet(std::io::BufReader::new(file))
            }
            Self::Interactive => prompt_all(pending),
        }
    }
}

// ---------------------------------------------------------------------------
// Review sheet (CSV round-trip)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SheetRecord {
    #[serde(rename = "Row ID")]
    row_id: usize,
    #[serde(rename = "Date", default)]
    date: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Amount", default)]
    amount: String,
    #[serde(rename = "IRS Category")]
    category: String,
    #[serde(rename = "Itemization Label", default)]
    itemization_label: String,
    #[serde(rename = "Member/Event Label", default)]
    member_event_label: String,
    #[serde(rename = "Event Location", default)]
    event_location: String,
    #[serde(rename = "Event Purpose", default)]
    event_purpose: String,
    #[serde(rename = "Sponsor Name", default)]
    sponsor_name: String,
    #[serde(rename = "Potential Sponsorship", default)]
    potential_sponsorship: String,
    #[serde(rename = "Needs Further Investigation", default)]
    needs_further_investigation: String,
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "x"
    )
}

pub fn write_sheet<W: Write>(out: W, pending: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for t in pending {
        let a = &t.annotations;
        wtr.serialize(SheetRecord {
            row_id: t.row_id,
            date: t.date.clone(),
            description: t.description.clone(),
            amount: amount(t.amount),
            category: t.category.label(),
            itemization_label: a.itemization_label.clone(),
            member_event_label: a.member_event_label.clone(),
            event_location: a.event_location.clone(),
            event_purpose: a.event_purpose.clone(),
            sponsor_name: a.sponsor_name.clone(),
            potential_sponsorship: t.potential_sponsorship.to_string(),
            needs_further_investigation: a.needs_further_investigation.to_string(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_sheet_file(path: &Path, pending: &[Transaction]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_sheet(std::io::BufWriter::new(file), pending)?;
    tracing::info!(path = %path.display(), rows = pending.len(), "wrote review sheet");
    Ok(())
}

/// Read an edited sheet. Potential Sponsorship is informational and ignored.
pub fn read_sheet<R: Read>(input: R) -> Result<Vec<ReviewEdit>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut edits = Vec::new();
    for result in rdr.deserialize::<SheetRecord>() {
        let rec = result?;
        let category = Category::parse(&rec.category)
            .ok_or_else(|| TreasurerError::UnknownCategory(rec.category.clone()))?;
        edits.push(ReviewEdit {
            row_id: rec.row_id,
            category,
            annotations: Annotations {
                itemization_label: rec.itemization_label,
                member_event_label: rec.member_event_label,
                event_location: rec.event_location,
                event_purpose: rec.event_purpose,
                sponsor_name: rec.sponsor_name,
                needs_further_investigation: parse_flag(&rec.needs_further_investigation),
            },
        });
    }
    Ok(edits)
}

// ---------------------------------------------------------------------------
// Interactive prompts
// ---------------------------------------------------------------------------

fn prompt_err(e: dialoguer::Error) -> TreasurerError {
    TreasurerError::Other(format!("Review prompt failed: {e}"))
}

/// Free-text annotation a reviewer is asked for after picking a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnnotationField {
    SponsorName,
    MemberEventLabel,
    EventLocation,
    EventPurpose,
    ItemizationLabel,
}

impl AnnotationField {
    fn prompt(self) -> &'static str {
        match self {
            Self::SponsorName => "Sponsor name",
            Self::MemberEventLabel => "Member/event label",
            Self::EventLocation => "Event location",
            Self::EventPurpose => "Event purpose",
            Self::ItemizationLabel => "Itemization label",
        }
    }

    fn slot(self, annotations: &mut Annotations) -> &mut String {
        match self {
            Self::SponsorName => &mut annotations.sponsor_name,
            Self::MemberEventLabel => &mut annotations.member_event_label,
            Self::EventLocation => &mut annotations.event_location,
            Self::EventPurpose => &mut annotations.event_purpose,
            Self::ItemizationLabel => &mut annotations.itemization_label,
        }
    }
}

/// Which annotations to ask for once `category` is chosen, in prompt order.
fn annotation_fields(category: Category) -> &'static [AnnotationField] {
    use AnnotationField::*;
    match category {
        Category::Contributions => &[SponsorName],
        Category::MemberDisbursements => &[MemberEventLabel, EventLocation, EventPurpose],
        c if c.requires_itemization() => &[ItemizationLabel],
        _ => &[],
    }
}

fn ask(prompt: &str, current: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map(|s| s.trim().to_string())
        .map_err(prompt_err)
}

fn prompt_one(txn: &Transaction, options: &[String]) -> Result<ReviewEdit> {
    println!("{}", "\u{2500}".repeat(60));
    println!("  Row:         {}", txn.row_id);
    println!("  Date:        {}", txn.date);
    println!("  Description: {}", txn.description);
    let amt_str = if txn.amount < 0.0 {
        money(txn.amount).red().to_string()
    } else {
        money(txn.amount).green().to_string()
    };
    println!("  Amount:      {amt_str}");
    println!("  Suggested:   {}", txn.category.label());
    if txn.potential_sponsorship {
        println!("  {}", "Potential sponsorship: record the sponsor name.".yellow());
    }
    println!();

    let default_idx = categories::ALL
        .iter()
        .position(|c| *c == txn.category)
        .unwrap_or(0);
    let choice = Select::new()
        .with_prompt("IRS category")
        .items(options)
        .default(default_idx)
        .interact()
        .map_err(prompt_err)?;
    let category = categories::ALL[choice];

    let mut annotations = txn.annotations.clone();
    for field in annotation_fields(category) {
        let slot = field.slot(&mut annotations);
        *slot = ask(field.prompt(), slot)?;
    }
    annotations.needs_further_investigation = Confirm::new()
        .with_prompt("Needs further investigation?")
        .default(annotations.needs_further_investigation)
        .interact()
        .map_err(prompt_err)?;

    Ok(ReviewEdit {
        row_id: txn.row_id,
        category,
        annotations,
    })
}

fn prompt_all(pending: &[Transaction]) -> Result<Vec<ReviewEdit>> {
    let options = categories::labels();
    println!("\n{} transactions to review\n", pending.len());
    let mut edits = Vec::with_capacity(pending.len());
    for txn in pending {
        let edit = prompt_one(txn, &options)?;
        println!("{}", format!("\u{2192} {}", edit.category.label()).green());
        println!();
        edits.push(edit);
    }
    println!("{}", "Review complete!".green());
    Ok(edits)
}
