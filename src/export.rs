use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::fmt::amount;
use crate::models::Transaction;
use crate::reports::{Breakdown, ItemizedReport, Summary};

// ---------------------------------------------------------------------------
// Record shapes (column order is the serialization order)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CategorizedRecord<'a> {
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "IRS Category")]
    category: String,
    #[serde(rename = "Itemization Label")]
    itemization_label: &'a str,
    #[serde(rename = "Member/Event Label")]
    member_event_label: &'a str,
    #[serde(rename = "Event Location")]
    event_location: &'a str,
    #[serde(rename = "Event Purpose")]
    event_purpose: &'a str,
    #[serde(rename = "Sponsor Name")]
    sponsor_name: &'a str,
    #[serde(rename = "Potential Sponsorship")]
    potential_sponsorship: bool,
    #[serde(rename = "Needs Further Investigation")]
    needs_further_investigation: bool,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "Year")]
    year: i32,
}

#[derive(Serialize)]
struct SummaryRecord {
    #[serde(rename = "IRS Category")]
    category: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "Year")]
    year: i32,
}

#[derive(Serialize)]
struct ActivityRecord<'a> {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "IRS Category Code")]
    code: &'static str,
    #[serde(rename = "IRS Category Label")]
    label: &'static str,
    #[serde(rename = "Itemization Label")]
    itemization_label: &'a str,
    #[serde(rename = "Member/Event Label")]
    member_event_label: &'a str,
    #[serde(rename = "Event Location")]
    event_location: &'a str,
    #[serde(rename = "Event Purpose")]
    event_purpose: &'a str,
    #[serde(rename = "Sponsor Name")]
    sponsor_name: &'a str,
    #[serde(rename = "Potential Sponsorship")]
    potential_sponsorship: bool,
    #[serde(rename = "Needs Further Investigation")]
    needs_further_investigation: bool,
}

#[derive(Serialize)]
struct ItemizedRecord<'a> {
    #[serde(rename = "Section")]
    section: &'a str,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Key")]
    key: &'a str,
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Location")]
    location: &'a str,
    #[serde(rename = "Purpose")]
    purpose: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
}

// ---------------------------------------------------------------------------
// CSV writers
// ---------------------------------------------------------------------------

pub fn write_categorized<W: Write>(out: W, txns: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for t in txns {
        let a = &t.annotations;
        wtr.serialize(CategorizedRecord {
            date: &t.date,
            description: &t.description,
            amount: amount(t.amount),
            category: t.category.label(),
            itemization_label: &a.itemization_label,
            member_event_label: &a.member_event_label,
            event_location: &a.event_location,
            event_purpose: &a.event_purpose,
            sponsor_name: &a.sponsor_name,
            potential_sponsorship: t.potential_sponsorship,
            needs_further_investigation: a.needs_further_investigation,
            month: t.period.month,
            year: t.period.year,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary<W: Write>(out: W, summary: &Summary) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for row in &summary.rows {
        wtr.serialize(SummaryRecord {
            category: row.category.label(),
            amount: amount(row.total),
            month: row.period.month,
            year: row.period.year,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Flat monthly-activity export: one row per transaction, category split
/// into code and description.
pub fn write_monthly_activity<W: Write>(out: W, txns: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for t in txns {
        let a = &t.annotations;
        wtr.serialize(ActivityRecord {
            year: t.period.year,
            month: t.period.month,
            date: &t.date,
            description: &t.description,
            amount: amount(t.amount),
            code: t.category.code(),
            label: t.category.description(),
            itemization_label: &a.itemization_label,
            member_event_label: &a.member_event_label,
            event_location: &a.event_location,
            event_purpose: &a.event_purpose,
            sponsor_name: &a.sponsor_name,
            potential_sponsorship: t.potential_sponsorship,
            needs_further_investigation: a.needs_further_investigation,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_itemized_csv<W: Write>(out: W, report: &ItemizedReport) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let total_row = |section, c: &crate::reports::CategoryTotal| ItemizedRecord {
        section,
        category: c.category.label(),
        key: "",
        date: "",
        location: "",
        purpose: "",
        amount: amount(c.total),
    };
    for c in &report.revenue {
        wtr.serialize(total_row("Revenue", c))?;
    }
    for c in &report.expenses {
        wtr.serialize(total_row("Expense", c))?;
    }
    for section in &report.sections {
        let category = section.category.label();
        match &section.breakdown {
            Breakdown::BySponsor(groups) | Breakdown::ByLabel(groups) => {
                let name = match section.breakdown {
                    Breakdown::BySponsor(_) => "Sponsor",
                    _ => "Itemized",
                };
                for g in groups {
                    wtr.serialize(ItemizedRecord {
                        section: name,
                        category: category.clone(),
                        key: &g.key,
                        date: "",
                        location: "",
                        purpose: "",
                        amount: amount(g.total),
                    })?;
                }
            }
            Breakdown::Events(events) => {
                for e in events {
                    wtr.serialize(ItemizedRecord {
                        section: "Event",
                        category: category.clone(),
                        key: &e.label,
                        date: &e.date,
                        location: &e.location,
                        purpose: &e.purpose,
                        amount: amount(e.amount),
                    })?;
                }
            }
        }
    }
    let count = report.investigation.count.to_string();
    wtr.serialize(ItemizedRecord {
        section: "Flagged for investigation",
        category: String::new(),
        key: &count,
        date: "",
        location: "",
        purpose: "",
        amount: amount(report.investigation.total),
    })?;
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

fn blank_as_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

pub fn render_itemized_text(report: &ItemizedReport, organization: &str) -> String {
    let mut out = String::new();
    if !organization.is_empty() {
        out.push_str(organization);
        out.push('\n');
    }
    out.push_str(&format!(
        "IRS Itemized Report: {}-{:02}\n",
        report.period.year, report.period.month
    ));

    out.push_str("\nREVENUE\n");
    for c in &report.revenue {
        out.push_str(&format!("  {}: {}\n", c.category.label(), amount(c.total)));
    }
    out.push_str(&format!("  Total revenue: {}\n", amount(report.total_revenue())));

    out.push_str("\nEXPENSES\n");
    for c in &report.expenses {
        out.push_str(&format!("  {}: {}\n", c.category.label(), amount(c.total)));
    }
    out.push_str(&format!("  Total expenses: {}\n", amount(report.total_expenses())));

    for section in &report.sections {
        let how = match section.breakdown {
            Breakdown::BySponsor(_) => "by sponsor",
            Breakdown::ByLabel(_) => "by label",
            Breakdown::Events(_) => "individual events",
        };
        out.push_str(&format!("\nITEMIZED: {} ({how})\n", section.category.label()));
        match &section.breakdown {
            Breakdown::BySponsor(groups) | Breakdown::ByLabel(groups) => {
                for g in groups {
                    out.push_str(&format!("  {}: {}\n", g.key, amount(g.total)));
                }
            }
            Breakdown::Events(events) => {
                for e in events {
                    out.push_str(&format!(
                        "  {} | {} | {} | {} | {}\n",
                        blank_as_dash(&e.date),
                        blank_as_dash(&e.label),
                        blank_as_dash(&e.location),
                        blank_as_dash(&e.purpose),
                        amount(e.amount)
                    ));
                }
            }
        }
    }

    out.push_str("\nFLAGGED FOR INVESTIGATION\n");
    out.push_str(&format!("  Count: {}\n", report.investigation.count));
    out.push_str(&format!("  Net total: {}\n", amount(report.investigation.total)));
    out
}

// ---------------------------------------------------------------------------
// Writing the period's files
// ---------------------------------------------------------------------------

fn create(dir: &Path, name: String) -> Result<(PathBuf, std::io::BufWriter<std::fs::File>)> {
    let path = dir.join(name);
    let file = std::fs::File::create(&path)?;
    Ok((path, std::io::BufWriter::new(file)))
}

/// Write every period-scoped export into `dir`. Returns the paths written.
pub fn write_all(
    dir: &Path,
    txns: &[Transaction],
    summary: &Summary,
    report: &ItemizedReport,
    organization: &str,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let period = summary.period;
    let mut written = Vec::new();

    let (path, out) = create(dir, period.file_name("Categorized_Transactions", "csv"))?;
    write_categorized(out, txns)?;
    written.push(path);

    let (path, out) = create(dir, period.file_name("IRS_Summary", "csv"))?;
    write_summary(out, summary)?;
    written.push(path);

    let (path, out) = create(dir, period.file_name("Monthly_Activity", "csv"))?;
    write_monthly_activity(out, txns)?;
    written.push(path);

    let path = dir.join(period.file_name("Itemized_Report", "txt"));
    std::fs::write(&path, render_itemized_text(report, organization))?;
    written.push(path);

    let (path, out) = create(dir, period.file_name("Itemized_Report", "csv"))?;
    write_itemized_csv(out, report)?;
    written.push(path);

    for p in &written {
        tracing::info!(path = %p.display(), "wrote export");
    }
    Ok(written)
}
