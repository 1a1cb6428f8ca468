use std::collections::BTreeMap;

use crate::categories::{self, Category, CategoryKind};
use crate::models::{Period, Transaction};

pub const UNLABELED: &str = "UNLABELED";

fn is_nonzero(total: f64) -> bool {
    (total * 100.0).round() != 0.0
}

// ---------------------------------------------------------------------------
// Category summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub category: Category,
    pub total: f64,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
    pub period: Period,
}

impl Summary {
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.total).sum()
    }

    pub fn total_for(&self, category: Category) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.total)
    }
}

/// Sum amounts per category. Rows come out ordered by the code as a string
/// ("1", "14", "15", ..., "2", "22", ...), matching the treasurer's existing
/// summary files.
pub fn summarize(txns: &[Transaction], period: Period) -> Summary {
    let mut totals: BTreeMap<&'static str, (Category, f64)> = BTreeMap::new();
    for t in txns {
        totals.entry(t.category.code()).or_insert((t.category, 0.0)).1 += t.amount;
    }
    let rows = totals
        .into_values()
        .map(|(category, total)| SummaryRow {
            category,
            total,
            period,
        })
        .collect();
    Summary { rows, period }
}

// ---------------------------------------------------------------------------
// Itemized report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemizedGroup {
    pub key: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventLine {
    pub date: String,
    pub label: String,
    pub location: String,
    pub purpose: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Breakdown {
    BySponsor(Vec<ItemizedGroup>),
    ByLabel(Vec<ItemizedGroup>),
    Events(Vec<EventLine>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemizedSection {
    pub category: Category,
    pub breakdown: Breakdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestigationRollup {
    pub count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemizedReport {
    pub period: Period,
    pub revenue: Vec<CategoryTotal>,
    pub expenses: Vec<CategoryTotal>,
    pub sections: Vec<ItemizedSection>,
    pub investigation: InvestigationRollup,
}

impl ItemizedReport {
    pub fn total_revenue(&self) -> f64 {
        self.revenue.iter().map(|c| c.total).sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|c| c.total).sum()
    }
}

fn group_sums(keys: impl Iterator<Item = (String, f64)>) -> Vec<ItemizedGroup> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for (key, amount) in keys {
        *sums.entry(key).or_default() += amount;
    }
    sums.into_iter()
        .map(|(key, total)| ItemizedGroup { key, total })
        .collect()
}

fn breakdown_for(category: Category, rows: &[&Transaction]) -> Option<Breakdown> {
    match category {
        Category::Contributions => {
            let sponsored: Vec<(String, f64)> = rows
                .iter()
                .filter(|t| !t.annotations.sponsor_name.trim().is_empty())
                .map(|t| (t.annotations.sponsor_name.trim().to_string(), t.amount))
                .collect();
            if sponsored.is_empty() {
                return None;
            }
            Some(Breakdown::BySponsor(group_sums(sponsored.into_iter())))
        }
        Category::MemberDisbursements => {
            let has_data = rows.iter().any(|t| {
                let a = &t.annotations;
                !a.member_event_label.trim().is_empty()
                    || !a.event_location.trim().is_empty()
                    || !a.event_purpose.trim().is_empty()
            });
            if !has_data {
                return None;
            }
            let events = rows
                .iter()
                .map(|t| EventLine {
                    date: t.date.clone(),
                    label: t.annotations.member_event_label.trim().to_string(),
                    location: t.annotations.event_location.trim().to_string(),
                    purpose: t.annotations.event_purpose.trim().to_string(),
                    amount: t.amount,
                })
                .collect();
            Some(Breakdown::Events(events))
        }
        c if c.requires_itemization() => {
            if rows
                .iter()
                .all(|t| t.annotations.itemization_label.trim().is_empty())
            {
                return None;
            }
            let labelled = rows.iter().map(|t| {
                let label = t.annotations.itemization_label.trim();
                let key = if label.is_empty() { UNLABELED } else { label };
                (key.to_string(), t.amount)
            });
            Some(Breakdown::ByLabel(group_sums(labelled)))
        }
        _ => None,
    }
}

/// Category 1 plus every category that requires itemization, in registry
/// order.
fn itemized_categories() -> impl Iterator<Item = Category> {
    categories::ALL
        .into_iter()
        .filter(|c| *c == Category::Contributions || c.requires_itemization())
}

pub fn build_itemized(txns: &[Transaction], summary: &Summary) -> ItemizedReport {
    let mut revenue = Vec::new();
    let mut expenses = Vec::new();
    for category in categories::ALL {
        let Some(total) = summary.total_for(category) else {
            continue;
        };
        if !is_nonzero(total) {
            continue;
        }
        let line = CategoryTotal { category, total };
        match category.kind() {
            CategoryKind::Revenue => revenue.push(line),
            CategoryKind::Expense => expenses.push(line),
        }
    }

    let sections = itemized_categories()
        .filter_map(|category| {
            let rows: Vec<&Transaction> = txns.iter().filter(|t| t.category == category).collect();
            if rows.is_empty() {
                return None;
            }
            breakdown_for(category, &rows).map(|breakdown| ItemizedSection {
                category,
                breakdown,
            })
        })
        .collect();

    let flagged: Vec<&Transaction> = txns
        .iter()
        .filter(|t| t.annotations.needs_further_investigation)
        .collect();
    let investigation = InvestigationRollup {
        count: flagged.len(),
        total: flagged.iter().map(|t| t.amount).sum(),
    };

    ItemizedReport {
        period: summary.period,
        revenue,
        expenses,
        sections,
        investigation,
    }
}
