//! Batch classification: raw statement rows in, final transactions out.
//!
//! `row_id` from the file reader is carried on every row so reviewer edits
//! can be merged back by identity, whatever order the reviewer returns them
//! in.

use std::collections::HashMap;

use crate::categories::Category;
use crate::classifier::{classify, Classification, ClassifierConfig};
use crate::error::{Result, TreasurerError};
use crate::importer::parse_amount;
use crate::models::{Annotations, Period, RawRow, Transaction};

pub const JOURNAL_SUBSCRIPTIONS_LABEL: &str = "Journal subscriptions";

/// A transaction plus the transient review flag. The flag never leaves
/// this stage: `finalize` strips it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub txn: Transaction,
    pub needs_review: bool,
}

/// A reviewer's version of one row. Every editable field is carried; the
/// merge overwrites the pipeline's values with these.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEdit {
    pub row_id: usize,
    pub category: Category,
    pub annotations: Annotations,
}

fn is_stripe_micro_transfer(desc_lower: &str, amount: f64, config: &ClassifierConfig) -> bool {
    desc_lower.contains("stripe transfer")
        && amount > 0.0
        && amount.abs() < config.stripe_split_threshold
}

/// Steps 1-7: filter, default, classify, apply the Stripe auto-rule and
/// force review on itemized categories.
pub fn classify_batch(
    raw: Vec<RawRow>,
    period: Period,
    config: &ClassifierConfig,
) -> Vec<ClassifiedRow> {
    let total = raw.len();
    let mut rows = Vec::with_capacity(total);
    let mut ignored = 0usize;

    for row in raw {
        let Some(description) = row.description.filter(|d| !d.trim().is_empty()) else {
            tracing::debug!(row_id = row.row_id, "dropping row without description");
            continue;
        };
        let desc_lower = description.to_lowercase();
        if desc_lower.contains("balance") {
            tracing::debug!(row_id = row.row_id, %description, "dropping balance row");
            continue;
        }

        let amount = parse_amount(&row.amount_raw).unwrap_or_else(|| {
            tracing::warn!(
                row_id = row.row_id,
                amount = %row.amount_raw,
                "unparseable amount, treating as 0.00"
            );
            0.0
        });

        let verdict = match classify(&description, amount, config) {
            Classification::Ignore => {
                ignored += 1;
                continue;
            }
            Classification::Categorized(v) => v,
        };

        let mut txn = Transaction {
            row_id: row.row_id,
            date: row.date.unwrap_or_default(),
            description,
            amount,
            category: verdict.category,
            potential_sponsorship: verdict.potential_sponsorship,
            annotations: Annotations::default(),
            period,
        };
        let mut needs_review = verdict.needs_review;

        if is_stripe_micro_transfer(&desc_lower, amount, config) {
            txn.category = Category::ExemptActivityReceipts;
            if txn.annotations.itemization_label.trim().is_empty() {
                txn.annotations.itemization_label = JOURNAL_SUBSCRIPTIONS_LABEL.to_string();
            }
            needs_review = false;
        } else if txn.category.requires_itemization() {
            needs_review = true;
        }

        rows.push(ClassifiedRow { txn, needs_review });
    }

    tracing::info!(
        total,
        retained = rows.len(),
        ignored,
        pending_review = rows.iter().filter(|r| r.needs_review).count(),
        "classified batch"
    );
    rows
}

pub fn pending_review(rows: &[ClassifiedRow]) -> Vec<Transaction> {
    rows.iter()
        .filter(|r| r.needs_review)
        .map(|r| r.txn.clone())
        .collect()
}

/// Step 8: merge reviewer edits by row identity. An edit naming a row the
/// batch does not contain is an input error and nothing is applied.
pub fn merge_review(rows: &mut [ClassifiedRow], edits: Vec<ReviewEdit>) -> Result<usize> {
    let index: HashMap<usize, usize> = rows
        .iter()
        .enumerate()
        .map(|(pos, r)| (r.txn.row_id, pos))
        .collect();
    if let Some(bad) = edits.iter().find(|e| !index.contains_key(&e.row_id)) {
        return Err(TreasurerError::UnknownRow(bad.row_id));
    }

    let mut changed = 0usize;
    for edit in edits {
        let row = &mut rows[index[&edit.row_id]];
        if row.txn.category != edit.category || row.txn.annotations != edit.annotations {
            changed += 1;
        }
        row.txn.category = edit.category;
        row.txn.annotations = edit.annotations;
    }
    tracing::info!(changed, "merged review edits");
    Ok(changed)
}

/// Step 9: drop the transient review flag.
pub fn finalize(rows: Vec<ClassifiedRow>) -> Vec<Transaction> {
    rows.into_iter().map(|r| r.txn).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(row_id: usize, desc: &str, amount: &str) -> RawRow {
        RawRow {
            row_id,
            date: Some("03/01/2025".into()),
            description: Some(desc.into()),
            amount_raw: amount.into(),
        }
    }

    fn period() -> Period {
        Period::new(3, 2025).unwrap()
    }

    fn run(rows: Vec<RawRow>) -> Vec<ClassifiedRow> {
        classify_batch(rows, period(), &ClassifierConfig::default())
    }

    #[test]
    fn test_drops_missing_description_and_balance_rows() {
        let mut blank = raw(0, "", "10");
        blank.description = None;
        let rows = run(vec![
            blank,
            raw(1, "   ", "10"),
            raw(2, "BALANCE AS OF 3/1", "1000"),
            raw(3, "Deposit - balance transfer bonus", "25"),
            raw(4, "AFFINIPAY MEMBERSHIP", "45.00"),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].txn.row_id, 4);
    }

    #[test]
    fn test_ignored_rows_are_dropped() {
        let rows = run(vec![raw(0, "Transfer to Savings", "-100"), raw(1, "COOLEY LLP", "-900")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].txn.category, Category::ProfessionalFees);
    }

    #[test]
    fn test_defaults_and_period_attached() {
        let rows = run(vec![raw(0, "AFFINIPAY MEMBERSHIP", "45.00")]);
        let r = &rows[0];
        assert_eq!(r.txn.category, Category::MembershipFees);
        assert!(!r.needs_review);
        assert_eq!(r.txn.annotations, Annotations::default());
        assert_eq!(r.txn.period, period());
        assert_eq!(r.txn.date, "03/01/2025");
    }

    #[test]
    fn test_non_finite_amounts_become_zero() {
        let rows = run(vec![
            raw(0, "Mystery credit", "(nan)"),
            raw(1, "Mystery debit", "(inf)"),
            raw(2, "COOLEY LLP", "-900"),
        ]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].txn.amount, 0.0);
        assert_eq!(rows[1].txn.amount, 0.0);

        let summary = crate::reports::summarize(&finalize(rows), period());
        assert!(summary.total().is_finite());
        assert_eq!(summary.total(), -900.0);
    }

    #[test]
    fn test_stripe_micro_transfer_auto_labelled_without_review() {
        let rows = run(vec![raw(0, "Stripe Transfer", "5.00")]);
        let r = &rows[0];
        assert_eq!(r.txn.category, Category::ExemptActivityReceipts);
        assert_eq!(r.txn.annotations.itemization_label, JOURNAL_SUBSCRIPTIONS_LABEL);
        assert!(!r.needs_review);
    }

    #[test]
    fn test_stripe_membership_transfer_not_forced_to_review() {
        let rows = run(vec![raw(0, "Stripe Transfer", "9.00")]);
        assert_eq!(rows[0].txn.category, Category::MembershipFees);
        assert!(!rows[0].needs_review);
        assert!(rows[0].txn.annotations.itemization_label.is_empty());
    }

    #[test]
    fn test_itemized_categories_forced_to_review() {
        let rows = run(vec![
            raw(0, "SQUARESPACE INC", "-23.00"),
            raw(1, "MAXTER GROUP", "-300"),
            raw(2, "COOLEY LLP", "-900"),
        ]);
        assert!(rows[0].needs_review);
        assert!(rows[1].needs_review);
        assert!(!rows[2].needs_review);
    }

    #[test]
    fn test_unparseable_amount_becomes_zero() {
        let rows = run(vec![raw(0, "Mystery", "twelve dollars"), raw(1, "Interest", "0.10")]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].txn.amount, 0.0);
        assert_eq!(rows[0].txn.category, Category::OtherExpenses);
        assert!(rows[0].needs_review);
        assert_eq!(rows[1].txn.category, Category::InvestmentIncome);
    }

    #[test]
    fn test_sponsorship_row_flags() {
        let rows = run(vec![raw(0, "Corporate Sponsor ABC", "1500.00")]);
        assert_eq!(rows[0].txn.category, Category::Contributions);
        assert!(rows[0].needs_review);
        assert!(rows[0].txn.potential_sponsorship);
    }

    #[test]
    fn test_pending_review_subset() {
        let rows = run(vec![
            raw(0, "AFFINIPAY MEMBERSHIP", "45"),
            raw(1, "Random Vendor XYZ", "-42.50"),
        ]);
        let pending = pending_review(&rows);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].row_id, 1);
    }

    #[test]
    fn test_merge_by_row_identity_not_position() {
        let mut rows = run(vec![
            raw(3, "Corporate Sponsor ABC", "1500.00"),
            raw(7, "Random Vendor XYZ", "-42.50"),
        ]);
        let edits = vec![
            ReviewEdit {
                row_id: 7,
                category: Category::FundraisingExpenses,
                annotations: Annotations {
                    needs_further_investigation: true,
                    ..Annotations::default()
                },
            },
            ReviewEdit {
                row_id: 3,
                category: Category::Contributions,
                annotations: Annotations {
                    sponsor_name: "Boeing".into(),
                    ..Annotations::default()
                },
            },
        ];
        let changed = merge_review(&mut rows, edits).unwrap();
        assert_eq!(changed, 2);
        assert_eq!(rows[0].txn.annotations.sponsor_name, "Boeing");
        assert_eq!(rows[1].txn.category, Category::FundraisingExpenses);
        assert!(rows[1].txn.annotations.needs_further_investigation);
    }

    #[test]
    fn test_merge_unknown_row_is_rejected() {
        let mut rows = run(vec![raw(0, "Random Vendor XYZ", "-42.50")]);
        let before = rows.clone();
        let err = merge_review(
            &mut rows,
            vec![ReviewEdit {
                row_id: 99,
                category: Category::OtherExpenses,
                annotations: Annotations::default(),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, TreasurerError::UnknownRow(99)));
        assert_eq!(rows, before);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let input = vec![
            raw(0, "AFFINIPAY MEMBERSHIP", "45.00"),
            raw(1, "Stripe Transfer", "5.00"),
            raw(2, "Random Vendor XYZ", "-42.50"),
            raw(3, "BALANCE AS OF 3/1", "1000"),
        ];
        let first = finalize(run(input.clone()));
        let second = finalize(run(input));
        assert_eq!(first, second);
    }
}
