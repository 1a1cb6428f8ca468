//! Keyword and amount rules mapping one statement line to an IRS category.
//!
//! Rules are evaluated in order and the first match wins. Several predicates
//! overlap (interest, the sponsorship keywords, the fallbacks), so the order
//! of `RULES` is part of the behaviour and must not be rearranged.

use crate::categories::Category;

pub const STRIPE_SPLIT_THRESHOLD: f64 = 9.0;
pub const LARGE_SPONSOR_THRESHOLD: f64 = 500.0;

const BALANCE_EXCEPTIONS: &[&str] = &["deposit", "withdrawal", "paid from", "pos debit", "ach"];

const SPONSORSHIP_KEYWORDS: &[&str] = &[
    "sponsorship",
    "sponsor",
    "corp sponsor",
    "donation",
    "donor",
];

const PROFESSIONAL_FEE_KEYWORDS: &[&str] = &[
    "cooley",
    "legal",
    "attorney",
    "law firm",
    "cpa",
    "accounting",
    "bookkeeping",
    "consulting fee",
    "upwork",
    "quickbooks",
    "intuit",
];

const SAAS_KEYWORDS: &[&str] = &[
    "wild apricot",
    "wildapricot",
    "convertkit",
    "kit.com",
    "squarespace",
    "airtable.com",
    "airtable",
    "networksolutio",
    "network solutions",
    "apple.com",
];

const DONATED_AWARD_KEYWORDS: &[&str] = &["awards recognition", "maxter group"];

const CHAPTER_EVENT_KEYWORDS: &[&str] = &[
    "chapter event",
    "chapter dinner",
    "chapter lunch",
    "chapter meeting",
    "paypal *sam",
    "paypal sam",
];

const PROCESSOR_FEE_KEYWORDS: &[&str] = &[
    "authnet gateway",
    "bkcrd fees",
    "merchant fee",
    "cardconnect",
    "processing fee",
];

/// Thresholds used by the amount-based rules. Defaults are the treasurer's
/// fixed policy; tests may override them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    pub stripe_split_threshold: f64,
    pub large_sponsor_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            stripe_split_threshold: STRIPE_SPLIT_THRESHOLD,
            large_sponsor_threshold: LARGE_SPONSOR_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub category: Category,
    pub needs_review: bool,
    pub potential_sponsorship: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// Not a real transaction (balances, internal transfers). Excluded from
    /// everything downstream.
    Ignore,
    Categorized(Verdict),
}

impl Classification {
    fn category(category: Category) -> Self {
        Self::Categorized(Verdict {
            category,
            needs_review: false,
            potential_sponsorship: false,
        })
    }

    fn review(category: Category) -> Self {
        Self::Categorized(Verdict {
            category,
            needs_review: true,
            potential_sponsorship: false,
        })
    }

    fn sponsorship() -> Self {
        Self::Categorized(Verdict {
            category: Category::Contributions,
            needs_review: true,
            potential_sponsorship: true,
        })
    }
}

/// What a rule sees: the lowercased description and the parsed amount.
struct Line<'a> {
    desc: &'a str,
    amount: f64,
}

impl Line<'_> {
    fn has(&self, keyword: &str) -> bool {
        self.desc.contains(keyword)
    }

    fn has_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.desc.contains(k))
    }
}

struct Rule {
    name: &'static str,
    applies: fn(&Line, &ClassifierConfig) -> bool,
    outcome: fn(&Line, &ClassifierConfig) -> Classification,
}

static RULES: [Rule; 13] = [
    Rule {
        name: "hard_ignore",
        applies: |l, _| l.has("balance") && !l.has_any(BALANCE_EXCEPTIONS),
        outcome: |_, _| Classification::Ignore,
    },
    Rule {
        name: "internal_transfer",
        applies: |l, _| l.has("transfer") && l.has("savings"),
        outcome: |_, _| Classification::Ignore,
    },
    Rule {
        name: "affinipay_membership",
        applies: |l, _| l.has("affinipay") && l.amount > 0.0,
        outcome: |_, _| Classification::category(Category::MembershipFees),
    },
    Rule {
        name: "stripe_split",
        applies: |l, _| l.has("stripe transfer") && l.amount > 0.0,
        outcome: |l, cfg| {
            if l.amount.abs() < cfg.stripe_split_threshold {
                Classification::category(Category::ExemptActivityReceipts)
            } else {
                Classification::category(Category::MembershipFees)
            }
        },
    },
    Rule {
        name: "sponsorship_keyword",
        applies: |l, _| l.has_any(SPONSORSHIP_KEYWORDS),
        outcome: |_, _| Classification::sponsorship(),
    },
    Rule {
        name: "interest_income",
        applies: |l, _| l.has("interest") && l.amount > 0.0,
        outcome: |_, _| Classification::category(Category::InvestmentIncome),
    },
    Rule {
        name: "professional_fees",
        applies: |l, _| l.has_any(PROFESSIONAL_FEE_KEYWORDS),
        outcome: |_, _| Classification::category(Category::ProfessionalFees),
    },
    Rule {
        name: "saas_tools",
        applies: |l, _| l.has_any(SAAS_KEYWORDS),
        outcome: |_, _| Classification::category(Category::OtherExpenses),
    },
    Rule {
        name: "donated_awards",
        applies: |l, _| l.has_any(DONATED_AWARD_KEYWORDS),
        outcome: |_, _| Classification::category(Category::GrantsPaid),
    },
    Rule {
        name: "chapter_event",
        applies: |l, _| l.has_any(CHAPTER_EVENT_KEYWORDS),
        outcome: |_, _| Classification::review(Category::MemberDisbursements),
    },
    Rule {
        name: "processor_fees",
        applies: |l, _| l.has_any(PROCESSOR_FEE_KEYWORDS),
        outcome: |_, _| Classification::category(Category::OtherExpenses),
    },
    Rule {
        name: "interest_expense",
        applies: |l, _| l.has("interest") && l.amount < 0.0,
        outcome: |_, _| Classification::category(Category::InterestExpense),
    },
    Rule {
        name: "fallback",
        applies: |_, _| true,
        outcome: |l, cfg| {
            if l.amount > 0.0 && l.amount >= cfg.large_sponsor_threshold {
                Classification::sponsorship()
            } else if l.amount > 0.0 {
                Classification::review(Category::OtherRevenue)
            } else {
                Classification::review(Category::OtherExpenses)
            }
        },
    },
];

/// Classify one line. Total over all inputs; callers turn unparseable
/// amounts into `0.0` before calling.
pub fn classify(description: &str, amount: f64, config: &ClassifierConfig) -> Classification {
    let desc = description.to_lowercase();
    let line = Line {
        desc: &desc,
        amount: if amount.is_nan() { 0.0 } else { amount },
    };
    for rule in &RULES {
        if (rule.applies)(&line, config) {
            tracing::trace!(rule = rule.name, description, amount, "rule matched");
            return (rule.outcome)(&line, config);
        }
    }
    unreachable!("fallback rule always applies")
}
