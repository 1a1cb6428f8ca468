//! The fixed IRS category registry.
//!
//! Every other module takes its codes, labels and revenue/expense split from
//! here. Labels are only combined into `"<code> - <description>"` strings at
//! output boundaries.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Revenue,
    Expense,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Contributions,
    MembershipFees,
    InvestmentIncome,
    UnrelatedBusinessIncome,
    GovernmentServices,
    OtherRevenue,
    ExemptActivityReceipts,
    FundraisingExpenses,
    GrantsPaid,
    MemberDisbursements,
    SalariesAndWages,
    InterestExpense,
    ProfessionalFees,
    OtherExpenses,
}

/// Registry order. Also the order of dropdowns and report sections.
pub const ALL: [Category; 14] = [
    Category::Contributions,
    Category::MembershipFees,
    Category::InvestmentIncome,
    Category::UnrelatedBusinessIncome,
    Category::GovernmentServices,
    Category::OtherRevenue,
    Category::ExemptActivityReceipts,
    Category::FundraisingExpenses,
    Category::GrantsPaid,
    Category::MemberDisbursements,
    Category::SalariesAndWages,
    Category::InterestExpense,
    Category::ProfessionalFees,
    Category::OtherExpenses,
];

impl Category {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Contributions => "1",
            Self::MembershipFees => "2",
            Self::InvestmentIncome => "3",
            Self::UnrelatedBusinessIncome => "4",
            Self::GovernmentServices => "6",
            Self::OtherRevenue => "7",
            Self::ExemptActivityReceipts => "9",
            Self::FundraisingExpenses => "14",
            Self::GrantsPaid => "15",
            Self::MemberDisbursements => "16",
            Self::SalariesAndWages => "18",
            Self::InterestExpense => "19",
            Self::ProfessionalFees => "22",
            Self::OtherExpenses => "23",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Contributions => "Gifts, grants, contributions received",
            Self::MembershipFees => "Membership fees received",
            Self::InvestmentIncome => "Gross investment income",
            Self::UnrelatedBusinessIncome => "Net unrelated business income",
            Self::GovernmentServices => "Value of services/facilities furnished by government",
            Self::OtherRevenue => "Other revenue",
            Self::ExemptActivityReceipts => {
                "Gross receipts from activities related to exempt purpose"
            }
            Self::FundraisingExpenses => "Fundraising expenses",
            Self::GrantsPaid => "Contributions, gifts, grants paid out",
            Self::MemberDisbursements => "Disbursements to/for members",
            Self::SalariesAndWages => "Other salaries and wages",
            Self::InterestExpense => "Interest expense",
            Self::ProfessionalFees => "Professional fees",
            Self::OtherExpenses => "Other expenses not classified above",
        }
    }

    /// Canonical `"<code> - <description>"` label.
    pub fn label(&self) -> String {
        format!("{} - {}", self.code(), self.description())
    }

    pub fn kind(&self) -> CategoryKind {
        match self {
            Self::Contributions
            | Self::MembershipFees
            | Self::InvestmentIncome
            | Self::UnrelatedBusinessIncome
            | Self::GovernmentServices
            | Self::OtherRevenue
            | Self::ExemptActivityReceipts => CategoryKind::Revenue,
            _ => CategoryKind::Expense,
        }
    }

    /// Categories whose rows always go through review and get an itemized
    /// breakdown in the report.
    pub fn requires_itemization(&self) -> bool {
        matches!(
            self,
            Self::OtherRevenue
                | Self::ExemptActivityReceipts
                | Self::GrantsPaid
                | Self::MemberDisbursements
                | Self::OtherExpenses
        )
    }

    pub fn from_code(code: &str) -> Option<Category> {
        let code = code.trim();
        ALL.iter().find(|c| c.code() == code).copied()
    }

    /// Accepts either a full label or a bare code. Only the leading code
    /// token is significant.
    pub fn parse(value: &str) -> Option<Category> {
        let value = value.trim();
        let code = value.split(" - ").next().unwrap_or(value);
        Self::from_code(code)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.description())
    }
}

pub fn labels() -> Vec<String> {
    ALL.iter().map(|c| c.label()).collect()
}
