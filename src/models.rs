use crate::categories::Category;
use crate::error::{Result, TreasurerError};

/// One statement line as handed over by the file reader, before any
/// classification. `row_id` is the 0-based data-row index in the source file
/// and identifies the row through every later stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row_id: usize,
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount_raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(TreasurerError::InvalidPeriod(format!(
                "month must be 1-12, got {month}"
            )));
        }
        if year < 2000 {
            return Err(TreasurerError::InvalidPeriod(format!(
                "year must be 2000 or later, got {year}"
            )));
        }
        Ok(Self { month, year })
    }

    /// `<prefix>_<year>_<MM>.<ext>`
    pub fn file_name(&self, prefix: &str, ext: &str) -> String {
        format!("{prefix}_{}_{:02}.{ext}", self.year, self.month)
    }
}

/// Reviewer-editable annotation fields. Empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub itemization_label: String,
    pub member_event_label: String,
    pub event_location: String,
    pub event_purpose: String,
    pub sponsor_name: String,
    pub needs_further_investigation: bool,
}

/// A classified, retained transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub row_id: usize,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub potential_sponsorship: bool,
    pub annotations: Annotations,
    pub period: Period,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1, 2000).is_ok());
        assert!(Period::new(12, 2025).is_ok());
        assert!(Period::new(0, 2025).is_err());
        assert!(Period::new(13, 2025).is_err());
        assert!(Period::new(6, 1999).is_err());
    }

    #[test]
    fn test_period_file_name_pads_month() {
        let p = Period::new(3, 2025).unwrap();
        assert_eq!(p.file_name("IRS_Summary", "csv"), "IRS_Summary_2025_03.csv");
        let p = Period::new(11, 2024).unwrap();
        assert_eq!(p.file_name("Itemized_Report", "txt"), "Itemized_Report_2024_11.txt");
    }
}
