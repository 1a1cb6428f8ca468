use std::path::Path;

use crate::error::{Result, TreasurerError};
use crate::models::RawRow;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a numeric-like amount cell. Accepts `$`, thousands separators,
/// stray quotes and accounting-style parentheses for negatives.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => inner.trim().parse::<f64>().ok().map(|v| -v),
        None => s.parse::<f64>().ok(),
    };
    value.filter(|v| v.is_finite())
}

#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_date(serial: f64) -> String {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let Some(base) = chrono::NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return serial.to_string();
    };
    chrono::Duration::try_days(serial as i64)
        .and_then(|offset| base.checked_add_signed(offset))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| serial.to_string())
}

/// Column positions of the recognised headers.
#[derive(Debug, Default)]
struct Columns {
    date: Option<usize>,
    description: Option<usize>,
    amount: Option<usize>,
}

impl Columns {
    fn locate<'a>(headers: impl Iterator<Item = &'a str>) -> Self {
        let mut cols = Columns::default();
        for (i, h) in headers.enumerate() {
            match h.trim().to_lowercase().as_str() {
                "date" if cols.date.is_none() => cols.date = Some(i),
                "description" if cols.description.is_none() => cols.description = Some(i),
                "amount" if cols.amount.is_none() => cols.amount = Some(i),
                _ => {}
            }
        }
        cols
    }

    fn require(self) -> Result<(Option<usize>, usize, usize)> {
        let mut missing = Vec::new();
        if self.description.is_none() {
            missing.push("Description".to_string());
        }
        if self.amount.is_none() {
            missing.push("Amount".to_string());
        }
        match (self.description, self.amount) {
            (Some(d), Some(a)) => Ok((self.date, d, a)),
            _ => Err(TreasurerError::MissingColumns(missing)),
        }
    }
}

fn non_empty(cell: Option<&str>) -> Option<String> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Read a bank statement into raw rows. Fails as a whole on unreadable files
/// or missing required columns.
pub fn load_statement(file_path: &Path) -> Result<Vec<RawRow>> {
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let rows = match ext.as_str() {
        "csv" => parse_csv(file_path)?,
        #[cfg(feature = "xlsx")]
        "xlsx" | "xls" => parse_workbook(file_path)?,
        _ => return Err(TreasurerError::UnsupportedFile(file_path.display().to_string())),
    };
    tracing::info!(file = %file_path.display(), rows = rows.len(), "loaded statement");
    Ok(rows)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn parse_csv(file_path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(file_path)?;
    read_csv(std::io::BufReader::new(file))
}

pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let (date_idx, desc_idx, amount_idx) = Columns::locate(rdr.headers()?.iter()).require()?;

    let mut rows = Vec::new();
    for (row_id, result) in rdr.records().enumerate() {
        let record = result?;
        rows.push(RawRow {
            row_id,
            date: date_idx.and_then(|i| non_empty(record.get(i))),
            description: non_empty(record.get(desc_idx)),
            amount_raw: record.get(amount_idx).unwrap_or("").trim().to_string(),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Excel (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn parse_workbook(file_path: &Path) -> Result<Vec<RawRow>> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| TreasurerError::Xlsx(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TreasurerError::Xlsx("workbook has no sheets".into()))?
        .map_err(|e| TreasurerError::Xlsx(e.to_string()))?;
    read_sheet_range(&range)
}

/// Rows of the first worksheet. Date cells stored as serials (or typed as
/// dates) come back as `YYYY-MM-DD`.
#[cfg(feature = "xlsx")]
fn read_sheet_range(range: &calamine::Range<calamine::Data>) -> Result<Vec<RawRow>> {
    use calamine::Data;

    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Err(TreasurerError::MissingColumns(vec![
            "Description".into(),
            "Amount".into(),
        ]));
    };
    let header: Vec<String> = header.iter().map(|c| c.to_string()).collect();
    let (date_idx, desc_idx, amount_idx) =
        Columns::locate(header.iter().map(String::as_str)).require()?;

    let text = |cell: Option<&Data>| -> Option<String> {
        match cell? {
            Data::Empty => None,
            other => non_empty(Some(&other.to_string())),
        }
    };

    let mut rows = Vec::new();
    for (row_id, row) in sheet_rows.enumerate() {
        let date = date_idx.and_then(|i| match row.get(i) {
            Some(Data::DateTime(dt)) => Some(excel_serial_to_date(dt.as_f64())),
            Some(Data::Float(f)) => Some(excel_serial_to_date(*f)),
            Some(Data::Int(n)) => Some(excel_serial_to_date(*n as f64)),
            other => text(other),
        });
        rows.push(RawRow {
            row_id,
            date,
            description: text(row.get(desc_idx)),
            amount_raw: text(row.get(amount_idx)).unwrap_or_default(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("$45.00"), Some(45.0));
        assert_eq!(parse_amount("-42.50"), Some(-42.5));
        assert_eq!(parse_amount("(300.00)"), Some(-300.0));
        assert_eq!(parse_amount("\"12\""), Some(12.0));
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("(NaN)"), None);
        assert_eq!(parse_amount("(inf)"), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45658.0), "2025-01-01");
    }

    #[test]
    fn test_excel_serial_to_date_out_of_range() {
        assert_eq!(excel_serial_to_date(1e15), 1e15.to_string());
        assert_eq!(excel_serial_to_date(-1e15), (-1e15).to_string());
    }

    #[test]
    fn test_read_csv_assigns_row_ids() {
        let data = "Date,Description,Amount\n03/01/2025,AFFINIPAY MEMBERSHIP,45.00\n03/02/2025,,10\n,Random Vendor XYZ,-42.50\n";
        let rows = read_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].row_id, 0);
        assert_eq!(rows[0].description.as_deref(), Some("AFFINIPAY MEMBERSHIP"));
        assert_eq!(rows[1].description, None);
        assert_eq!(rows[2].row_id, 2);
        assert_eq!(rows[2].date, None);
        assert_eq!(rows[2].amount_raw, "-42.50");
    }

    #[test]
    fn test_read_csv_headers_case_insensitive_and_date_optional() {
        let data = " description , AMOUNT \nInterest,0.12\n";
        let rows = read_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, None);
        assert_eq!(rows[0].amount_raw, "0.12");
    }

    #[test]
    fn test_read_csv_missing_columns() {
        let err = read_csv("Date,Memo\n1/1/2025,x\n".as_bytes()).unwrap_err();
        match err {
            TreasurerError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Description".to_string(), "Amount".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = read_csv("Description\nx\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TreasurerError::MissingColumns(ref c) if c == &vec!["Amount".to_string()]
        ));
    }

    #[test]
    fn test_load_statement_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.pdf");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(
            load_statement(&path),
            Err(TreasurerError::UnsupportedFile(_))
        ));
    }

    #[test]
    fn test_load_statement_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("march.CSV");
        std::fs::write(&path, "Description,Amount\nStripe Transfer,5.00\n").unwrap();
        let rows = load_statement(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount_raw, "5.00");
    }

    #[cfg(feature = "xlsx")]
    fn sheet(cells: Vec<Vec<calamine::Data>>) -> calamine::Range<calamine::Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = calamine::Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_read_sheet_range_rows() {
        use calamine::{Data, ExcelDateTime, ExcelDateTimeType};

        let s = |v: &str| Data::String(v.to_string());
        let range = sheet(vec![
            vec![s("Date"), s("Description"), s("Amount")],
            vec![
                Data::DateTime(ExcelDateTime::new(45717.0, ExcelDateTimeType::DateTime, false)),
                s("AFFINIPAY MEMBERSHIP"),
                Data::Float(45.5),
            ],
            vec![Data::Float(45718.0), s("Stripe Transfer"), Data::Int(5)],
            vec![s("03/03/2025"), Data::Empty, s("(12.00)")],
            vec![Data::Empty, s("Bank fee"), Data::Empty],
        ]);

        let rows = read_sheet_range(&range).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.iter().map(|r| r.row_id).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(rows[0].date.as_deref(), Some("2025-03-01"));
        assert_eq!(rows[0].description.as_deref(), Some("AFFINIPAY MEMBERSHIP"));
        assert_eq!(parse_amount(&rows[0].amount_raw), Some(45.5));
        assert_eq!(rows[1].date.as_deref(), Some("2025-03-02"));
        assert_eq!(parse_amount(&rows[1].amount_raw), Some(5.0));
        assert_eq!(rows[2].date.as_deref(), Some("03/03/2025"));
        assert_eq!(rows[2].description, None);
        assert_eq!(parse_amount(&rows[2].amount_raw), Some(-12.0));
        assert_eq!(rows[3].date, None);
        assert_eq!(rows[3].amount_raw, "");
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_read_sheet_range_missing_amount() {
        use calamine::Data;

        let range = sheet(vec![
            vec![Data::String("Date".into()), Data::String("Description".into())],
            vec![Data::Float(45717.0), Data::String("Interest".into())],
        ]);
        let err = read_sheet_range(&range).unwrap_err();
        assert!(matches!(
            err,
            TreasurerError::MissingColumns(ref c) if c == &vec!["Amount".to_string()]
        ));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_load_statement_rejects_corrupt_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.xlsx");
        std::fs::write(&path, "Description,Amount\nnot a zip archive\n").unwrap();
        assert!(matches!(load_statement(&path), Err(TreasurerError::Xlsx(_))));
    }
}
