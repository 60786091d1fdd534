//! Spreadsheet export of a yearly [`Report`].
//!
//! The workbook has two sheets: "Report" with one row per product and a
//! bold total row, and "Monthly" with the dense month-by-product sales grid.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tally_core::aggregate::Report;

const REPORT_HEADERS: [&str; 6] =
  ["Product", "Total", "APUS", "% of Sales", "Stock", "Remaining"];

/// MIME type of the bytes returned by [`workbook`].
pub const CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Suggested download name for the report of `year`.
pub fn file_name(year: i32) -> String { format!("sales-report-{year}.xlsx") }

/// Serialise `report` to `.xlsx` bytes.
pub fn workbook(report: &Report) -> Result<Vec<u8>, XlsxError> {
  let bold = Format::new().set_bold();
  let two_dp = Format::new().set_num_format("0.00");
  let one_dp = Format::new().set_num_format("0.0");

  let mut workbook = Workbook::new();

  let sheet = workbook.add_worksheet();
  sheet.set_name("Report")?;
  for (col, header) in REPORT_HEADERS.iter().enumerate() {
    sheet.write_string_with_format(0, col as u16, *header, &bold)?;
  }
  for (i, row) in report.rows.iter().enumerate() {
    let r = i as u32 + 1;
    sheet.write_string(r, 0, &row.product)?;
    sheet.write_number(r, 1, row.total as f64)?;
    sheet.write_number_with_format(r, 2, row.apus, &two_dp)?;
    sheet.write_number_with_format(r, 3, row.percent, &one_dp)?;
    if let Some(stock) = row.stock {
      sheet.write_number(r, 4, stock as f64)?;
    }
    sheet.write_number(r, 5, row.remaining as f64)?;
  }
  let total_row = report.rows.len() as u32 + 1;
  sheet.write_string_with_format(total_row, 0, "Total", &bold)?;
  sheet.write_number_with_format(total_row, 1, report.grand_total as f64, &bold)?;
  sheet.set_column_width(0, 20.0)?;

  let monthly = workbook.add_worksheet();
  monthly.set_name("Monthly")?;
  monthly.write_string_with_format(0, 0, "Month", &bold)?;
  for (col, series) in report.series.iter().enumerate() {
    monthly.write_string_with_format(0, col as u16 + 1, &series.product, &bold)?;
  }
  for (i, period) in report.periods.iter().enumerate() {
    let r = i as u32 + 1;
    monthly.write_string(r, 0, period.month_name())?;
    for (col, series) in report.series.iter().enumerate() {
      let sold = series.monthly.get(i).copied().unwrap_or(0);
      monthly.write_number(r, col as u16 + 1, sold as f64)?;
    }
  }
  monthly.set_column_width(0, 12.0)?;

  workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use tally_core::{
    fact::Fact,
    period::Period,
    product::Product,
    settings::LedgerSettings,
  };

  use super::*;

  #[test]
  fn writes_a_zip_container() {
    let bikes = Product {
      product_id: Default::default(),
      name:       "Bikes".into(),
      created_at: Utc::now(),
    };
    let facts = vec![Fact {
      product_id: bikes.product_id,
      product:    "Bikes".into(),
      period:     Period::new(2025, 1).unwrap(),
      sold:       130,
      stock:      Some(100),
      updated_at: Utc::now(),
    }];
    let report = Report::build(&[bikes], &facts, 2025, &LedgerSettings::default());

    let bytes = workbook(&report).unwrap();
    assert!(bytes.starts_with(b"PK"));
  }

  #[test]
  fn empty_report_still_exports() {
    let report = Report::build(&[], &[], 2025, &LedgerSettings::default());
    assert!(!workbook(&report).unwrap().is_empty());
    assert_eq!(file_name(2025), "sales-report-2025.xlsx");
  }
}
