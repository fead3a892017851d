//! # CSV Export
//!
//! Renders report tables to CSV in memory. Fields are always double-quoted
//! and the header row matches the visible table columns; the download
//! filename is `<report-name>-<ISO-date>.csv`.

use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use thiserror::Error;

use crate::money::Money;
use crate::types::{MarketCredit, Sale};

/// CSV rendering errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV render failed: {0}")]
    Render(String),
}

/// Download filename for a report: `<report-name>-<ISO-date>.csv`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use khata_core::export::export_filename;
///
/// let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
/// assert_eq!(export_filename("sales-report", date), "sales-report-2026-08-30.csv");
/// ```
pub fn export_filename(report_name: &str, date: NaiveDate) -> String {
    format!("{}-{}.csv", report_name, date.format("%Y-%m-%d"))
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Render(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Render(e.to_string()))
}

fn quoted_writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new())
}

/// Renders the sales table.
pub fn sales_csv(sales: &[Sale]) -> Result<String, ExportError> {
    let mut writer = quoted_writer();

    writer.write_record([
        "Date",
        "Customer",
        "Phone",
        "Product",
        "Quantity",
        "Unit Price",
        "Total",
        "Paid",
        "Credit",
        "Payment Method",
    ])?;

    for sale in sales {
        writer.write_record([
            sale.created_at.format("%Y-%m-%d %H:%M").to_string(),
            sale.customer_name.clone(),
            sale.customer_phone.clone(),
            sale.product_name.clone(),
            sale.quantity.to_string(),
            Money::from_paise(sale.unit_price_paise).to_string(),
            sale.total().to_string(),
            sale.paid().to_string(),
            sale.credit().to_string(),
            sale.payment_method.label().to_string(),
        ])?;
    }

    finish(writer)
}

/// Renders the market-credit book.
pub fn market_credits_csv(credits: &[MarketCredit]) -> Result<String, ExportError> {
    let mut writer = quoted_writer();

    writer.write_record([
        "Date",
        "Customer",
        "Phone",
        "Amount",
        "Collected",
        "Outstanding",
        "Status",
        "Description",
    ])?;

    for credit in credits {
        writer.write_record([
            credit.created_at.format("%Y-%m-%d").to_string(),
            credit.customer_name.clone(),
            credit.customer_phone.clone(),
            Money::from_paise(credit.amount_paise).to_string(),
            Money::from_paise(credit.collected_paise).to_string(),
            credit.outstanding().to_string(),
            format!("{:?}", credit.status).to_lowercase(),
            credit.description.clone(),
        ])?;
    }

    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(
            export_filename("pending-payments", date),
            "pending-payments-2026-08-30.csv"
        );
    }

    #[test]
    fn test_sales_csv_quotes_every_field() {
        let sale = Sale {
            id: "s-1".to_string(),
            product_id: "p-1".to_string(),
            product_name: "Sunflower Oil 1L".to_string(),
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            quantity: 3,
            unit_price_paise: 10000,
            total_paise: 30000,
            paid_paise: 30000,
            credit_paise: 0,
            payment_method: PaymentMethod::Cash,
            recorded_by: "staff-1".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        };

        let csv = sales_csv(&[sale]).unwrap();
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("\"Date\",\"Customer\""));

        let row = lines.next().unwrap();
        assert!(row.contains("\"2026-03-01 09:30\""));
        assert!(row.contains("\"Sunflower Oil 1L\""));
        assert!(row.contains("\"₹300.00\""));
        assert!(row.contains("\"cash\""));
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let csv = sales_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
