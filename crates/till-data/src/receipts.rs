//! Printable receipt documents and their day files.
//!
//! Each business day gets one text file per document kind:
//! `SalesReceipts_<date>.txt` and `StockMovements_<date>.txt`. Sales
//! receipts are separated by a dashed divider framed with blank lines,
//! which is only written when the file already holds a receipt. Movement
//! entries carry their own `=` frame, so the file just keeps a blank line
//! between entries.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use till_core::error::{Result, TillError};
use till_core::formatting::{format_currency, format_units};
use till_core::models::{MovementDirection, PaymentMethod};
use till_core::time_utils::{DATE_FORMAT, SALE_TIMESTAMP_FORMAT, STAMP_FORMAT};
use tracing::debug;

/// Width of every divider and frame line.
const DIVIDER_WIDTH: usize = 60;

// ── Documents ─────────────────────────────────────────────────────────────────

/// A customer-facing receipt for one completed sale.
#[derive(Debug, Clone)]
pub struct SaleReceipt {
    pub outlet_label: String,
    pub timestamp: NaiveDateTime,
    pub customer: String,
    pub model_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
    pub method: PaymentMethod,
    pub staff: String,
}

impl SaleReceipt {
    /// Render the receipt as a text block without a trailing newline.
    pub fn render(&self) -> String {
        let rule = "-".repeat(DIVIDER_WIDTH);
        let mut lines = Vec::new();
        lines.push("TILLPOINT SALES RECEIPT".to_string());
        lines.push(self.outlet_label.clone());
        lines.push(rule.clone());
        lines.push(format!(
            "Date/Time  : {}",
            self.timestamp.format(SALE_TIMESTAMP_FORMAT)
        ));
        lines.push(format!("Customer   : {}", self.customer));
        lines.push(format!("Model      : {}", self.model_id));
        lines.push(format!("Quantity   : {}", format_units(self.quantity)));
        lines.push(format!("Unit Price : {}", format_currency(self.unit_price)));
        lines.push(format!("Total      : {}", format_currency(self.total)));
        lines.push(format!("Payment    : {}", self.method));
        lines.push(format!("Served by  : {}", self.staff));
        lines.push(rule);
        lines.push("Thank you for your purchase!".to_string());
        lines.join("\n")
    }
}

/// One applied line of a stock movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementLine {
    pub model_id: String,
    pub quantity: u32,
    /// Units the outlet holds after the adjustment.
    pub balance: u32,
}

/// A record of one stock movement batch, framed for the day file.
#[derive(Debug, Clone)]
pub struct MovementReceipt {
    pub direction: MovementDirection,
    pub outlet_label: String,
    pub counterparty: String,
    pub timestamp: NaiveDateTime,
    pub staff: String,
    pub lines: Vec<MovementLine>,
}

impl MovementReceipt {
    /// Render the entry as a text block without a trailing newline. The
    /// `=` frame belongs to the entry itself.
    pub fn render(&self) -> String {
        let frame = "=".repeat(DIVIDER_WIDTH);
        let rule = "-".repeat(DIVIDER_WIDTH);
        let sign = match self.direction {
            MovementDirection::In => '+',
            MovementDirection::Out => '-',
        };

        let mut lines = Vec::new();
        lines.push(frame.clone());
        lines.push(format!("{} at {}", self.direction, self.outlet_label));
        lines.push(format!("Partner : {}", self.counterparty));
        lines.push(format!("Date    : {}", self.timestamp.format(STAMP_FORMAT)));
        lines.push(format!("Staff   : {}", self.staff));
        lines.push(rule);
        for line in &self.lines {
            lines.push(format!(
                "{:<12} {}{:<6} now {}",
                line.model_id, sign, line.quantity, line.balance
            ));
        }
        lines.push(frame);
        lines.join("\n")
    }
}

// ── Day files ─────────────────────────────────────────────────────────────────

/// Path of the sales receipt file for the receipt's business day.
pub fn sales_receipt_path(data_dir: &Path, timestamp: NaiveDateTime) -> PathBuf {
    data_dir.join(format!(
        "SalesReceipts_{}.txt",
        timestamp.date().format(DATE_FORMAT)
    ))
}

/// Path of the stock movement file for the entry's business day.
pub fn movement_receipt_path(data_dir: &Path, timestamp: NaiveDateTime) -> PathBuf {
    data_dir.join(format!(
        "StockMovements_{}.txt",
        timestamp.date().format(DATE_FORMAT)
    ))
}

/// Append a rendered sale receipt to its day file.
///
/// When the file already holds content, a dashed divider framed by blank
/// lines goes in first, so receipts in one file stay visually separated.
/// Returns the path written.
pub fn append_sale_receipt(data_dir: &Path, receipt: &SaleReceipt) -> Result<PathBuf> {
    let path = sales_receipt_path(data_dir, receipt.timestamp);
    let has_content = std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);

    let mut file = open_for_append(&path)?;
    if has_content {
        write_text(&mut file, &path, &format!("\n{}\n\n", "-".repeat(DIVIDER_WIDTH)))?;
    }
    write_text(&mut file, &path, &receipt.render())?;
    write_text(&mut file, &path, "\n")?;

    debug!("Appended sale receipt to {}", path.display());
    Ok(path)
}

/// Append a rendered movement entry to its day file. Entries are framed
/// by their own `=` lines; a blank line keeps neighbours apart. Returns
/// the path written.
pub fn append_movement_receipt(data_dir: &Path, receipt: &MovementReceipt) -> Result<PathBuf> {
    let path = movement_receipt_path(data_dir, receipt.timestamp);
    let has_content = std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);

    let mut file = open_for_append(&path)?;
    if has_content {
        write_text(&mut file, &path, "\n")?;
    }
    write_text(&mut file, &path, &receipt.render())?;
    write_text(&mut file, &path, "\n")?;

    debug!("Appended movement entry to {}", path.display());
    Ok(path)
}

fn open_for_append(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| TillError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
}

fn write_text(file: &mut std::fs::File, path: &Path, text: &str) -> Result<()> {
    file.write_all(text.as_bytes())
        .map_err(|e| TillError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn stamp(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample_sale_receipt() -> SaleReceipt {
        SaleReceipt {
            outlet_label: "C60 - Kuala Lumpur City Centre".to_string(),
            timestamp: stamp(14, 30),
            customer: "Walk-in".to_string(),
            model_id: "A55".to_string(),
            quantity: 2,
            unit_price: 1199.0,
            total: 2398.0,
            method: PaymentMethod::Cash,
            staff: "E001".to_string(),
        }
    }

    fn sample_movement_receipt() -> MovementReceipt {
        MovementReceipt {
            direction: MovementDirection::In,
            outlet_label: "C60 - Kuala Lumpur City Centre".to_string(),
            counterparty: "MAIN WAREHOUSE".to_string(),
            timestamp: stamp(9, 0),
            staff: "E001".to_string(),
            lines: vec![
                MovementLine {
                    model_id: "A55".to_string(),
                    quantity: 5,
                    balance: 17,
                },
                MovementLine {
                    model_id: "S24".to_string(),
                    quantity: 2,
                    balance: 5,
                },
            ],
        }
    }

    // ── render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_sale_receipt_render_contents() {
        let text = sample_sale_receipt().render();
        assert!(text.contains("TILLPOINT SALES RECEIPT"));
        assert!(text.contains("C60 - Kuala Lumpur City Centre"));
        assert!(text.contains("Date/Time  : 2024-03-15 14:30"));
        assert!(text.contains("Quantity   : 2 units"));
        assert!(text.contains("Unit Price : RM1,199.00"));
        assert!(text.contains("Total      : RM2,398.00"));
        assert!(text.contains("Payment    : Cash"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_movement_receipt_render_is_framed() {
        let text = sample_movement_receipt().render();
        let frame = "=".repeat(60);
        assert!(text.starts_with(&frame));
        assert!(text.ends_with(&frame));
        assert!(text.contains("Stock In at C60 - Kuala Lumpur City Centre"));
        assert!(text.contains("Partner : MAIN WAREHOUSE"));
        assert!(text.contains("Date    : 2024-03-15 09:00:00"));
        assert!(text.contains("+5"));
        assert!(text.contains("now 17"));
    }

    #[test]
    fn test_movement_receipt_render_out_uses_minus() {
        let mut receipt = sample_movement_receipt();
        receipt.direction = MovementDirection::Out;
        let text = receipt.render();
        assert!(text.contains("Stock Out at"));
        assert!(text.contains("-5"));
    }

    // ── day files ─────────────────────────────────────────────────────────────

    #[test]
    fn test_first_sale_receipt_has_no_divider() {
        let dir = TempDir::new().unwrap();
        let receipt = sample_sale_receipt();

        let path = append_sale_receipt(dir.path(), &receipt).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "SalesReceipts_2024-03-15.txt"
        );

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{}\n", receipt.render()));
    }

    #[test]
    fn test_second_sale_receipt_divided_by_dashes_and_blank_lines() {
        let dir = TempDir::new().unwrap();
        let receipt = sample_sale_receipt();

        append_sale_receipt(dir.path(), &receipt).unwrap();
        let path = append_sale_receipt(dir.path(), &receipt).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let divider = format!("\n\n{}\n\n", "-".repeat(60));
        assert!(text.contains(&divider));
        assert_eq!(text.matches("TILLPOINT SALES RECEIPT").count(), 2);
    }

    #[test]
    fn test_sale_receipts_split_by_day() {
        let dir = TempDir::new().unwrap();
        let mut receipt = sample_sale_receipt();
        append_sale_receipt(dir.path(), &receipt).unwrap();

        receipt.timestamp = NaiveDate::from_ymd_opt(2024, 3, 16)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let second = append_sale_receipt(dir.path(), &receipt).unwrap();

        assert!(dir.path().join("SalesReceipts_2024-03-15.txt").exists());
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "SalesReceipts_2024-03-16.txt"
        );
        // A fresh day file holds a single receipt and no divider.
        let text = std::fs::read_to_string(&second).unwrap();
        assert_eq!(text, format!("{}\n", receipt.render()));
    }

    #[test]
    fn test_movement_entries_keep_one_blank_line_between() {
        let dir = TempDir::new().unwrap();
        let receipt = sample_movement_receipt();

        append_movement_receipt(dir.path(), &receipt).unwrap();
        let path = append_movement_receipt(dir.path(), &receipt).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "StockMovements_2024-03-15.txt"
        );
        let text = std::fs::read_to_string(&path).unwrap();
        let frame = "=".repeat(60);
        // End of one entry, one blank line, start of the next.
        assert!(text.contains(&format!("{}\n\n{}", frame, frame)));
    }
}
