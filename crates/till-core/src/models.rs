use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::TillError;
use crate::time_utils::{SALE_TIMESTAMP_FORMAT, TIME_FORMAT};

/// How a customer settled a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    /// Stored and displayed as `E-wallet`.
    #[serde(rename = "e-wallet")]
    Ewallet,
}

impl PaymentMethod {
    /// The literal written into the sales store and shown on receipts.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Ewallet => "E-wallet",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = TillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "e-wallet" | "ewallet" => Ok(PaymentMethod::Ewallet),
            other => Err(TillError::Config(format!("unknown payment method: {other}"))),
        }
    }
}

/// Direction of a stock movement relative to the home outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    /// Goods arriving from a counterparty.
    In,
    /// Goods leaving for a counterparty.
    Out,
}

impl MovementDirection {
    /// The heading used on movement receipts.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::In => "Stock In",
            MovementDirection::Out => "Stock Out",
        }
    }
}

impl std::fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementDirection {
    type Err = TillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" | "stock in" => Ok(MovementDirection::In),
            "out" | "stock out" => Ok(MovementDirection::Out),
            other => Err(TillError::Config(format!("unknown movement direction: {other}"))),
        }
    }
}

/// A staff member as stored in `employee.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Login identifier, e.g. `E001`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form role string; `Manager` unlocks analytics and sale editing.
    pub role: String,
    /// Stored in clear; the store format predates any hashing scheme.
    pub password: String,
}

impl Employee {
    /// Whether this employee may open the manager-only views.
    pub fn is_manager(&self) -> bool {
        self.role.trim().eq_ignore_ascii_case("manager")
    }
}

/// The clock-out column of an attendance row.
///
/// Three literal markers all mean "still clocked in": `Active`, `00:00` and
/// `null`. Historical files mix them freely, so every reader must accept all
/// three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockOut {
    /// Session still open; written as `Active` on new rows.
    Open,
    /// Session closed at this wall-clock time.
    At(NaiveTime),
}

impl ClockOut {
    /// Parse the stored clock-out field. Returns `None` for a value that is
    /// neither an open marker nor a `HH:MM:SS` time.
    pub fn parse(field: &str) -> Option<ClockOut> {
        match field {
            "Active" | "00:00" | "null" => Some(ClockOut::Open),
            other => NaiveTime::parse_from_str(other, TIME_FORMAT)
                .ok()
                .map(ClockOut::At),
        }
    }

    /// The literal written back into the store.
    pub fn as_store_field(&self) -> String {
        match self {
            ClockOut::Open => "Active".to_string(),
            ClockOut::At(time) => time.format(TIME_FORMAT).to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ClockOut::Open)
    }
}

/// One row of `attendance.csv`.
///
/// An employee accumulates one row per shift; the row is created open on
/// clock-in and completed in place on clock-out. Rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub employee_name: String,
    /// Calendar date of the clock-in.
    pub date: NaiveDate,
    pub clock_in: NaiveTime,
    pub clock_out: ClockOut,
    /// Present only once the row is closed; written with two decimals.
    pub hours_worked: Option<f64>,
}

impl AttendanceRecord {
    /// A fresh open record as created by clock-in.
    pub fn open(employee_id: &str, employee_name: &str, date: NaiveDate, clock_in: NaiveTime) -> Self {
        AttendanceRecord {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            date,
            clock_in,
            clock_out: ClockOut::Open,
            hours_worked: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.clock_out.is_open()
    }
}

/// A completed sale as appended to `sales.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Minute-precision sale instant; doubles as the row's reference field.
    pub timestamp: NaiveDateTime,
    pub customer: String,
    pub model_id: String,
    pub quantity: u32,
    pub total: f64,
    pub method: PaymentMethod,
    pub staff: String,
}

impl SaleRecord {
    /// The reference string used to locate this row for search-and-edit.
    pub fn reference(&self) -> String {
        self.timestamp.format(SALE_TIMESTAMP_FORMAT).to_string()
    }
}

/// One row of the model store: a product with its price and the stock held
/// at each outlet, aligned with the header's outlet-code columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    pub model_id: String,
    pub price: f64,
    /// One quantity per outlet column, zero-padded to the header width.
    pub quantities: Vec<u32>,
}

/// A retail location from `outlet.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outlet {
    /// Short code, e.g. `C60`; also a column name in the model store.
    pub code: String,
    pub name: String,
}

impl Outlet {
    /// Display form used in movement counterparty lists, `C60 - Kuala
    /// Lumpur City Centre`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}

/// Canonicalise a model identifier for lookups.
///
/// Stores are hand-edited, so the same model appears as `a55`, `A55 ` and
/// `A55`. Comparisons go through this normalisation; the stored spelling is
/// preserved on write.
///
/// # Examples
///
/// ```
/// use till_core::models::normalize_model_id;
///
/// assert_eq!(normalize_model_id(" a55 "), "A55");
/// assert_eq!(normalize_model_id("A55"), "A55");
/// assert_eq!(normalize_model_id(""), "");
/// ```
pub fn normalize_model_id(model: &str) -> String {
    model.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // ── PaymentMethod ──────────────────────────────────────────────────────

    #[test]
    fn test_payment_method_display() {
        assert_eq!(PaymentMethod::Cash.to_string(), "Cash");
        assert_eq!(PaymentMethod::Card.to_string(), "Card");
        assert_eq!(PaymentMethod::Ewallet.to_string(), "E-wallet");
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!(PaymentMethod::from_str("cash").unwrap(), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::from_str("Card").unwrap(), PaymentMethod::Card);
        assert_eq!(
            PaymentMethod::from_str("E-wallet").unwrap(),
            PaymentMethod::Ewallet
        );
        assert_eq!(
            PaymentMethod::from_str("ewallet").unwrap(),
            PaymentMethod::Ewallet
        );
        assert!(PaymentMethod::from_str("cheque").is_err());
    }

    // ── MovementDirection ──────────────────────────────────────────────────

    #[test]
    fn test_movement_direction_display() {
        assert_eq!(MovementDirection::In.to_string(), "Stock In");
        assert_eq!(MovementDirection::Out.to_string(), "Stock Out");
    }

    #[test]
    fn test_movement_direction_from_str() {
        assert_eq!(
            MovementDirection::from_str("in").unwrap(),
            MovementDirection::In
        );
        assert_eq!(
            MovementDirection::from_str("Stock Out").unwrap(),
            MovementDirection::Out
        );
        assert!(MovementDirection::from_str("sideways").is_err());
    }

    // ── Employee ───────────────────────────────────────────────────────────

    #[test]
    fn test_employee_is_manager_case_insensitive() {
        let mut emp = Employee {
            id: "E001".to_string(),
            name: "Aini".to_string(),
            role: "manager".to_string(),
            password: "pw".to_string(),
        };
        assert!(emp.is_manager());
        emp.role = "MANAGER ".to_string();
        assert!(emp.is_manager());
        emp.role = "Part-time".to_string();
        assert!(!emp.is_manager());
    }

    // ── ClockOut ───────────────────────────────────────────────────────────

    #[test]
    fn test_clock_out_parse_open_sentinels() {
        assert_eq!(ClockOut::parse("Active"), Some(ClockOut::Open));
        assert_eq!(ClockOut::parse("00:00"), Some(ClockOut::Open));
        assert_eq!(ClockOut::parse("null"), Some(ClockOut::Open));
    }

    #[test]
    fn test_clock_out_parse_time() {
        let parsed = ClockOut::parse("17:30:00").unwrap();
        assert_eq!(
            parsed,
            ClockOut::At(NaiveTime::from_hms_opt(17, 30, 0).unwrap())
        );
        assert!(!parsed.is_open());
    }

    #[test]
    fn test_clock_out_parse_rejects_garbage() {
        assert_eq!(ClockOut::parse("yesterday"), None);
        // Sentinels are exact literals, not case-folded.
        assert_eq!(ClockOut::parse("ACTIVE"), None);
    }

    #[test]
    fn test_clock_out_store_field() {
        assert_eq!(ClockOut::Open.as_store_field(), "Active");
        let t = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(ClockOut::At(t).as_store_field(), "09:05:00");
    }

    // ── AttendanceRecord ───────────────────────────────────────────────────

    #[test]
    fn test_attendance_record_open_has_no_hours() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let rec = AttendanceRecord::open("E001", "Aini", date, time);
        assert!(rec.is_open());
        assert!(rec.hours_worked.is_none());
    }

    // ── SaleRecord ─────────────────────────────────────────────────────────

    #[test]
    fn test_sale_record_reference_is_minute_precision() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 15, 42)
            .unwrap();
        let sale = SaleRecord {
            timestamp: ts,
            customer: "Alice".to_string(),
            model_id: "M1".to_string(),
            quantity: 2,
            total: 100.0,
            method: PaymentMethod::Cash,
            staff: "Aini".to_string(),
        };
        // Seconds are dropped; the store keeps minute precision.
        assert_eq!(sale.reference(), "2024-03-01 10:15");
    }

    // ── Outlet ─────────────────────────────────────────────────────────────

    #[test]
    fn test_outlet_label() {
        let outlet = Outlet {
            code: "C60".to_string(),
            name: "Kuala Lumpur City Centre".to_string(),
        };
        assert_eq!(outlet.label(), "C60 - Kuala Lumpur City Centre");
    }

    // ── normalize_model_id ─────────────────────────────────────────────────

    #[test]
    fn test_normalize_model_id() {
        assert_eq!(normalize_model_id("a55"), "A55");
        assert_eq!(normalize_model_id("  Tab-S9 "), "TAB-S9");
        assert_eq!(normalize_model_id(""), "");
    }
}
