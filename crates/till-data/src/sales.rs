//! Sales log over `sales.csv`.
//!
//! New sales are appended in the seven-field shape with the minute-precise
//! timestamp as the leading field, which doubles as the sale's reference.
//! Older files may also hold an eight-field shape with a separate leading
//! reference, so every scan resolves its column positions per row.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use till_core::error::{Result, TillError};
use till_core::models::{PaymentMethod, SaleRecord};
use till_core::time_utils::SALE_TIMESTAMP_FORMAT;
use tracing::{debug, info};

use crate::store::{self, field};

/// Store file name inside the data directory.
pub const SALES_FILE: &str = "sales.csv";

/// Header written when the store is created.
const HEADER: [&str; 7] = [
    "Timestamp",
    "Customer",
    "Model",
    "Quantity",
    "Total",
    "PaymentMethod",
    "Staff",
];

/// Column positions of a sales row, resolved from its width.
struct Columns {
    customer: usize,
    model: usize,
    quantity: usize,
    total: usize,
    method: usize,
    staff: usize,
}

impl Columns {
    /// Seven fields put the timestamp first; eight fields carry a
    /// separate leading reference. Other widths are not sales rows.
    fn for_row(row: &StringRecord) -> Option<Columns> {
        match row.len() {
            7 => Some(Columns {
                customer: 1,
                model: 2,
                quantity: 3,
                total: 4,
                method: 5,
                staff: 6,
            }),
            8 => Some(Columns {
                customer: 2,
                model: 3,
                quantity: 4,
                total: 5,
                method: 6,
                staff: 7,
            }),
            _ => None,
        }
    }
}

/// Fields of a recorded sale that an edit may replace.
#[derive(Debug, Clone, Default)]
pub struct SaleEdit {
    pub customer: Option<String>,
    pub model: Option<String>,
    pub quantity: Option<u32>,
    pub total: Option<f64>,
    pub method: Option<PaymentMethod>,
    pub staff: Option<String>,
}

/// Append, search and edit access to the sales store.
#[derive(Debug, Clone)]
pub struct SalesLog {
    path: PathBuf,
}

impl SalesLog {
    /// Log over `sales.csv` inside `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        SalesLog {
            path: data_dir.join(SALES_FILE),
        }
    }

    /// Path of the backing store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every data row, header stripped. This is the aggregation input.
    pub fn load_raw(&self) -> Result<Vec<StringRecord>> {
        Ok(store::read_store(&self.path)?.rows)
    }

    /// Append a sale, creating the store with its header if absent.
    pub fn append(&self, sale: &SaleRecord) -> Result<()> {
        let row = StringRecord::from(vec![
            sale.timestamp.format(SALE_TIMESTAMP_FORMAT).to_string(),
            sale.customer.clone(),
            sale.model_id.clone(),
            sale.quantity.to_string(),
            format!("{:.2}", sale.total),
            sale.method.as_str().to_string(),
            sale.staff.clone(),
        ]);
        store::append_row(&self.path, &HEADER, &row)?;
        info!("Recorded sale {} for {}", sale.reference(), sale.customer);
        Ok(())
    }

    /// Rows whose customer field contains `fragment`, matched
    /// case-insensitively. Rows of unrecognised width never match.
    pub fn search(&self, fragment: &str) -> Result<Vec<StringRecord>> {
        let wanted = fragment.to_lowercase();
        Ok(self
            .load_raw()?
            .into_iter()
            .filter(|row| {
                Columns::for_row(row).is_some_and(|columns| {
                    field(row, columns.customer).to_lowercase().contains(&wanted)
                })
            })
            .collect())
    }

    /// Replace fields of the first row whose leading field equals
    /// `reference`, then rewrite the store.
    ///
    /// Only the fields present in `edit` change; everything else in the
    /// row, and every other row, is carried through as stored. Fails with
    /// [`TillError::SaleNotFound`] without writing when no row matches.
    pub fn edit(&self, reference: &str, edit: &SaleEdit) -> Result<()> {
        let contents = store::read_store(&self.path)?;
        let Some(header) = contents.header else {
            return Err(TillError::SaleNotFound(reference.to_string()));
        };

        let mut rows = contents.rows;
        let mut edited = false;

        for row in rows.iter_mut() {
            if field(row, 0) != reference {
                continue;
            }
            let Some(columns) = Columns::for_row(row) else {
                debug!("Reference {} matched a row of unknown shape", reference);
                continue;
            };

            let mut fields: Vec<String> = row.iter().map(str::to_string).collect();
            if let Some(customer) = &edit.customer {
                fields[columns.customer] = customer.clone();
            }
            if let Some(model) = &edit.model {
                fields[columns.model] = model.clone();
            }
            if let Some(quantity) = edit.quantity {
                fields[columns.quantity] = quantity.to_string();
            }
            if let Some(total) = edit.total {
                fields[columns.total] = format!("{:.2}", total);
            }
            if let Some(method) = edit.method {
                fields[columns.method] = method.as_str().to_string();
            }
            if let Some(staff) = &edit.staff {
                fields[columns.staff] = staff.clone();
            }

            *row = StringRecord::from(fields);
            edited = true;
            break;
        }

        if !edited {
            return Err(TillError::SaleNotFound(reference.to_string()));
        }

        store::write_store(&self.path, &header, &rows)?;
        info!("Edited sale {}", reference);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
