//! Outlet directory over `outlet.csv`.
//!
//! Maps outlet codes to display names and lists the counterparties a
//! stock movement can name: the fixed suppliers first, then every other
//! outlet of the chain.

use std::path::{Path, PathBuf};

use till_core::error::Result;
use till_core::models::Outlet;
use tracing::debug;

use crate::store::{self, field};

/// Store file name inside the data directory.
pub const OUTLET_FILE: &str = "outlet.csv";

/// External counterparties offered for every movement, ahead of the
/// sister outlets.
pub const SUPPLIERS: [&str; 2] = ["MAIN WAREHOUSE", "GLOBAL DISTRIBUTOR A"];

/// Read access to the outlet store.
#[derive(Debug, Clone)]
pub struct OutletDirectory {
    path: PathBuf,
}

impl OutletDirectory {
    /// Directory over `outlet.csv` inside `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        OutletDirectory {
            path: data_dir.join(OUTLET_FILE),
        }
    }

    /// Path of the backing store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every outlet on file. Rows without a code are skipped.
    pub fn load(&self) -> Result<Vec<Outlet>> {
        let contents = store::read_store(&self.path)?;
        let mut outlets = Vec::new();
        for row in &contents.rows {
            if field(row, 0).is_empty() {
                debug!("Skipping outlet row without a code");
                continue;
            }
            outlets.push(Outlet {
                code: field(row, 0).to_string(),
                name: field(row, 1).to_string(),
            });
        }
        Ok(outlets)
    }

    /// The outlet with this code, matched case-insensitively.
    pub fn find(&self, code: &str) -> Result<Option<Outlet>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|outlet| outlet.code.eq_ignore_ascii_case(code)))
    }

    /// Display label for a code: `"C60 - Kuala Lumpur City Centre"` when
    /// the code is on file, the bare code otherwise.
    pub fn label_for(&self, code: &str) -> Result<String> {
        Ok(match self.find(code)? {
            Some(outlet) => outlet.label(),
            None => code.to_string(),
        })
    }

    /// Counterparties a movement at `home_code` can name: the fixed
    /// suppliers, then the labels of every other outlet.
    pub fn movement_counterparties(&self, home_code: &str) -> Result<Vec<String>> {
        let mut counterparties: Vec<String> = SUPPLIERS.iter().map(|s| s.to_string()).collect();
        for outlet in self.load()? {
            if outlet.code.eq_ignore_ascii_case(home_code) {
                continue;
            }
            counterparties.push(outlet.label());
        }
        Ok(counterparties)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn seed_store(dir: &TempDir) {
        let path = dir.path().join(OUTLET_FILE);
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "Code,Name").unwrap();
        writeln!(file, "C60,Kuala Lumpur City Centre").unwrap();
        writeln!(file, "C61,Penang Georgetown").unwrap();
        writeln!(file, "C62,Johor Bahru Mall").unwrap();
    }

    #[test]
    fn test_load_missing_store_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(OutletDirectory::new(dir.path()).load().unwrap().is_empty());
    }

    #[test]
    fn test_load_reads_all_outlets() {
        let dir = TempDir::new().unwrap();
        seed_store(&dir);

        let outlets = OutletDirectory::new(dir.path()).load().unwrap();
        assert_eq!(outlets.len(), 3);
        assert_eq!(outlets[0].code, "C60");
        assert_eq!(outlets[0].name, "Kuala Lumpur City Centre");
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        seed_store(&dir);
        let directory = OutletDirectory::new(dir.path());

        assert_eq!(directory.find("c61").unwrap().unwrap().code, "C61");
        assert!(directory.find("C99").unwrap().is_none());
    }

    #[test]
    fn test_label_for_known_and_unknown_codes() {
        let dir = TempDir::new().unwrap();
        seed_store(&dir);
        let directory = OutletDirectory::new(dir.path());

        assert_eq!(
            directory.label_for("C60").unwrap(),
            "C60 - Kuala Lumpur City Centre"
        );
        assert_eq!(directory.label_for("C99").unwrap(), "C99");
    }

    #[test]
    fn test_movement_counterparties_suppliers_first_home_excluded() {
        let dir = TempDir::new().unwrap();
        seed_store(&dir);

        let counterparties = OutletDirectory::new(dir.path())
            .movement_counterparties("C60")
            .unwrap();

        assert_eq!(
            counterparties,
            vec![
                "MAIN WAREHOUSE".to_string(),
                "GLOBAL DISTRIBUTOR A".to_string(),
                "C61 - Penang Georgetown".to_string(),
                "C62 - Johor Bahru Mall".to_string(),
            ]
        );
    }

    #[test]
    fn test_movement_counterparties_without_store_lists_suppliers() {
        let dir = TempDir::new().unwrap();
        let counterparties = OutletDirectory::new(dir.path())
            .movement_counterparties("C60")
            .unwrap();
        assert_eq!(counterparties, SUPPLIERS.map(str::to_string).to_vec());
    }
}
