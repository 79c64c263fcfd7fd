//! Staff store over `employee.csv`.
//!
//! Holds one row per employee with id, display name, role and password.
//! Lookups are exact on the employee id; authentication folds "no such id"
//! and "wrong password" into the same error so a failed login does not
//! reveal which half was wrong.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use till_core::error::{Result, TillError};
use till_core::models::Employee;
use tracing::{debug, info};

use crate::store::{self, field};

/// Store file name inside the data directory.
pub const EMPLOYEE_FILE: &str = "employee.csv";

/// Header written when the store is created.
const HEADER: [&str; 4] = ["EmployeeID", "Name", "Role", "Password"];

/// Read and append access to the staff store.
#[derive(Debug, Clone)]
pub struct EmployeeStore {
    path: PathBuf,
}

impl EmployeeStore {
    /// Store over `employee.csv` inside `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        EmployeeStore {
            path: data_dir.join(EMPLOYEE_FILE),
        }
    }

    /// Path of the backing store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every employee on file. Rows without an id are skipped.
    pub fn load(&self) -> Result<Vec<Employee>> {
        let contents = store::read_store(&self.path)?;
        let mut employees = Vec::new();
        for row in &contents.rows {
            if field(row, 0).is_empty() {
                debug!("Skipping staff row without an employee id");
                continue;
            }
            employees.push(row_to_employee(row));
        }
        Ok(employees)
    }

    /// The employee with this exact id, if present.
    pub fn find(&self, employee_id: &str) -> Result<Option<Employee>> {
        let contents = store::read_store(&self.path)?;
        Ok(contents
            .rows
            .iter()
            .find(|row| field(row, 0) == employee_id)
            .map(row_to_employee))
    }

    /// Check an id/password pair against the store.
    ///
    /// Returns the matching [`Employee`] on success and
    /// [`TillError::InvalidCredentials`] otherwise.
    pub fn authenticate(&self, employee_id: &str, password: &str) -> Result<Employee> {
        match self.find(employee_id)? {
            Some(employee) if employee.password == password => Ok(employee),
            _ => Err(TillError::InvalidCredentials),
        }
    }

    /// Register a new employee, creating the store with its header if
    /// absent. Fails with [`TillError::DuplicateEmployee`] when the id is
    /// already on file.
    pub fn add(&self, employee: &Employee) -> Result<()> {
        if self.find(&employee.id)?.is_some() {
            return Err(TillError::DuplicateEmployee(employee.id.clone()));
        }

        let row = StringRecord::from(vec![
            employee.id.clone(),
            employee.name.clone(),
            employee.role.clone(),
            employee.password.clone(),
        ]);
        store::append_row(&self.path, &HEADER, &row)?;
        info!("Registered employee {} ({})", employee.id, employee.role);
        Ok(())
    }
}

fn row_to_employee(row: &StringRecord) -> Employee {
    Employee {
        id: field(row, 0).to_string(),
        name: field(row, 1).to_string(),
        role: field(row, 2).to_string(),
        password: field(row, 3).to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
