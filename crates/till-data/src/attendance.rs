//! Attendance session reconciliation over `attendance.csv`.
//!
//! A clock-in appends an open row; a clock-out re-scans the whole store,
//! closes the matching open row in place and computes the hours worked.
//! The file is the only source of session state: "is this employee clocked
//! in" is always answered by scanning, never by an in-memory table.

use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, NaiveTime};
use csv::StringRecord;
use till_core::error::{Result, TillError};
use till_core::formatting::format_hours;
use till_core::models::{AttendanceRecord, ClockOut};
use till_core::time_utils::{
    minutes_to_hours, parse_date, parse_time, shift_minutes, DATE_FORMAT, TIME_FORMAT,
};
use tracing::{debug, info, warn};

use crate::store::{self, field};

/// Store file name inside the data directory.
pub const ATTENDANCE_FILE: &str = "attendance.csv";

/// Header written when the store is created.
const HEADER: [&str; 6] = [
    "EmployeeID",
    "Name",
    "Date",
    "ClockIn",
    "ClockOut",
    "HoursWorked",
];

// Row layout: 0 employee id, 1 name, 2 date, 3 clock-in, 4 clock-out,
// 5 hours worked (only present once closed).

/// Append-and-reconcile access to the attendance store.
#[derive(Debug, Clone)]
pub struct AttendanceLedger {
    path: PathBuf,
}

impl AttendanceLedger {
    /// Ledger over `attendance.csv` inside `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        AttendanceLedger {
            path: data_dir.join(ATTENDANCE_FILE),
        }
    }

    /// Path of the backing store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ── Clock-in ──────────────────────────────────────────────────────────

    /// Open a session for `employee_id` at `now`.
    ///
    /// Fails with [`TillError::AlreadyClockedIn`] when the store already
    /// holds an open row for this employee. On success the open row is
    /// appended (the store is created with its header first if absent) and
    /// the clock-in instant is returned for display.
    pub fn clock_in(
        &self,
        employee_id: &str,
        employee_name: &str,
        now: NaiveDateTime,
    ) -> Result<NaiveDateTime> {
        if self.open_session(employee_id)?.is_some() {
            return Err(TillError::AlreadyClockedIn(employee_id.to_string()));
        }

        let row = StringRecord::from(vec![
            employee_id.to_string(),
            employee_name.to_string(),
            now.date().format(DATE_FORMAT).to_string(),
            now.time().format(TIME_FORMAT).to_string(),
            ClockOut::Open.as_store_field(),
        ]);
        store::append_row(&self.path, &HEADER, &row)?;

        info!("Clock-in recorded for {} at {}", employee_id, now);
        Ok(now)
    }

    // ── Clock-out ─────────────────────────────────────────────────────────

    /// Close the open session(s) for `employee_id` at `clock_out_time` and
    /// return the hours worked.
    ///
    /// Scans every row of the store. A row closes when its employee id
    /// matches and its clock-out field is still an open marker; the stored
    /// date is combined with `clock_out_time`, adding 24 hours when the
    /// close lands numerically before the open (a shift over midnight).
    /// Hours are elapsed whole minutes divided by 60.
    ///
    /// Rows that match but cannot be parsed are carried through unchanged
    /// and the scan continues. When nothing closes, the store is left
    /// untouched and [`TillError::NoOpenSession`] is returned.
    pub fn clock_out(&self, employee_id: &str, clock_out_time: NaiveTime) -> Result<f64> {
        let contents = store::read_store(&self.path)?;
        let Some(header) = contents.header else {
            return Err(TillError::NoOpenSession(employee_id.to_string()));
        };

        let mut rows = contents.rows;
        let mut closed_hours: Option<f64> = None;

        for row in rows.iter_mut() {
            if field(row, 0) != employee_id {
                continue;
            }
            if !matches!(ClockOut::parse(field(row, 4)), Some(ClockOut::Open)) {
                continue;
            }

            let (date, clock_in) = match (parse_date(field(row, 2)), parse_time(field(row, 3))) {
                (Ok(d), Ok(t)) => (d, t),
                _ => {
                    warn!(
                        "Open row for {} has unparsable date/time, leaving it as is",
                        employee_id
                    );
                    continue;
                }
            };

            let minutes = shift_minutes(date, clock_in, clock_out_time);
            let hours = minutes_to_hours(minutes);

            let closed = StringRecord::from(vec![
                field(row, 0).to_string(),
                field(row, 1).to_string(),
                field(row, 2).to_string(),
                field(row, 3).to_string(),
                ClockOut::At(clock_out_time).as_store_field(),
                format_hours(hours),
            ]);
            *row = closed;
            closed_hours = Some(hours);
        }

        let Some(hours) = closed_hours else {
            debug!("No open row found for {}", employee_id);
            return Err(TillError::NoOpenSession(employee_id.to_string()));
        };

        store::write_store(&self.path, &header, &rows)?;
        info!(
            "Clock-out recorded for {}: {} hours",
            employee_id,
            format_hours(hours)
        );
        Ok(hours)
    }

    // ── Session lookup ────────────────────────────────────────────────────

    /// The open session for `employee_id`, if the store holds one.
    ///
    /// Scans the whole file; when several open rows exist (a state the
    /// invariant forbids but old files may contain), the last one in file
    /// order wins, matching the append order of clock-ins.
    pub fn open_session(&self, employee_id: &str) -> Result<Option<AttendanceRecord>> {
        let contents = store::read_store(&self.path)?;
        let mut found = None;

        for row in &contents.rows {
            if field(row, 0) != employee_id {
                continue;
            }
            let Some(clock_out) = ClockOut::parse(field(row, 4)) else {
                continue;
            };
            if !clock_out.is_open() {
                continue;
            }
            let (Ok(date), Ok(clock_in)) = (parse_date(field(row, 2)), parse_time(field(row, 3)))
            else {
                continue;
            };
            found = Some(AttendanceRecord::open(
                employee_id,
                field(row, 1),
                date,
                clock_in,
            ));
        }

        Ok(found)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
