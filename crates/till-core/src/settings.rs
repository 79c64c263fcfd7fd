use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outlet code assumed when neither the CLI nor the saved configuration
/// names one.
pub const DEFAULT_OUTLET: &str = "C60";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Outlet management over flat CSV stores
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tillpoint",
    about = "Attendance, sales and stock keeping over flat CSV stores",
    version
)]
pub struct Settings {
    /// Directory holding the CSV stores (defaults to the current directory)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Home outlet code; selects the stock column mutated by sales and movements
    #[arg(long)]
    pub outlet: Option<String>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One operation per original screen; arguments stay strings and are parsed
/// by the domain layer so store tolerances apply uniformly.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Verify staff credentials and show any open attendance session
    Login {
        /// Employee identifier
        id: String,
        /// Password as stored in the staff file
        password: String,
    },
    /// Open an attendance session for an employee
    ClockIn {
        /// Employee identifier
        id: String,
    },
    /// Close an employee's open attendance session
    ClockOut {
        /// Employee identifier
        id: String,
        /// Clock-out time, HH:MM or HH:MM:SS (defaults to the current time)
        time: Option<String>,
    },
    /// Register a staff member
    AddStaff {
        /// Employee identifier
        id: String,
        /// Display name
        name: String,
        /// Role; Manager unlocks analytics and sale editing
        #[arg(long, default_value = "Part-time")]
        role: String,
        /// Login password
        #[arg(long)]
        password: String,
    },
    /// Record a sale at the home outlet
    Sell {
        /// Model identifier
        model: String,
        /// Units sold
        qty: u32,
        /// Customer name
        #[arg(long, default_value = "Walk-in")]
        customer: String,
        /// Payment method: cash, card or e-wallet
        #[arg(long, default_value = "cash")]
        method: String,
        /// Staff name printed on the receipt
        #[arg(long, default_value = "-")]
        staff: String,
    },
    /// Move stock into or out of the home outlet
    StockMove {
        /// Direction: in or out
        direction: String,
        /// Supplier or outlet on the other side of the movement
        #[arg(long, default_value = "MAIN WAREHOUSE")]
        counterparty: String,
        /// Movement entries as MODEL:QTY; repeatable
        #[arg(long = "item", required = true)]
        items: Vec<String>,
        /// Staff name printed on the receipt
        #[arg(long, default_value = "-")]
        staff: String,
    },
    /// Print the count sheet, or apply counted quantities
    StockCount {
        /// Counted quantities as MODEL:QTY; repeatable. Empty prints the sheet
        #[arg(long = "item")]
        items: Vec<String>,
    },
    /// Search sales by customer name
    Sales {
        /// Case-insensitive substring of the customer field
        customer: String,
    },
    /// Edit a sale located by its reference field
    EditSale {
        /// Reference of the row (its first field)
        reference: String,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        qty: Option<u32>,
        #[arg(long)]
        total: Option<f64>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        staff: Option<String>,
    },
    /// Render an analytics report
    Report {
        /// Report to render
        #[arg(default_value = "summary", value_parser = ["summary", "daily", "monthly", "yearly", "best-sellers"])]
        view: String,
    },
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.tillpoint/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.tillpoint/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".tillpoint").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to the default path, creating parent directories
    /// if needed.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default config file if it exists.
    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, fill unset options from the last-used params,
    /// resolve defaults, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_defaults(settings);
        }

        // CLI wins; persisted values only fill fields left unset.
        let last = LastUsedParams::load_from(config_path);
        if settings.data_dir.is_none() {
            settings.data_dir = last.data_dir;
        }
        if settings.outlet.is_none() {
            settings.outlet = last.outlet;
        }

        let settings = Self::resolve_defaults(settings);

        // Persist current settings for next run.
        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Fill remaining `None` fields with their defaults and apply `--debug`.
    fn resolve_defaults(mut settings: Settings) -> Settings {
        if settings.data_dir.is_none() {
            settings.data_dir = Some(PathBuf::from("."));
        }
        if settings.outlet.is_none() {
            settings.outlet = Some(DEFAULT_OUTLET.to_string());
        }
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The store directory, after defaults are resolved.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// The home outlet code, after defaults are resolved.
    pub fn resolved_outlet(&self) -> String {
        self.outlet
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTLET.to_string())
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            data_dir: s.data_dir.clone(),
            outlet: s.outlet.clone(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
