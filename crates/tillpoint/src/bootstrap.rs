use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.tillpoint/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.tillpoint/`
/// - `~/.tillpoint/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let till_dir = home.join(".tillpoint");
    std::fs::create_dir_all(&till_dir)?;
    std::fs::create_dir_all(till_dir.join("logs"))?;
    Ok(())
}

// ── Store bootstrap ────────────────────────────────────────────────────────────

/// Seed the stores a fresh data directory needs before the first command.
///
/// The attendance, staff and sales stores create themselves on first
/// append, but the model store must already carry the home outlet as a
/// column and the outlet directory needs its header. Existing files are
/// never touched.
pub fn ensure_data_files(data_dir: &Path, outlet_code: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)?;

    let model_path = data_dir.join("model.csv");
    if !model_path.exists() {
        let mut file = std::fs::File::create(&model_path)?;
        writeln!(file, "Model,Price,{}", outlet_code)?;
        tracing::info!("Created {} with column {}", model_path.display(), outlet_code);
    }

    let outlet_path = data_dir.join("outlet.csv");
    if !outlet_path.exists() {
        let mut file = std::fs::File::create(&outlet_path)?;
        writeln!(file, "Code,Name")?;
        tracing::info!("Created {}", outlet_path.display());
    }

    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive,
/// falling back to `"info"` when the level string is not recognised. With a
/// `log_file`, events go to that file without ANSI colour; otherwise they go
/// to the console.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };
    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(Arc::new(file));
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        None => {
            let layer = fmt::layer().with_target(false).with_thread_ids(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── test_ensure_directories ───────────────────────────────────────────────

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        // Override HOME so that dirs::home_dir() resolves to our temp dir.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let result = ensure_directories();

        // Restore HOME.
        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        result.expect("ensure_directories should succeed");

        let till_dir = tmp.path().join(".tillpoint");
        assert!(till_dir.is_dir(), ".tillpoint dir must exist");
        assert!(till_dir.join("logs").is_dir(), "logs subdir must exist");
    }

    // ── test_ensure_data_files ────────────────────────────────────────────────

    #[test]
    fn test_ensure_data_files_seeds_model_and_outlet_stores() {
        let tmp = TempDir::new().expect("tempdir");
        let data_dir = tmp.path().join("data");

        ensure_data_files(&data_dir, "C60").expect("seed");

        let model = std::fs::read_to_string(data_dir.join("model.csv")).unwrap();
        assert_eq!(model, "Model,Price,C60\n");
        let outlet = std::fs::read_to_string(data_dir.join("outlet.csv")).unwrap();
        assert_eq!(outlet, "Code,Name\n");
    }

    #[test]
    fn test_ensure_data_files_never_overwrites() {
        let tmp = TempDir::new().expect("tempdir");
        std::fs::write(tmp.path().join("model.csv"), "Model,Price,C60,C61\nA55,1.00,2,3\n")
            .unwrap();

        ensure_data_files(tmp.path(), "C99").expect("seed");

        let model = std::fs::read_to_string(tmp.path().join("model.csv")).unwrap();
        assert!(model.contains("C61"));
        assert!(!model.contains("C99"));
    }
}
