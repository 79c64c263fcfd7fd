mod bootstrap;
mod report;

use anyhow::Result;
use chrono::Local;
use till_core::error::TillError;
use till_core::formatting::{format_currency, format_hours, format_units};
use till_core::models::{Employee, MovementDirection, PaymentMethod};
use till_core::settings::{Command, Settings};
use till_core::time_utils::{parse_clock_time, STAMP_FORMAT, TIME_FORMAT};
use till_data::analytics::aggregate_sales;
use till_data::attendance::AttendanceLedger;
use till_data::counts::StockCount;
use till_data::employees::EmployeeStore;
use till_data::movement::{MovementRequest, StockMovement};
use till_data::register::{Register, SaleRequest};
use till_data::sales::{SaleEdit, SalesLog};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("tillpoint v{} starting", env!("CARGO_PKG_VERSION"));

    let data_dir = settings.resolved_data_dir();
    let outlet = settings.resolved_outlet();
    tracing::info!("Stores: {}, home outlet: {}", data_dir.display(), outlet);

    bootstrap::ensure_data_files(&data_dir, &outlet)?;

    let Some(command) = settings.command else {
        println!("Nothing to do; run tillpoint --help for the command list.");
        return Ok(());
    };

    match command {
        Command::Login { id, password } => {
            let employee = EmployeeStore::new(&data_dir).authenticate(&id, &password)?;
            println!("Welcome, {} ({})", employee.name, employee.role);
            if let Some(session) = AttendanceLedger::new(&data_dir).open_session(&id)? {
                println!(
                    "Open attendance session since {} {}",
                    session.date,
                    session.clock_in.format(TIME_FORMAT)
                );
            }
        }

        Command::ClockIn { id } => {
            let employee = EmployeeStore::new(&data_dir)
                .find(&id)?
                .ok_or_else(|| TillError::UnknownEmployee(id.clone()))?;
            let instant = AttendanceLedger::new(&data_dir).clock_in(
                &employee.id,
                &employee.name,
                Local::now().naive_local(),
            )?;
            println!("{} clocked in at {}", employee.name, instant.format(STAMP_FORMAT));
        }

        Command::ClockOut { id, time } => {
            let out_time = match time {
                Some(text) => parse_clock_time(&text)?,
                None => Local::now().naive_local().time(),
            };
            let hours = AttendanceLedger::new(&data_dir).clock_out(&id, out_time)?;
            println!(
                "Clocked out at {}; worked {} hours",
                out_time.format(TIME_FORMAT),
                format_hours(hours)
            );
        }

        Command::AddStaff {
            id,
            name,
            role,
            password,
        } => {
            let employee = Employee {
                id,
                name,
                role,
                password,
            };
            EmployeeStore::new(&data_dir).add(&employee)?;
            println!("Registered {} as {}", employee.name, employee.role);
        }

        Command::Sell {
            model,
            qty,
            customer,
            method,
            staff,
        } => {
            let request = SaleRequest {
                model_id: model,
                quantity: qty,
                customer,
                method: method.parse::<PaymentMethod>()?,
                staff,
            };
            let outcome =
                Register::new(&data_dir, &outlet).process_sale(&request, Local::now().naive_local())?;
            println!(
                "Sale {} recorded: {} x{} for {}",
                outcome.sale.reference(),
                outcome.sale.model_id,
                outcome.sale.quantity,
                format_currency(outcome.sale.total)
            );
            println!(
                "{} left at {}. Receipt: {}",
                format_units(outcome.remaining),
                outlet,
                outcome.receipt_path.display()
            );
        }

        Command::StockMove {
            direction,
            counterparty,
            items,
            staff,
        } => {
            let request = MovementRequest {
                direction: direction.parse::<MovementDirection>()?,
                counterparty,
                items: parse_item_specs(&items)?,
                staff,
            };
            let outcome =
                StockMovement::new(&data_dir, &outlet).process(&request, Local::now().naive_local())?;
            for line in &outcome.applied {
                println!("{:<12} now {}", line.model_id, format_units(line.balance));
            }
            for skip in &outcome.skipped {
                println!("Skipped {}: {}", skip.model_id, skip.reason);
            }
            match outcome.receipt_path {
                Some(path) => println!("Movement recorded: {}", path.display()),
                None => println!("No lines applied; nothing recorded."),
            }
        }

        Command::StockCount { items } => {
            let counter = StockCount::new(&data_dir, &outlet);
            if items.is_empty() {
                println!("Count sheet for {}:", outlet);
                for (model, expected) in counter.sheet()? {
                    println!("{:<12} {}", model, format_units(expected));
                }
            } else {
                let outcome = counter.process(&parse_item_specs(&items)?)?;
                for variance in &outcome.variances {
                    if variance.is_discrepant() {
                        println!(
                            "{:<12} expected {}, counted {} ({:+})",
                            variance.model_id,
                            variance.expected,
                            variance.counted,
                            variance.delta()
                        );
                    } else {
                        println!("{:<12} matches at {}", variance.model_id, variance.counted);
                    }
                }
                for skip in &outcome.skipped {
                    println!("Skipped {}: {}", skip.model_id, skip.reason);
                }
            }
        }

        Command::Sales { customer } => {
            let hits = SalesLog::new(&data_dir).search(&customer)?;
            if hits.is_empty() {
                println!("No sales match '{}'", customer);
            } else {
                for row in &hits {
                    println!("{}", row.iter().collect::<Vec<_>>().join(" | "));
                }
                println!("{} sale(s) found", hits.len());
            }
        }

        Command::EditSale {
            reference,
            customer,
            model,
            qty,
            total,
            method,
            staff,
        } => {
            let edit = SaleEdit {
                customer,
                model,
                quantity: qty,
                total,
                method: method.map(|m| m.parse::<PaymentMethod>()).transpose()?,
                staff,
            };
            SalesLog::new(&data_dir).edit(&reference, &edit)?;
            println!("Sale {} updated", reference);
        }

        Command::Report { view } => {
            let rows = SalesLog::new(&data_dir).load_raw()?;
            let analysis = aggregate_sales(&rows);
            println!("{}", report::render(&view, &analysis));
        }
    }

    Ok(())
}

/// Parse repeated `MODEL:QTY` item arguments into model and unit pairs.
fn parse_item_specs(specs: &[String]) -> std::result::Result<Vec<(String, u32)>, TillError> {
    specs
        .iter()
        .map(|spec| {
            let (model, qty) = spec
                .split_once(':')
                .ok_or_else(|| TillError::Config(format!("expected MODEL:QTY, got '{spec}'")))?;
            let quantity: u32 = qty
                .trim()
                .parse()
                .map_err(|_| TillError::Config(format!("invalid quantity in '{spec}'")))?;
            Ok((model.trim().to_string(), quantity))
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
