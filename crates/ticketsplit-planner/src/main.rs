//! Planner binary for ticketsplit.
//!
//! Reads a JSON plan request (`{ "roster": [...], "wants": [...] }`) from
//! the path given as the first argument, or from stdin when no path is
//! given, runs the allocation engine, and writes the resulting plan JSON
//! to stdout. A per-participant load summary goes to the log so operators
//! can eyeball fairness without parsing the output.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `ticketsplit.yaml` (optional)
//! 3. Read and parse the plan request
//! 4. Run the allocation engine
//! 5. Log the per-participant summary
//! 6. Emit the plan JSON

mod config;
mod error;

use std::path::Path;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use ticketsplit_engine::plan;
use ticketsplit_types::{PlanRequest, PlanResult};

use crate::config::PlannerConfig;
use crate::error::PlannerError;

/// Default configuration file name, looked up in the working directory.
const CONFIG_FILE: &str = "ticketsplit.yaml";

/// Application entry point for the planner.
///
/// # Errors
///
/// Returns an error if the config file is broken, the request cannot be
/// read, or the request is not valid JSON. The planning run itself never
/// fails; coverage problems surface inside the emitted plan.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("ticketsplit-planner starting");

    // 2. Load configuration.
    let config = PlannerConfig::load(Path::new(CONFIG_FILE)).map_err(PlannerError::from)?;
    info!(
        per_user_cap = config.engine.per_user_cap,
        fairness_spread = config.engine.fairness_spread,
        "Configuration loaded"
    );

    // 3. Read and parse the plan request.
    let request = read_request()?;
    info!(
        roster = request.roster.len(),
        wants = request.wants.len(),
        "Plan request loaded"
    );

    // 4. Run the allocation engine.
    let result = plan(&request.roster, &request.wants, &config.engine);

    // 5. Log the per-participant summary.
    log_summary(&result);

    // 6. Emit the plan JSON.
    let output = if config.pretty {
        serde_json::to_string_pretty(&result).map_err(PlannerError::from)?
    } else {
        serde_json::to_string(&result).map_err(PlannerError::from)?
    };
    println!("{output}");

    Ok(())
}

/// Read the request from the first CLI argument, or stdin if absent.
fn read_request() -> Result<PlanRequest, PlannerError> {
    let contents = match std::env::args().nth(1) {
        Some(path) => {
            debug!(%path, "reading plan request from file");
            std::fs::read_to_string(path)?
        }
        None => {
            debug!("reading plan request from stdin");
            std::io::read_to_string(std::io::stdin())?
        }
    };
    Ok(serde_json::from_str(&contents)?)
}

/// One log line per participant: ticket count and total cost. Purchases
/// go to the debug log with their priority glyphs.
fn log_summary(result: &PlanResult) {
    for assignment in &result.assignments {
        let total_cost = assignment
            .purchases
            .iter()
            .fold(Decimal::ZERO, |sum, p| sum.saturating_add(p.cost));
        info!(
            participant = %assignment.participant_name,
            tickets = assignment.total_tickets,
            total_cost = %total_cost,
            "assignment"
        );
        for purchase in &assignment.purchases {
            debug!(
                event = %purchase.event_id,
                title = %purchase.event_title,
                glyph = purchase.priority.glyph(),
                buying_for = %purchase.buying_for.join(", "),
                "purchase"
            );
        }
    }
    for diagnostic in &result.errors {
        warn!(%diagnostic, "planning diagnostic");
    }
}
