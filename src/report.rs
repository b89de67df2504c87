//! Plain-text report printed by the CLI.

use crate::model::StaticBill;
use crate::orchestrator::RunOutcome;
use chrono::{DateTime, Local};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

const WIDTH: usize = 50;

/// Formats an amount as dollars with two decimal places.
pub fn dollars(amount: Decimal) -> String {
    format!(
        "${:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// The summary block: one line per provider, fixed bills, then totals.
pub struct Report<'a> {
    outcome: &'a RunOutcome,
    static_bills: &'a [StaticBill],
    generated_at: DateTime<Local>,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(WIDTH);
        let light = "-".repeat(WIDTH);

        writeln!(f, "{}", heavy)?;
        writeln!(f, "SUMMARY ({})", self.generated_at.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "{}", heavy)?;

        for result in &self.outcome.results {
            match result.error() {
                Some(error) => writeln!(f, "{}: ERROR - {}", result.provider(), error)?,
                None => writeln!(f, "{}: {}", result.provider(), dollars(result.balance()))?,
            }
        }
        for bill in self.static_bills {
            writeln!(f, "{}: {} (fixed)", bill.name, dollars(bill.amount))?;
        }

        let summary = &self.outcome.summary;
        writeln!(f, "{}", light)?;
        writeln!(f, "Total Balance: {}", dollars(summary.total))?;
        writeln!(
            f,
            "Household Size: {} {}",
            summary.household_size,
            if summary.household_size == 1 { "person" } else { "people" }
        )?;
        writeln!(f, "Per Person: {}", dollars(summary.per_person))?;
        writeln!(f, "{}", heavy)
    }
}

/// Renders the report for one aggregation pass.
pub fn render(outcome: &RunOutcome, static_bills: &[StaticBill], generated_at: DateTime<Local>) -> String {
    Report {
        outcome,
        static_bills,
        generated_at,
    }
    .to_string()
}
