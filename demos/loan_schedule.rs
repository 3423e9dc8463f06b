//! Loan EMI and amortization schedule example.
//!
//! Computes the reference loan, prints its first and last months, and
//! compares how the installment moves with the interest rate.

use emi_insights::amortization::emi::compute_emi;
use emi_insights::amortization::schedule::{total_interest, total_principal};
use emi_insights::amortization::summary::LoanSummary;
use emi_insights::core::loan::LoanParams;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  emi-insights: Loan Schedule Example     ║");
    println!("╚══════════════════════════════════════════╝\n");

    // --- Scenario 1: Reference loan ---
    println!("━━━ Scenario 1: 100,000 at 8.5% over 5 years ━━━\n");

    let params = LoanParams::default();
    let summary = match LoanSummary::calculate(&params) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    println!("{}", summary);

    let schedule = &summary.schedule;
    for entry in schedule.iter().take(3) {
        println!("  {}", entry);
    }
    println!("  ...");
    for entry in schedule.iter().skip(schedule.len().saturating_sub(2)) {
        println!("  {}", entry);
    }
    println!();
    println!("Principal repaid:  {:.2}", total_principal(schedule));
    println!("Interest paid:     {:.2}", total_interest(schedule));
    println!();

    // --- Scenario 2: Rate sensitivity ---
    println!("━━━ Scenario 2: Rate Sensitivity (250,000 over 20 years) ━━━\n");

    for rate in [0.0, 3.0, 6.0, 9.0, 12.0] {
        match compute_emi(250_000.0, rate, 20.0) {
            Ok(emi) => println!("  {:>5.1}%  EMI {:>10.2}  total {:>12.2}", rate, emi, emi * 240.0),
            Err(e) => println!("  {:>5.1}%  {}", rate, e),
        }
    }
    println!();

    // --- Scenario 3: Rejected inputs ---
    println!("━━━ Scenario 3: Rejected Inputs ━━━\n");

    for (principal, rate, years) in [(0.0, 8.5, 5.0), (100_000.0, -1.0, 5.0), (100_000.0, 8.5, 2.05)] {
        if let Err(e) = LoanParams::new(principal, rate, years) {
            println!("  ({}, {}, {}) → {}", principal, rate, years, e);
        }
    }
}
