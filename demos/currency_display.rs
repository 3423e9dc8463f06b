//! Currency display example.
//!
//! Loads a proxy-style rate body, switches the display currency, and shows
//! how figures degrade to the pivot when a rate is missing.

use emi_insights::amortization::summary::LoanSummary;
use emi_insights::core::currency::CurrencyCode;
use emi_insights::core::loan::LoanParams;
use emi_insights::format::{format_currency, format_rate};
use emi_insights::fx::cache::RateCache;
use emi_insights::fx::context::CurrencyContext;
use emi_insights::fx::converter::convert;
use emi_insights::fx::provider::{parse_proxy_body, StaticRateSource};

const RATE_BODY: &str = r#"{
    "conversion_rates": {
        "USD": 1, "EUR": 0.92, "GBP": 0.79, "INR": 83.12, "JPY": 149.5, "BRL": 4.97
    }
}"#;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  emi-insights: Currency Display Example  ║");
    println!("╚══════════════════════════════════════════╝\n");

    let usd = CurrencyCode::new("USD");
    let table = match parse_proxy_body(200, RATE_BODY, &usd) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    // --- Scenario 1: Rate table ---
    println!("━━━ Scenario 1: Rates (1 EUR =) ━━━\n");

    for row in table.cross_rates(&CurrencyCode::new("EUR"), None) {
        println!("  {:<5} {}", row.currency, format_rate(row.rate));
    }
    println!();

    // --- Scenario 2: Loan shown in several currencies ---
    println!("━━━ Scenario 2: Reference Loan Across Currencies ━━━\n");

    let summary = match LoanSummary::calculate(&LoanParams::default()) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    let mut cache = RateCache::new(StaticRateSource::new(table), usd.clone());
    let mut ctx = CurrencyContext::new(usd.clone());
    ctx.update_from(&cache.current_now());

    for code in ["USD", "EUR", "INR", "JPY"] {
        if ctx.change_currency(CurrencyCode::new(code)).is_err() {
            continue;
        }
        let display = summary.to_display(&ctx, &usd);
        println!(
            "  {:<4} EMI {:>16}  interest {:>18}",
            code,
            format_currency(display.emi, &display.currency),
            format_currency(display.total_interest, &display.currency)
        );
    }
    println!();

    // --- Scenario 3: Degraded conversions ---
    println!("━━━ Scenario 3: Missing Rates ━━━\n");

    if let Err(e) = ctx.change_currency(CurrencyCode::new("XYZ")) {
        println!("  change to XYZ rejected: {}", e);
    }

    let unknown = convert(50.0, &usd, &CurrencyCode::new("XYZ"), ctx.rates());
    println!(
        "  50 USD → XYZ = {} ({})",
        unknown.amount,
        unknown.warning.map(|w| w.to_string()).unwrap_or_default()
    );

    let no_rates = convert(50.0, &usd, &CurrencyCode::new("EUR"), None);
    println!(
        "  50 USD → EUR without rates = {} ({})",
        no_rates.amount,
        no_rates.warning.map(|w| w.to_string()).unwrap_or_default()
    );
}
