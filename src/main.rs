//! emi-insights CLI
//!
//! Compute loan installments and amortization schedules from the command
//! line, optionally shown in another currency.
//!
//! # Usage
//!
//! ```bash
//! # Monthly installment for the default loan (100000 at 8.5% over 5 years)
//! emi-insights emi
//!
//! # Full schedule in Indian rupees, rates from a saved proxy response
//! emi-insights schedule --principal 250000 --rate 5 --tenure 30 --currency INR --rates rates.json
//!
//! # Convert an amount
//! emi-insights convert --amount 100 --from USD --to EUR --rates rates.json
//! ```

use emi_insights::amortization::summary::{DisplaySummary, LoanSummary};
use emi_insights::config::CalculatorConfig;
use emi_insights::core::currency::CurrencyCode;
use emi_insights::core::loan::LoanParams;
use emi_insights::format::{format_currency, format_rate};
use emi_insights::fx::cache::{RateCache, RateSnapshot};
use emi_insights::fx::context::CurrencyContext;
use emi_insights::fx::converter::convert;
use emi_insights::fx::provider::JsonFileRateSource;
use std::collections::HashMap;
use std::process;

fn print_usage() {
    eprintln!(
        r#"emi-insights: loan EMI and amortization with currency display

USAGE:
    emi-insights <COMMAND> [OPTIONS]

COMMANDS:
    emi         Monthly installment and loan totals
    schedule    Month-by-month amortization schedule
    convert     Convert an amount between two currencies
    currencies  List currencies available for display
    rates       List exchange rates against a base currency
    help        Show this message

OPTIONS (emi, schedule):
    --principal <AMOUNT>  Loan amount in the pivot currency (default: 100000)
    --rate <PERCENT>      Annual interest rate (default: 8.5)
    --tenure <YEARS>      Loan tenure in years (default: 5)
    --currency <CODE>     Display currency (default: pivot)
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (convert):
    --amount <AMOUNT>     Amount to convert
    --from <CODE>         Source currency
    --to <CODE>           Target currency

OPTIONS (rates):
    --base <CODE>         Currency to price against (default: pivot)
    --search <TEXT>       Only list codes containing TEXT

OPTIONS (all):
    --rates <FILE>        Saved rate body (JSON object of code to rate)

ENVIRONMENT:
    EMI_PIVOT_CURRENCY    Pivot currency (default: USD)
    EMI_RATE_CACHE_HOURS  Rate cache lifetime in hours (default: 4)
    EMI_RATES_FILE        Default for --rates
    RUST_LOG              Log filter (default: warn)

EXAMPLES:
    emi-insights emi --principal 100000 --rate 8.5 --tenure 5
    emi-insights schedule --currency EUR --rates rates.json --format json
    emi-insights convert --amount 100 --from USD --to INR --rates rates.json
    emi-insights rates --rates rates.json --base EUR --search in"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Collect `--key value` pairs, rejecting keys outside `allowed`.
fn parse_options(args: &[String], allowed: &[&str]) -> HashMap<String, String> {
    let mut options = HashMap::new();
    let mut i = 0;
    while i < args.len() {
        let key = args[i].as_str();
        let name = key.strip_prefix("--").unwrap_or_else(|| fail(format!("unexpected argument: {}", key)));
        if !allowed.contains(&name) {
            fail(format!("unknown option: {}", key));
        }
        i += 1;
        let value = args
            .get(i)
            .cloned()
            .unwrap_or_else(|| fail(format!("{} requires a value", key)));
        options.insert(name.to_string(), value);
        i += 1;
    }
    options
}

fn number_option(options: &HashMap<String, String>, name: &str, default: f64) -> f64 {
    match options.get(name) {
        Some(raw) => raw
            .parse()
            .unwrap_or_else(|_| fail(format!("--{} requires a number, got '{}'", name, raw))),
        None => default,
    }
}

fn currency_option(options: &HashMap<String, String>, name: &str) -> Option<CurrencyCode> {
    options.get(name).map(|raw| {
        CurrencyCode::parse(raw).unwrap_or_else(|e| fail(format!("--{}: {}", name, e)))
    })
}

fn load_config() -> CalculatorConfig {
    CalculatorConfig::from_env().unwrap_or_else(|e| fail(e))
}

/// Rates from `--rates` or the configured file; a loading snapshot when
/// neither is given.
fn load_rates(config: &CalculatorConfig, options: &HashMap<String, String>) -> RateSnapshot {
    let path = options
        .get("rates")
        .map(Into::into)
        .or_else(|| config.rates_file.clone());

    match path {
        Some(path) => {
            let source = JsonFileRateSource::new(path);
            let mut cache = RateCache::with_ttl(source, config.pivot.clone(), config.cache_ttl());
            cache.current_now()
        }
        None => RateSnapshot {
            loading: true,
            ..Default::default()
        },
    }
}

fn loan_context(config: &CalculatorConfig, options: &HashMap<String, String>) -> (LoanSummary, DisplaySummary) {
    let defaults = LoanParams::default();
    let params = LoanParams::new(
        number_option(options, "principal", defaults.principal()),
        number_option(options, "rate", defaults.annual_rate_percent()),
        number_option(options, "tenure", defaults.tenure_years()),
    )
    .unwrap_or_else(|e| fail(e));

    let summary = LoanSummary::calculate(&params).unwrap_or_else(|e| fail(e));

    let mut ctx = CurrencyContext::new(config.pivot.clone());
    ctx.update_from(&load_rates(config, options));
    if let Some(code) = currency_option(options, "currency") {
        ctx.change_currency(code).unwrap_or_else(|e| fail(e));
    }

    let display = summary.to_display(&ctx, &config.pivot);
    for warning in &display.warnings {
        eprintln!("Warning: {}", warning);
    }
    (summary, display)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("failed to serialize output: {}", e)),
    }
}

fn cmd_emi(args: &[String]) {
    let options = parse_options(args, &["principal", "rate", "tenure", "currency", "rates", "format"]);
    let config = load_config();
    let (summary, display) = loan_context(&config, &options);

    if options.get("format").map(String::as_str) == Some("json") {
        #[derive(serde::Serialize)]
        struct EmiOutput<'a> {
            params: &'a LoanParams,
            currency: &'a CurrencyCode,
            emi: f64,
            total_payment: f64,
            total_interest: f64,
        }
        print_json(&EmiOutput {
            params: &summary.params,
            currency: &display.currency,
            emi: display.emi,
            total_payment: display.total_payment,
            total_interest: display.total_interest,
        });
        return;
    }

    let code = &display.currency;
    println!("Loan:            {}", summary.params);
    println!("Display:         {}", code);
    println!("Monthly EMI:     {}", format_currency(display.emi, code));
    println!("Total Payment:   {}", format_currency(display.total_payment, code));
    println!("Total Interest:  {}", format_currency(display.total_interest, code));
}

fn cmd_schedule(args: &[String]) {
    let options = parse_options(args, &["principal", "rate", "tenure", "currency", "rates", "format"]);
    let config = load_config();
    let (_, display) = loan_context(&config, &options);

    if options.get("format").map(String::as_str) == Some("json") {
        print_json(&display);
        return;
    }

    let code = &display.currency;
    println!("Amortization Schedule ({})", code);
    println!("Monthly EMI: {}\n", format_currency(display.emi, code));
    println!(
        "{:>6}  {:>18}  {:>18}  {:>20}",
        "Month", "Principal", "Interest", "Remaining Balance"
    );
    for entry in &display.schedule {
        println!(
            "{:>6}  {:>18}  {:>18}  {:>20}",
            entry.month,
            format_currency(entry.principal_payment, code),
            format_currency(entry.interest_payment, code),
            format_currency(entry.remaining_balance, code)
        );
    }
}

fn cmd_convert(args: &[String]) {
    let options = parse_options(args, &["amount", "from", "to", "rates"]);
    let config = load_config();

    let amount = match options.get("amount") {
        Some(_) => number_option(&options, "amount", 0.0),
        None => fail("--amount <AMOUNT> is required"),
    };
    let from = currency_option(&options, "from").unwrap_or_else(|| config.pivot.clone());
    let to = currency_option(&options, "to").unwrap_or_else(|| fail("--to <CODE> is required"));

    let snapshot = load_rates(&config, &options);
    let result = convert(amount, &from, &to, snapshot.table.as_deref());
    if let Some(warning) = &result.warning {
        eprintln!("Warning: {}", warning);
    }
    println!(
        "{} = {}",
        format_currency(amount, &from),
        format_currency(result.amount, if result.is_converted() { &to } else { &from })
    );
}

fn cmd_currencies(args: &[String]) {
    let options = parse_options(args, &["rates"]);
    let config = load_config();

    let mut ctx = CurrencyContext::new(config.pivot.clone());
    ctx.update_from(&load_rates(&config, &options));
    for code in ctx.available_currencies() {
        println!("{}", code);
    }
}

fn cmd_rates(args: &[String]) {
    let options = parse_options(args, &["rates", "base", "search"]);
    let config = load_config();
    let base = currency_option(&options, "base").unwrap_or_else(|| config.pivot.clone());

    let snapshot = load_rates(&config, &options);
    let table = match snapshot.table {
        Some(table) => table,
        None => fail(
            snapshot
                .last_error
                .unwrap_or_else(|| "no rates loaded; pass --rates <FILE>".to_string()),
        ),
    };

    println!("{:<8}  Rate (1 {} =)", "Currency", base);
    for row in table.cross_rates(&base, options.get("search").map(String::as_str)) {
        println!("{:<8}  {}", row.currency, format_rate(row.rate));
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "emi" => cmd_emi(rest),
        "schedule" => cmd_schedule(rest),
        "convert" => cmd_convert(rest),
        "currencies" => cmd_currencies(rest),
        "rates" => cmd_rates(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
