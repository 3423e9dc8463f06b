use approx::assert_abs_diff_eq;
use emi_insights::amortization::emi::compute_emi;
use emi_insights::amortization::schedule::{compute_schedule, total_principal};
use emi_insights::amortization::summary::LoanSummary;
use emi_insights::core::currency::CurrencyCode;
use emi_insights::core::loan::{LoanError, LoanParams};
use emi_insights::format::format_currency;
use emi_insights::fx::cache::RateCache;
use emi_insights::fx::context::CurrencyContext;
use emi_insights::fx::converter::{convert, list_available_currencies, ConversionWarning};
use emi_insights::fx::provider::{parse_proxy_body, StaticRateSource};
use emi_insights::fx::rate_table::RateTable;
use std::sync::Arc;

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::new(s)
}

fn sample_rates() -> RateTable {
    RateTable::from_json(code("USD"), r#"{"USD": 1, "EUR": 0.9, "INR": 83}"#).unwrap()
}

/// Full pipeline: inputs → engine → conversion → formatted display.
#[test]
fn full_pipeline_reference_loan_in_rupees() {
    let params = LoanParams::new(100_000.0, 8.5, 5.0).unwrap();
    let summary = LoanSummary::calculate(&params).unwrap();

    assert_eq!(summary.schedule.len(), 60);
    assert_abs_diff_eq!(summary.emi, 2051.653, epsilon = 1e-3);
    assert_eq!(summary.schedule.last().unwrap().remaining_balance, 0.0);
    assert_abs_diff_eq!(total_principal(&summary.schedule), 100_000.0, epsilon = 0.01);

    let source = StaticRateSource::new(sample_rates());
    let mut cache = RateCache::new(source, code("USD"));
    let mut ctx = CurrencyContext::new(code("USD"));
    ctx.update_from(&cache.current_now());
    ctx.change_currency(code("INR")).unwrap();

    let display = summary.to_display(&ctx, &code("USD"));
    assert!(display.warnings.is_empty());
    assert_abs_diff_eq!(display.emi, summary.emi * 83.0, epsilon = 1e-6);
    assert_eq!(format_currency(display.principal, &display.currency), "₹8,300,000.00");
}

#[test]
fn zero_rate_emi_is_exact_division() {
    for (principal, years) in [(100_000.0, 5.0), (12_345.67, 3.0), (1.0, 30.0)] {
        assert_eq!(
            compute_emi(principal, 0.0, years).unwrap(),
            principal / (years * 12.0)
        );
    }
}

#[test]
fn invalid_parameters_yield_error_not_nan() {
    let cases = [
        (0.0, 8.5, 5.0),
        (100.0, -1.0, 5.0),
        (100.0, 8.5, 0.0),
        (f64::INFINITY, 8.5, 5.0),
    ];
    for (p, r, t) in cases {
        assert!(matches!(
            compute_emi(p, r, t),
            Err(LoanError::InvalidLoanParameters { .. })
        ));
        assert!(compute_schedule(p, r, t).is_err());
    }
}

#[test]
fn conversion_examples() {
    let table = sample_rates();
    assert_eq!(convert(100.0, &code("USD"), &code("INR"), Some(&table)).amount, 8300.0);

    let only_usd = RateTable::from_json(code("USD"), r#"{"USD": 1}"#).unwrap();
    let result = convert(50.0, &code("USD"), &code("XYZ"), Some(&only_usd));
    assert_eq!(result.amount, 50.0);
    assert_eq!(
        result.warning,
        Some(ConversionWarning::UnknownCurrencyCode { code: code("XYZ") })
    );
}

#[test]
fn proxy_error_leaves_context_unconverted() {
    let err = parse_proxy_body(500, r#"{"error": "quota-reached"}"#, &code("USD")).unwrap_err();
    assert!(err.to_string().contains("quota-reached"));

    // The failed fetch never reaches the context; it just has no rates.
    let ctx = CurrencyContext::new(code("USD"));
    assert_eq!(list_available_currencies(ctx.rates()), vec![code("USD")]);
    let result = ctx.convert_amount(10.0, &code("USD"), &code("EUR"));
    assert_eq!(result.amount, 10.0);
    assert_eq!(result.warning, Some(ConversionWarning::RateUnavailable));
}

#[test]
fn context_keeps_old_snapshot_across_refresh() {
    let first = Arc::new(sample_rates());
    let mut ctx = CurrencyContext::with_rates(Arc::clone(&first));
    ctx.change_currency(code("EUR")).unwrap();

    let before = ctx.to_display(100.0, &code("USD")).amount;
    drop(first);
    let after = ctx.to_display(100.0, &code("USD")).amount;
    assert_eq!(before, after);
    assert_abs_diff_eq!(after, 90.0, epsilon = 1e-9);
}

/// Test JSON serialization of a loan summary.
#[test]
fn summary_serializes() {
    let summary = LoanSummary::calculate(&LoanParams::default()).unwrap();
    let json = serde_json::to_string(&summary).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["params"]["principal"], 100_000.0);
    assert_eq!(parsed["schedule"].as_array().unwrap().len(), 60);
    assert_eq!(parsed["schedule"][0]["month"], 1);
    assert!(parsed["schedule"][0].get("remaining_balance").is_some());
}

#[test]
fn loan_params_round_trip_through_json() {
    let params = LoanParams::new(75_000.0, 9.25, 7.0).unwrap();
    let json = serde_json::to_string(&params).unwrap();
    let back: LoanParams = serde_json::from_str(&json).unwrap();
    assert_eq!(params, back);
}
