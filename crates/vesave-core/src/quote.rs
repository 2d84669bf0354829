//! Simulated conversion quotes.
//!
//! Used by simulated clients and by the backend's conversion endpoint, which
//! quotes at a fixed rate instead of asking a DEX.

/// Quoted amounts, already formatted as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedQuote {
    pub vet_amount: String,
    pub minimum_received: String,
}

const BPS_DENOMINATOR: f64 = 10_000.0;

/// Quotes `usdc_amount` at `vet_per_usdc`, discounting the minimum by `slippage_bps`.
///
/// Slippage above 100% is capped.
pub fn quote_conversion(usdc_amount: f64, slippage_bps: u32, vet_per_usdc: f64) -> SimulatedQuote {
    let vet_amount = usdc_amount * vet_per_usdc;
    let slippage = f64::from(slippage_bps.min(10_000)) / BPS_DENOMINATOR;
    let minimum_received = vet_amount * (1.0 - slippage);

    SimulatedQuote {
        vet_amount: format_decimal(vet_amount),
        minimum_received: format!("{:.6}", minimum_received),
    }
}

/// Six-decimal rendering with trailing zeros removed.
pub fn format_decimal(value: f64) -> String {
    let fixed = format!("{:.6}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
