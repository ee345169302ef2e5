//! Supported currencies, exchange-rate lookup with caching and offline fallbacks,
//! and money formatting.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::errors::FinanceError;

pub const DEFAULT_CURRENCY: &str = "RUB";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

const SUPPORTED: [Currency; 7] = [
    Currency { code: "RUB", name: "Russian ruble", symbol: "₽" },
    Currency { code: "USD", name: "US dollar", symbol: "$" },
    Currency { code: "EUR", name: "Euro", symbol: "€" },
    Currency { code: "GBP", name: "Pound sterling", symbol: "£" },
    Currency { code: "JPY", name: "Japanese yen", symbol: "¥" },
    Currency { code: "CNY", name: "Chinese yuan", symbol: "¥" },
    Currency { code: "KRW", name: "South Korean won", symbol: "₩" },
];

/// Rates quoted against RUB, used whenever no live quote is available.
const FALLBACK_RATES: [(&str, &str, f64); 6] = [
    ("USD", "RUB", 90.0),
    ("EUR", "RUB", 98.0),
    ("GBP", "RUB", 115.0),
    ("JPY", "RUB", 0.6),
    ("CNY", "RUB", 12.5),
    ("KRW", "RUB", 0.07),
];

pub fn supported() -> &'static [Currency] {
    &SUPPORTED
}

pub fn find(code: &str) -> Option<&'static Currency> {
    SUPPORTED
        .iter()
        .find(|currency| currency.code.eq_ignore_ascii_case(code.trim()))
}

pub fn is_supported(code: &str) -> bool {
    find(code).is_some()
}

/// Symbol for a known code, otherwise the code itself.
pub fn symbol(code: &str) -> String {
    find(code).map_or_else(|| code.to_uppercase(), |currency| currency.symbol.to_string())
}

pub fn fallback_rate(from: &str, to: &str) -> f64 {
    if let Some((_, _, rate)) = FALLBACK_RATES
        .iter()
        .find(|(f, t, _)| f.eq_ignore_ascii_case(from) && t.eq_ignore_ascii_case(to))
    {
        return *rate;
    }
    if let Some((_, _, rate)) = FALLBACK_RATES
        .iter()
        .find(|(f, t, _)| f.eq_ignore_ascii_case(to) && t.eq_ignore_ascii_case(from))
    {
        return 1.0 / rate;
    }
    1.0
}

/// Source of live quotes: a map of `target code -> rate` for one base currency.
pub trait RateProvider {
    fn latest(&self, base: &str) -> Result<HashMap<String, f64>, FinanceError>;
}

/// Provider used when no network client is wired in; every lookup fails so the
/// fallback table applies.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRates;

impl RateProvider for OfflineRates {
    fn latest(&self, base: &str) -> Result<HashMap<String, f64>, FinanceError> {
        Err(FinanceError::NotFound(format!("live rates for {base} (offline)")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateSource {
    Identity,
    Cache,
    Provider,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub rate: f64,
    pub source: RateSource,
}

/// Every rate the provider returned for one base, stamped with the fetch time.
#[derive(Debug, Clone)]
struct RateTable {
    rates: HashMap<String, f64>,
    fetched_at: DateTime<Utc>,
}

pub struct CurrencyService<P: RateProvider> {
    provider: P,
    ttl: Duration,
    cache: HashMap<String, RateTable>,
}

impl CurrencyService<OfflineRates> {
    pub fn offline(ttl_minutes: i64) -> Self {
        Self::new(OfflineRates, ttl_minutes)
    }
}

impl<P: RateProvider> CurrencyService<P> {
    pub fn new(provider: P, ttl_minutes: i64) -> Self {
        Self {
            provider,
            ttl: Duration::minutes(ttl_minutes.max(0)),
            cache: HashMap::new(),
        }
    }

    pub fn quote(&mut self, from: &str, to: &str, now: DateTime<Utc>) -> Quote {
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();
        if from == to {
            return Quote { rate: 1.0, source: RateSource::Identity };
        }

        if let Some(table) = self.cache.get(&from) {
            if now - table.fetched_at < self.ttl {
                if let Some(rate) = table.rates.get(&to) {
                    return Quote { rate: *rate, source: RateSource::Cache };
                }
                debug!(%from, %to, "cached table has no quote, using fallback");
                return Self::fallback(&from, &to);
            }
        }

        match self.provider.latest(&from) {
            Ok(rates) => {
                let rates: HashMap<String, f64> = rates
                    .into_iter()
                    .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
                    .map(|(code, rate)| (code.trim().to_uppercase(), rate))
                    .collect();
                debug!(%from, count = rates.len(), "fetched exchange rates");
                let quoted = rates.get(&to).copied();
                self.cache.insert(from.clone(), RateTable { rates, fetched_at: now });
                if let Some(rate) = quoted {
                    return Quote { rate, source: RateSource::Provider };
                }
                debug!(%from, %to, "provider has no quote, using fallback");
            }
            Err(err) => warn!(%from, %to, error = %err, "rate lookup failed, using fallback"),
        }
        Self::fallback(&from, &to)
    }

    fn fallback(from: &str, to: &str) -> Quote {
        Quote {
            rate: fallback_rate(from, to),
            source: RateSource::Fallback,
        }
    }

    pub fn rate(&mut self, from: &str, to: &str, now: DateTime<Utc>) -> f64 {
        self.quote(from, to, now).rate
    }

    pub fn convert(&mut self, amount: f64, from: &str, to: &str, now: DateTime<Utc>) -> f64 {
        amount * self.rate(from, to, now)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Formats with `,` thousands separators and a fixed number of decimals.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (formatted.as_str(), None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (index, ch) in int_part.chars().enumerate() {
        if index > 0 && (int_part.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `1,234.50 ₽`
pub fn format_money(amount: f64, code: &str) -> String {
    format!("{} {}", format_grouped(amount, 2), symbol(code))
}
