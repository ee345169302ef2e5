//! Pearson correlation between asset price series, and the seeded synthetic
//! price generator used when no real price history is recorded.

use std::collections::HashMap;
use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::FinanceData;

pub const PRICE_SEED: u64 = 42;
pub const DEFAULT_POINTS: usize = 30;
const WALK_START: f64 = 100.0;
const WALK_VOLATILITY: f64 = 2.0;
const PRICE_FLOOR: f64 = 10.0;
const NOISE_SCALE: f64 = 10.0;
const MAX_INVESTMENTS: usize = 5;
const MAX_PROJECTS: usize = 3;

/// Ordered list of `(asset name, prices)`.
pub type PriceSeries = Vec<(String, Vec<f64>)>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    pub assets: Vec<String>,
    values: HashMap<(String, String), f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.values.get(&(a.to_string(), b.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationStrength {
    StrongPositive,
    Moderate,
    Weak,
    ModerateNegative,
    StrongNegative,
}

impl CorrelationStrength {
    pub fn classify(value: f64) -> Self {
        if value > 0.7 {
            CorrelationStrength::StrongPositive
        } else if value > 0.4 {
            CorrelationStrength::Moderate
        } else if value < -0.7 {
            CorrelationStrength::StrongNegative
        } else if value < -0.4 {
            CorrelationStrength::ModerateNegative
        } else {
            CorrelationStrength::Weak
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CorrelationStrength::StrongPositive => "strong +",
            CorrelationStrength::Moderate => "moderate +",
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::ModerateNegative => "moderate -",
            CorrelationStrength::StrongNegative => "strong - (hedge)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationCell {
    pub row: String,
    pub column: String,
    pub value: f64,
    pub strength: CorrelationStrength,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationReport {
    pub assets: Vec<String>,
    pub cells: Vec<CorrelationCell>,
}

impl CorrelationReport {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

pub struct CorrelationService;

impl CorrelationService {
    /// Pearson coefficient in [-1, 1]; 0 for mismatched, empty, or flat series.
    pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
        if x.len() != y.len() || x.is_empty() {
            return 0.0;
        }
        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;

        let (mut covariance, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (a, b) in x.iter().zip(y) {
            let dx = a - mean_x;
            let dy = b - mean_y;
            covariance += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }
        if var_x == 0.0 || var_y == 0.0 {
            return 0.0;
        }
        (covariance / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
    }

    pub fn matrix(prices: &[(String, Vec<f64>)]) -> CorrelationMatrix {
        let mut matrix = CorrelationMatrix {
            assets: prices.iter().map(|(name, _)| name.clone()).collect(),
            values: HashMap::new(),
        };
        for (i, (a, series_a)) in prices.iter().enumerate() {
            matrix.values.insert((a.clone(), a.clone()), 1.0);
            for (b, series_b) in prices.iter().skip(i + 1) {
                let value = Self::pearson(series_a, series_b);
                matrix.values.insert((a.clone(), b.clone()), value);
                matrix.values.insert((b.clone(), a.clone()), value);
            }
        }
        matrix
    }

    /// Deterministic price paths: a shared market random walk mixed with
    /// per-asset noise according to the asset's market beta.
    pub fn synthetic_prices(names: &[String], points: usize) -> PriceSeries {
        let mut rng = StdRng::seed_from_u64(PRICE_SEED);
        let market = Self::random_walk(points, &mut rng);

        names
            .iter()
            .map(|name| {
                let beta = Self::market_beta(name);
                let prices = market
                    .iter()
                    .map(|level| {
                        let noise = (rng.gen::<f64>() - 0.5) * NOISE_SCALE * (1.0 - beta.abs());
                        (level * beta + noise).max(PRICE_FLOOR)
                    })
                    .collect();
                (name.clone(), prices)
            })
            .collect()
    }

    fn random_walk(points: usize, rng: &mut StdRng) -> Vec<f64> {
        let mut values = Vec::with_capacity(points);
        if points == 0 {
            return values;
        }
        values.push(WALK_START);
        for i in 1..points {
            let change = (rng.gen::<f64>() - 0.5) * WALK_VOLATILITY;
            values.push((values[i - 1] + change).max(PRICE_FLOOR));
        }
        values
    }

    pub fn market_beta(name: &str) -> f64 {
        let lower = name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|needle| lower.contains(needle));
        if has(&["btc", "bitcoin"]) {
            0.7
        } else if has(&["eth", "ethereum"]) {
            0.75
        } else if has(&["stock", "s&p"]) {
            0.85
        } else if has(&["gold", "commodity"]) {
            -0.3
        } else if has(&["project", "revenue"]) {
            0.2
        } else {
            0.5
        }
    }

    /// Up to five investments followed by the three highest-revenue projects.
    pub fn assets_for(data: &FinanceData) -> Vec<String> {
        let mut projects: Vec<_> = data.projects.iter().collect();
        projects.sort_by(|a, b| b.revenue().total_cmp(&a.revenue()));

        let mut assets: Vec<String> = Vec::new();
        let candidates = data
            .investments
            .iter()
            .take(MAX_INVESTMENTS)
            .map(|investment| investment.name.clone())
            .chain(
                projects
                    .into_iter()
                    .take(MAX_PROJECTS)
                    .map(|project| project.name.clone()),
            );
        for name in candidates {
            if !assets.contains(&name) {
                assets.push(name);
            }
        }
        assets
    }

    pub fn report(data: &FinanceData, points: usize) -> CorrelationReport {
        let assets = Self::assets_for(data);
        if assets.len() < 2 {
            return CorrelationReport::default();
        }
        let prices = Self::synthetic_prices(&assets, points);
        let matrix = Self::matrix(&prices);

        let mut cells = Vec::with_capacity(assets.len() * assets.len());
        for row in &assets {
            for column in &assets {
                let value = matrix.get(row, column).unwrap_or(0.0);
                cells.push(CorrelationCell {
                    row: row.clone(),
                    column: column.clone(),
                    value,
                    strength: CorrelationStrength::classify(value),
                });
            }
        }
        CorrelationReport { assets, cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Investment, InvestmentKind, Project};
    use chrono::NaiveDate;

    #[test]
    fn pearson_edge_cases() {
        assert_eq!(CorrelationService::pearson(&[], &[]), 0.0);
        assert_eq!(CorrelationService::pearson(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(CorrelationService::pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn pearson_detects_direction() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((CorrelationService::pearson(&x, &up) - 1.0).abs() < 1e-12);
        assert!((CorrelationService::pearson(&x, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let prices = vec![
            ("a".to_string(), vec![1.0, 2.0, 3.0]),
            ("b".to_string(), vec![1.0, 3.0, 2.0]),
            ("c".to_string(), vec![3.0, 2.0, 1.0]),
        ];
        let matrix = CorrelationService::matrix(&prices);
        assert_eq!(matrix.assets, ["a", "b", "c"]);
        assert_eq!(matrix.len(), 9);
        assert_eq!(matrix.get("b", "b"), Some(1.0));
        assert_eq!(matrix.get("a", "c"), matrix.get("c", "a"));
        assert_eq!(matrix.get("a", "c"), Some(-1.0));
    }

    #[test]
    fn synthetic_prices_are_reproducible_and_floored() {
        let names = vec!["BTC".to_string(), "Gold".to_string()];
        let first = CorrelationService::synthetic_prices(&names, 30);
        let second = CorrelationService::synthetic_prices(&names, 30);
        assert_eq!(first, second);
        assert!(first
            .iter()
            .all(|(_, prices)| prices.len() == 30 && prices.iter().all(|p| *p >= 10.0)));
    }

    #[test]
    fn betas_by_name() {
        assert_eq!(CorrelationService::market_beta("My Bitcoin"), 0.7);
        assert_eq!(CorrelationService::market_beta("S&P 500"), 0.85);
        assert_eq!(CorrelationService::market_beta("gold bars"), -0.3);
        assert_eq!(CorrelationService::market_beta("Client project"), 0.2);
        assert_eq!(CorrelationService::market_beta("Bonds"), 0.5);
    }

    #[test]
    fn report_needs_two_distinct_assets() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut data = FinanceData::seeded();
        data.investments
            .push(Investment::new("Alpha", InvestmentKind::Stock, 1.0, 1.0, date));
        data.projects.push(Project::new("Alpha", 10.0, date));
        assert!(CorrelationService::report(&data, 30).is_empty());

        data.investments
            .push(Investment::new("BTC", InvestmentKind::Crypto, 1.0, 1.0, date));
        let report = CorrelationService::report(&data, 30);
        assert_eq!(report.assets, ["Alpha", "BTC"]);
        assert_eq!(report.cells.len(), 4);
        assert_eq!(report.cells[0].strength, CorrelationStrength::StrongPositive);
        assert!(report.cells.iter().all(|cell| (-1.0..=1.0).contains(&cell.value)));
    }
}
