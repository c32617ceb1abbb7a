// salary time machine over a table of annual inflation rates

use serde::{Deserialize, Serialize};

use crate::error::InflationError;
use crate::stats::{round_half_away, round_one_decimal};

// Approximate annual Romanian inflation, Oct 2020 to Oct 2025.
pub const ROMANIAN_RATES: [(&str, f64); 5] = [
    ("2020-2021", 3.9),
    ("2021-2022", 13.8),
    ("2022-2023", 10.4),
    ("2023-2024", 5.5),
    ("2024-2025", 4.5),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    // Oldest period first; salary grows.
    #[default]
    Forward,
    // Newest period first; salary shrinks.
    Backward,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownStep {
    pub year: String,
    pub rate: f64,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    pub original: f64,
    pub adjusted: i64,
    pub difference: i64,
    pub percent_change: f64,
    pub breakdown: Vec<BreakdownStep>,
}

#[derive(Debug, Clone)]
pub struct InflationTable {
    periods: Vec<(String, f64)>,
}

impl Default for InflationTable {
    fn default() -> Self {
        Self::new(ROMANIAN_RATES.iter().map(|(p, r)| (p.to_string(), *r)).collect())
    }
}

impl InflationTable {
    // Periods must be ordered oldest first, rates in percent.
    pub fn new(periods: Vec<(String, f64)>) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> &[(String, f64)] {
        &self.periods
    }

    // Product of all `(1 + r/100)` factors, as a percentage increase.
    pub fn cumulative_percent(&self) -> f64 {
        let factor: f64 = self.periods.iter().map(|(_, r)| 1.0 + r / 100.0).product();
        (factor - 1.0) * 100.0
    }

    pub fn adjust(&self, salary: f64, direction: Direction) -> Result<Adjustment, InflationError> {
        if !salary.is_finite() || salary <= 0.0 {
            return Err(InflationError::InvalidSalary(salary));
        }

        let mut running = salary;
        let mut breakdown = Vec::with_capacity(self.periods.len());

        match direction {
            Direction::Forward => {
                for (period, rate) in &self.periods {
                    running *= 1.0 + rate / 100.0;
                    breakdown.push(BreakdownStep { year: period.clone(), rate: *rate, value: round_half_away(running) });
                }
            }
            Direction::Backward => {
                for (period, rate) in self.periods.iter().rev() {
                    running /= 1.0 + rate / 100.0;
                    breakdown.push(BreakdownStep {
                        year: reverse_period(period),
                        rate: *rate,
                        value: round_half_away(running),
                    });
                }
            }
        }

        let difference = running - salary;
        Ok(Adjustment {
            original: salary,
            adjusted: round_half_away(running),
            difference: round_half_away(difference),
            percent_change: round_one_decimal(difference / salary * 100.0),
            breakdown,
        })
    }
}

// "2024-2025" -> "2025-2024"
fn reverse_period(period: &str) -> String {
    period.split('-').rev().collect::<Vec<_>>().join("-")
}
