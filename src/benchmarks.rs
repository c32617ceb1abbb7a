// dashboard views over compensation records

use serde::Serialize;

use crate::error::StatsError;
use crate::models::CompensationRecord;
use crate::stats::{self, GroupAverage, Quartiles};

/// Records considered when summarizing the market for the AI analysis.
pub const MARKET_SAMPLE_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceBenchmark {
    pub experience_level: String,
    pub company_size: String,
    pub avg_gross_salary: i64,
    pub avg_net_salary: i64,
    pub avg_benefits: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAverage {
    pub city: String,
    pub avg_salary: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryPosition {
    pub gross_salary: f64,
    pub percentile: u8,
    pub quartiles: Quartiles,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenefitCoverage {
    pub meal_vouchers: u8,
    pub health_insurance: u8,
    pub life_insurance: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub entries: usize,
    pub average_gross: i64,
    pub min_gross: f64,
    pub max_gross: f64,
}

/// Averages per (experience level, company size) within one city.
pub fn experience_benchmarks(records: &[CompensationRecord], city: &str) -> Vec<ExperienceBenchmark> {
    let in_city: Vec<&CompensationRecord> = records.iter().filter(|r| r.city == city).collect();
    let key = |r: &&CompensationRecord| (r.experience_level.clone(), r.company_size.clone());

    let gross = stats::group_average(&in_city, key, |r| r.gross_salary);
    let net = stats::group_average(&in_city, key, |r| r.net_salary);
    let benefits = stats::group_average(&in_city, key, |r| r.monthly_benefits());

    gross
        .into_iter()
        .map(|(group, GroupAverage { average, count })| {
            let avg_net_salary = net.get(&group).map(|g| g.average).unwrap_or_default();
            let avg_benefits = benefits.get(&group).map(|g| g.average).unwrap_or_default();
            let (experience_level, company_size) = group;
            ExperienceBenchmark {
                experience_level,
                company_size,
                avg_gross_salary: average,
                avg_net_salary,
                avg_benefits,
                count,
            }
        })
        .collect()
}

pub fn city_averages(records: &[CompensationRecord]) -> Vec<CityAverage> {
    stats::group_average(records, |r| r.city.clone(), |r| r.gross_salary)
        .into_iter()
        .map(|(city, g)| CityAverage { city, avg_salary: g.average, count: g.count })
        .collect()
}

/// Where `gross_salary` falls among the records' gross salaries.
pub fn salary_position(records: &[CompensationRecord], gross_salary: f64) -> Result<SalaryPosition, StatsError> {
    let mut salaries: Vec<f64> = records.iter().map(|r| r.gross_salary).collect();
    salaries.sort_by(f64::total_cmp);

    Ok(SalaryPosition {
        gross_salary,
        percentile: stats::percentile_rank(gross_salary, &salaries)?,
        quartiles: stats::quartiles(&salaries)?,
        sample_size: salaries.len(),
    })
}

pub fn benefit_coverage(records: &[CompensationRecord]) -> Result<BenefitCoverage, StatsError> {
    Ok(BenefitCoverage {
        meal_vouchers: stats::percentage_with_flag(records, CompensationRecord::meal_vouchers)?,
        health_insurance: stats::percentage_with_flag(records, CompensationRecord::health_insurance)?,
        life_insurance: stats::percentage_with_flag(records, CompensationRecord::life_insurance)?,
    })
}

/// Average and range of gross salary over the first [`MARKET_SAMPLE_LIMIT`] records.
pub fn market_summary(records: &[CompensationRecord]) -> Option<MarketSummary> {
    let sample = &records[..records.len().min(MARKET_SAMPLE_LIMIT)];
    let gross: Vec<f64> = sample.iter().map(|r| r.gross_salary).collect();
    let range = stats::quartiles(&gross).ok()?;

    Some(MarketSummary {
        entries: gross.len(),
        average_gross: stats::round_half_away(gross.iter().sum::<f64>() / gross.len() as f64),
        min_gross: range.min,
        max_gross: range.max,
    })
}
