// numeric helpers behind the benchmark views
// floor-index quartiles, no interpolation, half-away-from-zero rounding

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::StatsError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupAverage {
    pub average: i64,
    pub count: usize,
}

/// Rounds half away from zero to the nearest integer.
pub fn round_half_away(value: f64) -> i64 {
    value.round() as i64
}

/// Rounds half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Min, floor-index Q1/median/Q3 and max. Values are not rounded.
pub fn quartiles(values: &[f64]) -> Result<Quartiles, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let at = |p: f64| {
        let index = ((p * n as f64).floor() as usize).min(n - 1);
        sorted[index]
    };

    Ok(Quartiles {
        min: sorted[0],
        q1: at(0.25),
        median: at(0.5),
        q3: at(0.75),
        max: sorted[n - 1],
    })
}

/// Share of `sorted_ascending` strictly below `value`, as 0..=100.
///
/// A value above every element ranks 100. Ties are not averaged.
pub fn percentile_rank(value: f64, sorted_ascending: &[f64]) -> Result<u8, StatsError> {
    if sorted_ascending.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let n = sorted_ascending.len();
    match sorted_ascending.iter().position(|v| *v >= value) {
        None => Ok(100),
        Some(i) => Ok(round_half_away(100.0 * i as f64 / n as f64) as u8),
    }
}

/// Rounded mean of `value_fn` per `key_fn` partition.
///
/// Keys with no records are absent from the result; callers read a missing
/// key as "insufficient data".
pub fn group_average<T, K, FK, FV>(records: &[T], key_fn: FK, value_fn: FV) -> BTreeMap<K, GroupAverage>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> f64,
{
    let mut totals: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for record in records {
        let slot = totals.entry(key_fn(record)).or_insert((0.0, 0));
        slot.0 += value_fn(record);
        slot.1 += 1;
    }

    totals
        .into_iter()
        .map(|(key, (sum, count))| {
            let average = round_half_away(sum / count as f64);
            (key, GroupAverage { average, count })
        })
        .collect()
}

/// Rounded percentage of records for which `flag_fn` holds.
pub fn percentage_with_flag<T, F>(records: &[T], flag_fn: F) -> Result<u8, StatsError>
where
    F: Fn(&T) -> bool,
{
    let total = records.len();
    if total == 0 {
        return Err(StatsError::DivisionByZero);
    }
    let flagged = records.iter().filter(|r| flag_fn(r)).count();
    Ok(round_half_away(100.0 * flagged as f64 / total as f64) as u8)
}
