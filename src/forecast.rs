// src/forecast.rs

use std::collections::BTreeMap;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use linfa::{prelude::SingleTargetRegression, traits::Fit, DatasetBase};
use linfa_linear::{FittedLinearRegression, LinearRegression};
use ndarray::{Array1, Axis};
use serde::{de::IgnoredAny, Deserialize};
use tracing::{info, warn};
//
use crate::{
    error::{PipelineError, Result},
    order::Order,
};

pub const TRAIN_FRACTION: f64 = 0.8;
pub const DEFAULT_HORIZON: usize = 7;

/// An order's date and amount as stored, before coercion.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SalesRecord {
    #[serde(default)]
    pub order_date: Option<StoredDate>,
    #[serde(default)]
    pub total_amount: Option<Amount>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredDate {
    Text(String),
    Unparsed(IgnoredAny),
}

impl StoredDate {
    fn to_date(&self) -> Option<NaiveDate> {
        match self {
            StoredDate::Text(raw) => parse_date(raw),
            StoredDate::Unparsed(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
    Unparsed(IgnoredAny),
}

impl Amount {
    fn to_number(&self) -> Option<f64> {
        let value = match self {
            Amount::Number(value) => *value,
            Amount::Text(text) => text.trim().parse().ok()?,
            Amount::Unparsed(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<&Order> for SalesRecord {
    fn from(order: &Order) -> Self {
        Self {
            order_date: Some(StoredDate::Text(order.order_date.to_string())),
            total_amount: Some(Amount::Number(order.total_amount)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DailySales {
    pub order_date: NaiveDate,
    pub daily_revenue: f64,
    pub day_index: usize,
    pub iso_week: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeeklySales {
    pub iso_week: u32,
    pub weekly_revenue: f64,
}

/// `daily_revenue = intercept + slope * day_index`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn predict(&self, day_index: usize) -> f64 {
        self.intercept + self.slope * day_index as f64
    }
}

#[derive(Clone, Debug)]
pub struct Forecast {
    pub daily: Vec<DailySales>,
    pub split_index: usize,
    pub trend: TrendLine,
    /// Predictions for `daily[split_index..]`.
    pub predictions: Vec<f64>,
    pub rmse: f64,
    pub weekly: Vec<WeeklySales>,
    pub peak_week: WeeklySales,
    pub low_week: WeeklySales,
    pub projection: Vec<(NaiveDate, f64)>,
}

impl Forecast {
    pub fn training(&self) -> &[DailySales] {
        &self.daily[..self.split_index]
    }

    pub fn test(&self) -> &[DailySales] {
        &self.daily[self.split_index..]
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok().map(|dt| dt.date()))
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok().map(|dt| dt.date()))
}

/// Coerces dates and amounts, dropping rows where either is missing or malformed.
pub fn clean_sales(records: &[SalesRecord]) -> Result<Vec<(NaiveDate, f64)>> {
    let cleaned: Vec<(NaiveDate, f64)> = records
        .iter()
        .filter_map(|record| {
            let date = record.order_date.as_ref()?.to_date()?;
            let amount = record.total_amount.as_ref()?.to_number()?;
            Some((date, amount))
        })
        .collect();

    let dropped = records.len() - cleaned.len();
    if dropped > 0 {
        warn!(dropped, total = records.len(), "dropped sales rows that failed coercion");
    }

    if cleaned.is_empty() {
        return Err(PipelineError::Data { stage: "forecast input cleaning", total: records.len(), dropped });
    }

    Ok(cleaned)
}

/// Sums revenue per date, ascending, indexing days by position.
pub fn daily_sales(rows: &[(NaiveDate, f64)]) -> Vec<DailySales> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for (date, amount) in rows {
        *by_date.entry(*date).or_default() += amount;
    }

    by_date
        .into_iter()
        .enumerate()
        .map(|(day_index, (order_date, daily_revenue))| DailySales {
            order_date,
            daily_revenue,
            day_index,
            iso_week: order_date.iso_week().week(),
        })
        .collect()
}

/// Positional train/test boundary: `floor(0.8 * n)`.
pub fn split_index(n: usize) -> usize {
    (n as f64 * TRAIN_FRACTION).floor() as usize
}

/// Ordinary least squares of daily revenue on day index.
pub fn fit_trend(training: &[DailySales]) -> Result<TrendLine> {
    if training.len() < 2 {
        return Err(PipelineError::InsufficientData { stage: "trend fit", required: 2, actual: training.len() });
    }

    let records = training
        .iter()
        .map(|d| d.day_index as f64)
        .collect::<Array1<f64>>()
        .insert_axis(Axis(1));
    let targets: Array1<f64> = training.iter().map(|d| d.daily_revenue).collect();
    let ds = DatasetBase::from(records).with_targets(targets);

    let model: FittedLinearRegression<f64> = LinearRegression::default()
        .fit(&ds)
        .map_err(PipelineError::model("trend fit"))?;

    Ok(TrendLine { slope: model.params()[0], intercept: model.intercept() })
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if actual.is_empty() {
        return Ok(0.0);
    }
    let actual = Array1::from(actual.to_vec());
    let predicted = Array1::from(predicted.to_vec());

    predicted
        .mean_squared_error(&actual.view())
        .map(f64::sqrt)
        .map_err(PipelineError::model("rmse"))
}

/// Sums daily revenue by ISO week number, ascending.
pub fn weekly_sales(daily: &[DailySales]) -> Vec<WeeklySales> {
    let mut by_week: BTreeMap<u32, f64> = BTreeMap::new();

    for day in daily {
        *by_week.entry(day.iso_week).or_default() += day.daily_revenue;
    }

    by_week
        .into_iter()
        .map(|(iso_week, weekly_revenue)| WeeklySales { iso_week, weekly_revenue })
        .collect()
}

/// Highest and lowest revenue weeks; ties go to the lower week number.
pub fn peak_and_low(weekly: &[WeeklySales]) -> Option<(WeeklySales, WeeklySales)> {
    let first = *weekly.first()?;

    Some(weekly.iter().skip(1).fold((first, first), |(peak, low), week| {
        (
            if week.weekly_revenue > peak.weekly_revenue { *week } else { peak },
            if week.weekly_revenue < low.weekly_revenue { *week } else { low },
        )
    }))
}

pub fn forecast(records: &[SalesRecord], horizon: usize) -> Result<Forecast> {
    let cleaned = clean_sales(records)?;
    forecast_daily(daily_sales(&cleaned), horizon)
}

pub fn forecast_daily(daily: Vec<DailySales>, horizon: usize) -> Result<Forecast> {
    if daily.len() < 2 {
        return Err(PipelineError::InsufficientData { stage: "daily sales", required: 2, actual: daily.len() });
    }

    let split_index = split_index(daily.len());
    let trend = fit_trend(&daily[..split_index])?;

    let test = &daily[split_index..];
    let predictions: Vec<f64> = test.iter().map(|d| trend.predict(d.day_index)).collect();
    let actual: Vec<f64> = test.iter().map(|d| d.daily_revenue).collect();
    let rmse = rmse(&actual, &predictions)?;

    let weekly = weekly_sales(&daily);
    let (peak_week, low_week) = peak_and_low(&weekly).ok_or(PipelineError::InsufficientData {
        stage: "weekly sales",
        required: 1,
        actual: 0,
    })?;

    let last = &daily[daily.len() - 1];
    let projection = (1..=horizon)
        .filter_map(|ahead| {
            let date = last.order_date.checked_add_days(Days::new(ahead as u64))?;
            Some((date, trend.predict(last.day_index + ahead)))
        })
        .collect();

    info!(days = daily.len(), train = split_index, rmse, slope = trend.slope, "fitted revenue trend");

    Ok(Forecast { daily, split_index, trend, predictions, rmse, weekly, peak_week, low_week, projection })
}
