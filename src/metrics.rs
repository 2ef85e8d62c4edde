//! Derived wellness statistics
//!
//! Pure functions over already-fetched record sequences; no I/O here. Pages
//! pull rows through the stores and hand them to this module for display.

use chrono::{Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::ActivityInsight;

/// Scores at or above this count toward a "goals met" day
pub const GOAL_SCORE_THRESHOLD: i64 = 70;

/// Day-over-day score deltas under this count as stable
pub const STABLE_DELTA: f64 = 20.0;

/// ---------------------------------------------------------------------------
/// Scalar Helpers
/// ---------------------------------------------------------------------------

/// Average of a numeric field across a sequence; 0 for the empty sequence
pub fn average<T, F>(items: &[T], field: F) -> f64
where
  F: Fn(&T) -> f64,
{
  if items.is_empty() {
    return 0.0;
  }
  items.iter().map(field).sum::<f64>() / items.len() as f64
}

/// Percentage change from previous to current, defined as exactly 100 when
/// previous is 0 (even when current is also 0)
pub fn percentage_change(current: f64, previous: f64) -> f64 {
  if previous == 0.0 {
    return 100.0;
  }
  (current - previous) / previous * 100.0
}

fn score_or_zero(score: Option<i64>) -> f64 {
  score.map(|s| s as f64).unwrap_or(0.0)
}

/// ---------------------------------------------------------------------------
/// Daily Scores
/// ---------------------------------------------------------------------------

/// Day-over-day stability of sleep and productivity scores, 0-100.
///
/// Each adjacent day pair contributes one point per score whose delta stays
/// under 20; the result is points over the maximum. Fewer than two days
/// score 0. Expects the sequence ordered by date.
pub fn consistency_score(days: &[ActivityInsight]) -> f64 {
  if days.len() < 2 {
    return 0.0;
  }

  let mut points = 0u32;
  for pair in days.windows(2) {
    let sleep_delta =
      (score_or_zero(pair[1].sleep_score) - score_or_zero(pair[0].sleep_score)).abs();
    let productivity_delta = (score_or_zero(pair[1].productivity_score)
      - score_or_zero(pair[0].productivity_score))
    .abs();

    if sleep_delta < STABLE_DELTA {
      points += 1;
    }
    if productivity_delta < STABLE_DELTA {
      points += 1;
    }
  }

  points as f64 / (2.0 * (days.len() - 1) as f64) * 100.0
}

/// A day meets the goals when both scores are present and at least 70
pub fn meets_goals(day: &ActivityInsight) -> bool {
  day.sleep_score.is_some_and(|s| s >= GOAL_SCORE_THRESHOLD)
    && day.productivity_score.is_some_and(|s| s >= GOAL_SCORE_THRESHOLD)
}

pub fn goals_met_count(days: &[ActivityInsight]) -> usize {
  days.iter().filter(|d| meets_goals(d)).count()
}

/// ---------------------------------------------------------------------------
/// Weekly Buckets
/// ---------------------------------------------------------------------------

/// One ISO-week-aligned slice of a month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyBucket {
  /// Monday of the week
  pub week_start: NaiveDate,
  pub commit_count: i64,
  pub active_hours: i64,
  pub avg_sleep_score: f64,
  pub avg_productivity_score: f64,
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
  let (next_year, next_month) = if month == 12 {
    (year + 1, 1)
  } else {
    (year, month + 1)
  };
  NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
}

/// Partition a month's insights into ISO-week buckets starting from the week
/// containing the 1st. Counts are summed, scores averaged, empty buckets 0.
pub fn weekly_buckets(year: i32, month: u32, insights: &[ActivityInsight]) -> Vec<WeeklyBucket> {
  let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
    return Vec::new();
  };
  let Some(month_end) = last_day_of_month(year, month) else {
    return Vec::new();
  };

  let mut week_start = month_start.week(Weekday::Mon).first_day();
  let mut buckets = Vec::new();

  while week_start <= month_end {
    let week_end = week_start + Days::new(6);
    let in_week: Vec<&ActivityInsight> = insights
      .iter()
      .filter(|i| i.date >= week_start && i.date <= week_end)
      .collect();

    buckets.push(WeeklyBucket {
      week_start,
      commit_count: in_week.iter().map(|i| i.commit_count).sum(),
      active_hours: in_week.iter().map(|i| i.active_hours).sum(),
      avg_sleep_score: average(&in_week, |i| score_or_zero(i.sleep_score)),
      avg_productivity_score: average(&in_week, |i| score_or_zero(i.productivity_score)),
    });

    week_start = week_start + Days::new(7);
  }

  buckets
}

/// ---------------------------------------------------------------------------
/// Monthly Report
/// ---------------------------------------------------------------------------

/// Aggregates for the monthly report page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
  pub avg_sleep_score: f64,
  pub avg_productivity_score: f64,
  pub total_commits: i64,
  pub total_active_hours: i64,
  pub goals_met_days: usize,
  pub consistency: f64,
  /// Percentage deltas vs the previous month's averages
  pub sleep_delta_pct: f64,
  pub productivity_delta_pct: f64,
  pub weeks: Vec<WeeklyBucket>,
}

impl MonthlySummary {
  /// Compute from the month's insights (ordered by date) and the previous
  /// month's set for the deltas
  pub fn compute(
    year: i32,
    month: u32,
    insights: &[ActivityInsight],
    previous: &[ActivityInsight],
  ) -> Self {
    let avg_sleep_score = average(insights, |i| score_or_zero(i.sleep_score));
    let avg_productivity_score = average(insights, |i| score_or_zero(i.productivity_score));

    let previous_sleep = average(previous, |i| score_or_zero(i.sleep_score));
    let previous_productivity = average(previous, |i| score_or_zero(i.productivity_score));

    Self {
      avg_sleep_score,
      avg_productivity_score,
      total_commits: insights.iter().map(|i| i.commit_count).sum(),
      total_active_hours: insights.iter().map(|i| i.active_hours).sum(),
      goals_met_days: goals_met_count(insights),
      consistency: consistency_score(insights),
      sleep_delta_pct: percentage_change(avg_sleep_score, previous_sleep),
      productivity_delta_pct: percentage_change(avg_productivity_score, previous_productivity),
      weeks: weekly_buckets(year, month, insights),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
