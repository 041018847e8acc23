//! Dashboard metrics: pure aggregation from raw collections to chart series.
//!
//! Every function here is infallible and deterministic for a given input
//! snapshot. Degenerate input (no records, unknown rating codes, missing
//! dates) yields zeros rather than NaN.
//!
//! Two coarse policies are kept on purpose:
//! - Unknown rating codes count toward the total but toward no category, so
//!   the five rating percentages sum to less than 100 when they occur.
//! - The weekly chart matches appointments by weekday only. An appointment
//!   two weeks out lands in the same bucket as one tomorrow if both fall on
//!   the same weekday.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::models::{Appointment, Rating};

/// Weekday names indexed from Sunday = 0.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const ENTITY_LABELS: [&str; 4] = ["Staffs", "Patients", "Devices", "Medicines"];

pub const BILLING_LABELS: [&str; 2] = ["Paid Bills", "Unpaid Bills"];

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// One labeled value of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Ordered label → value mapping handed to the chart layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DerivedSeries {
    points: Vec<SeriesPoint>,
}

impl DerivedSeries {
    pub fn from_pairs<L, I>(pairs: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, f64)>,
    {
        Self {
            points: pairs
                .into_iter()
                .map(|(label, value)| SeriesPoint {
                    label: label.into(),
                    value,
                })
                .collect(),
        }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Value for a label, `None` if the label is not part of the series.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.points.iter().find(|p| p.label == label).map(|p| p.value)
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Completion and billing shares over one appointment snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CompletionBilling {
    pub completed_pct: f64,
    pub paid_pct: f64,
    pub unpaid_pct: f64,
}

impl CompletionBilling {
    /// Two-slice series for the billing pie.
    pub fn billing_series(&self) -> DerivedSeries {
        DerivedSeries::from_pairs([
            (BILLING_LABELS[0], self.paid_pct),
            (BILLING_LABELS[1], self.unpaid_pct),
        ])
    }
}

// ═══════════════════════════════════════════════════════════
// Aggregators
// ═══════════════════════════════════════════════════════════

/// `part / total * 100`, or 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Share of each rating category, in `Rating::ALL` order.
pub fn rating_percentages(appointments: &[Appointment]) -> DerivedSeries {
    let total = appointments.len();
    let mut counts = [0usize; 5];
    for rating in appointments.iter().filter_map(Appointment::rating) {
        if let Some(idx) = Rating::ALL.iter().position(|r| *r == rating) {
            counts[idx] += 1;
        }
    }

    DerivedSeries::from_pairs(
        Rating::ALL
            .iter()
            .zip(counts)
            .map(|(rating, count)| (rating.label(), percentage(count, total))),
    )
}

/// Completed share, paid share and its complement.
///
/// Unpaid is `100 - paid` for a non-empty snapshot and 0 for an empty one.
pub fn completion_billing(appointments: &[Appointment]) -> CompletionBilling {
    let total = appointments.len();
    if total == 0 {
        return CompletionBilling::default();
    }

    let completed = appointments.iter().filter(|a| a.completed).count();
    let paid = appointments.iter().filter(|a| a.feestatus).count();
    let paid_pct = percentage(paid, total);

    CompletionBilling {
        completed_pct: percentage(completed, total),
        paid_pct,
        unpaid_pct: 100.0 - paid_pct,
    }
}

/// Position of `target` in a 7-day window starting on `today`.
pub fn bucket_index(today: Weekday, target: Weekday) -> usize {
    let today = today.num_days_from_sunday() as i64;
    let target = target.num_days_from_sunday() as i64;
    (target - today).rem_euclid(7) as usize
}

/// Appointment counts for the rolling week starting `today`.
///
/// Bucket `i` holds every appointment whose weekday equals the weekday of
/// `today + i`, regardless of which week it falls in. Appointments without a
/// date are not counted.
pub fn weekly_buckets(appointments: &[Appointment], today: NaiveDate) -> DerivedSeries {
    let today_weekday = today.weekday();
    let mut counts = [0usize; 7];

    let mut weekday = today_weekday;
    for _ in 0..7 {
        let matching = appointments
            .iter()
            .filter(|a| a.date.map(|d| d.weekday()) == Some(weekday))
            .count();
        counts[bucket_index(today_weekday, weekday)] = matching;
        weekday = weekday.succ();
    }

    DerivedSeries::from_pairs(
        weekly_labels(today)
            .into_iter()
            .zip(counts)
            .map(|(label, count)| (label, count as f64)),
    )
}

/// Weekday names rotated to start at `today`, each tagged `(day N)` where
/// `N` counts up from today's Sunday-based index.
pub fn weekly_labels(today: NaiveDate) -> Vec<String> {
    let start = today.weekday().num_days_from_sunday() as usize;
    (start..start + 7)
        .map(|i| format!("{}(day {})", WEEKDAY_NAMES[i % 7], i))
        .collect()
}

/// Cardinalities of the four inventory collections.
pub fn entity_counts<S, P, D, M>(
    staffs: &[S],
    patients: &[P],
    devices: &[D],
    medicines: &[M],
) -> DerivedSeries {
    DerivedSeries::from_pairs(ENTITY_LABELS.into_iter().zip([
        staffs.len() as f64,
        patients.len() as f64,
        devices.len() as f64,
        medicines.len() as f64,
    ]))
}

/// Every derived series the dashboard draws, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub satisfaction: DerivedSeries,
    pub completion_billing: CompletionBilling,
    pub weekly: DerivedSeries,
    pub entities: DerivedSeries,
}

impl DashboardMetrics {
    pub fn compute<S, P, D, M>(
        appointments: &[Appointment],
        staffs: &[S],
        patients: &[P],
        devices: &[D],
        medicines: &[M],
        today: NaiveDate,
    ) -> Self {
        Self {
            satisfaction: rating_percentages(appointments),
            completion_billing: completion_billing(appointments),
            weekly: weekly_buckets(appointments, today),
            entities: entity_counts(staffs, patients, devices, medicines),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
