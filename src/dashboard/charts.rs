//! Chart configuration and the lifecycle of live charts.
//!
//! Series from `metrics` become `ChartConfig`s with fixed labels, colours and
//! chart kinds. A `ChartRenderer` turns a config into a live chart bound to a
//! drawing surface. `ChartBoard` owns one surface per `ChartId` and always
//! destroys the previous chart on a surface before creating the next, so
//! repeated refreshes never leak charts.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use super::metrics::{CompletionBilling, DerivedSeries};
use crate::models::ChartKind;

const RATING_COLORS: [&str; 5] = [
    "rgba(255, 99, 132, 0.5)",
    "rgba(54, 162, 235, 0.5)",
    "rgba(255, 206, 86, 0.5)",
    "rgba(75, 192, 192, 0.5)",
    "rgba(153, 102, 255, 0.5)",
];

const BILLING_COLORS: [&str; 2] = ["rgba(255, 255, 0, 0.1)", "rgba(0, 255, 0, 0.35)"];

const WEEKLY_FILL: &str = "rgba(255, 99, 132, 0.5)";
const WEEKLY_BORDER: &str = "rgba(255, 99, 132, 1)";

const ENTITY_COLORS: [&str; 4] = [
    "rgba(54, 162, 235, 0.5)",
    "rgba(255, 99, 132, 0.5)",
    "rgba(255, 206, 86, 0.5)",
    "rgba(153, 102, 255, 0.5)",
];

// ═══════════════════════════════════════════════════════════
// Config types
// ═══════════════════════════════════════════════════════════

/// The chart surfaces on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    Satisfaction,
    Billing,
    Weekly,
    Entities,
}

impl ChartId {
    pub const ALL: [ChartId; 4] = [
        ChartId::Satisfaction,
        ChartId::Billing,
        ChartId::Weekly,
        ChartId::Entities,
    ];
}

/// How data labels are printed on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// Integer counts.
    Count,
    /// Two decimals with a percent sign.
    Percent,
}

impl ValueFormat {
    pub fn format(&self, value: f64) -> String {
        match self {
            ValueFormat::Count => format!("{value:.0}"),
            ValueFormat::Percent => format!("{value:.2}%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
}

/// Renderer-agnostic description of one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub value_format: ValueFormat,
}

impl ChartConfig {
    fn from_series(kind: ChartKind, series: &DerivedSeries, dataset: Dataset) -> Self {
        Self {
            kind,
            title: None,
            labels: series.labels().into_iter().map(String::from).collect(),
            datasets: vec![dataset],
            value_format: ValueFormat::Count,
        }
    }

    /// First dataset's values paired with labels.
    pub fn rows(&self) -> Vec<(&str, f64)> {
        let data = self.datasets.first().map(|d| d.data.as_slice()).unwrap_or(&[]);
        self.labels
            .iter()
            .map(String::as_str)
            .zip(data.iter().copied())
            .collect()
    }
}

fn colors(palette: &[&str]) -> Vec<String> {
    palette.iter().map(|c| c.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════
// Chart builders
// ═══════════════════════════════════════════════════════════

/// Pie of rating shares.
pub fn satisfaction_chart(series: &DerivedSeries) -> ChartConfig {
    let mut config = ChartConfig::from_series(
        ChartKind::Pie,
        series,
        Dataset {
            label: "Satisfaction of Patients".into(),
            data: series.values(),
            background_color: colors(&RATING_COLORS),
            border_color: None,
            border_width: None,
        },
    );
    config.value_format = ValueFormat::Percent;
    config
}

/// Pie of paid vs unpaid bills.
pub fn billing_chart(metrics: &CompletionBilling) -> ChartConfig {
    let series = metrics.billing_series();
    let mut config = ChartConfig::from_series(
        ChartKind::Pie,
        &series,
        Dataset {
            label: "Percentage Of Bills".into(),
            data: series.values(),
            background_color: colors(&BILLING_COLORS),
            border_color: Some("yellow".into()),
            border_width: None,
        },
    );
    config.title = Some("Percent Satisfaction and Billing Status".into());
    config.value_format = ValueFormat::Percent;
    config
}

/// Bar of appointments per day of the coming week.
pub fn weekly_chart(series: &DerivedSeries) -> ChartConfig {
    ChartConfig::from_series(
        ChartKind::Bar,
        series,
        Dataset {
            label: "Appointments".into(),
            data: series.values(),
            background_color: vec![WEEKLY_FILL.to_string()],
            border_color: Some(WEEKLY_BORDER.into()),
            border_width: Some(1),
        },
    )
}

/// Bar of staff, patient, device and medicine totals.
pub fn entity_chart(series: &DerivedSeries) -> ChartConfig {
    ChartConfig::from_series(
        ChartKind::Bar,
        series,
        Dataset {
            label: "Amount".into(),
            data: series.values(),
            background_color: colors(&ENTITY_COLORS),
            border_color: None,
            border_width: None,
        },
    )
}

// ═══════════════════════════════════════════════════════════
// Renderer seam
// ═══════════════════════════════════════════════════════════

/// A live chart. Not `Clone`: exactly one owner may destroy it.
#[derive(Debug, PartialEq, Eq)]
pub struct ChartHandle {
    id: Uuid,
    surface: ChartId,
}

impl ChartHandle {
    pub fn new(surface: ChartId) -> Self {
        Self {
            id: Uuid::new_v4(),
            surface,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn surface(&self) -> ChartId {
        self.surface
    }
}

/// Draws charts onto surfaces and releases them.
pub trait ChartRenderer: Send {
    fn create(&mut self, surface: ChartId, config: &ChartConfig) -> ChartHandle;
    fn destroy(&mut self, handle: ChartHandle);
}

/// Owns the renderer and at most one live chart per surface.
pub struct ChartBoard<R: ChartRenderer> {
    renderer: R,
    live: BTreeMap<ChartId, ChartHandle>,
}

impl<R: ChartRenderer> ChartBoard<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            live: BTreeMap::new(),
        }
    }

    /// Replace the chart on `surface`: destroy the old one, then create.
    pub fn draw(&mut self, surface: ChartId, config: &ChartConfig) {
        self.release(surface);
        let handle = self.renderer.create(surface, config);
        self.live.insert(surface, handle);
    }

    /// Destroy the chart on `surface`, if any.
    pub fn release(&mut self, surface: ChartId) {
        if let Some(old) = self.live.remove(&surface) {
            self.renderer.destroy(old);
        }
    }

    pub fn release_all(&mut self) {
        for surface in ChartId::ALL {
            self.release(surface);
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: ChartRenderer> Drop for ChartBoard<R> {
    fn drop(&mut self) {
        self.release_all();
    }
}

// ═══════════════════════════════════════════════════════════
// TextRenderer: terminal output
// ═══════════════════════════════════════════════════════════

const BAR_WIDTH: usize = 30;

/// Renders charts as plain text blocks, one per live surface.
#[derive(Debug, Default)]
pub struct TextRenderer {
    charts: BTreeMap<ChartId, (Uuid, String)>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All live charts, in surface order.
    pub fn output(&self) -> String {
        self.charts
            .values()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn chart_text(&self, surface: ChartId) -> Option<&str> {
        self.charts.get(&surface).map(|(_, text)| text.as_str())
    }
}

pub fn render_text(surface: ChartId, config: &ChartConfig) -> String {
    let heading = config.title.clone().unwrap_or_else(|| {
        config
            .datasets
            .first()
            .map(|d| d.label.clone())
            .unwrap_or_else(|| format!("{surface:?}"))
    });

    let rows = config.rows();
    let max = rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

    let mut out = format!("== {heading} ({}) ==\n", config.kind);
    for (label, value) in rows {
        let filled = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{label:<label_width$} |{}{}| {}\n",
            "#".repeat(filled),
            " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            config.value_format.format(value),
        ));
    }
    out
}

impl ChartRenderer for TextRenderer {
    fn create(&mut self, surface: ChartId, config: &ChartConfig) -> ChartHandle {
        let handle = ChartHandle::new(surface);
        self.charts
            .insert(surface, (handle.id(), render_text(surface, config)));
        handle
    }

    fn destroy(&mut self, handle: ChartHandle) {
        if let Some((id, _)) = self.charts.get(&handle.surface()) {
            if *id == handle.id() {
                self.charts.remove(&handle.surface());
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
