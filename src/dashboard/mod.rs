//! Hospital dashboard: metrics derived from backend collections, chart
//! configurations, and the view that fetches and redraws them.

pub mod charts;
pub mod metrics;
pub mod view;

pub use charts::{ChartBoard, ChartConfig, ChartId, ChartRenderer, TextRenderer};
pub use metrics::{DashboardMetrics, DerivedSeries};
pub use view::{DashboardState, DashboardView, Update};
