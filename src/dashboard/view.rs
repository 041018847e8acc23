//! Dashboard view: concurrent fetches, local state, chart refresh.
//!
//! Opening a view spawns one tokio task per dashboard collection. Tasks run
//! independently and report back over a channel; the view commits one result
//! at a time on the caller's task, so each collection's slice of state has a
//! single writer. After every commit the charts fed by that collection are
//! recomputed and redrawn. Charts are drawn immediately on open with empty
//! data, so the view is always renderable.
//!
//! Lifetime rules:
//! - `teardown()` (or drop) cancels the view, aborts in-flight tasks and
//!   destroys every live chart
//! - A task that completes after teardown discards its result
//! - A failed fetch is logged and leaves its slice untouched

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::charts::{
    billing_chart, entity_chart, satisfaction_chart, weekly_chart, ChartBoard, ChartId,
    ChartRenderer,
};
use super::metrics::DashboardMetrics;
use crate::api::{ApiError, Resource, ResourceSource};
use crate::models::{Appointment, Records};

// ═══════════════════════════════════════════════════════════
// State
// ═══════════════════════════════════════════════════════════

/// Raw collections held by the view. Each starts empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    pub appointments: Vec<Appointment>,
    pub staffs: Records,
    pub patients: Records,
    pub devices: Records,
    pub medicines: Records,
    /// Fetched and held; no chart reads it.
    pub schedule: Records,
    loaded: HashSet<Resource>,
    failed: HashSet<Resource>,
}

impl DashboardState {
    /// Replace one collection with freshly fetched records.
    fn commit(&mut self, resource: Resource, records: Records) -> Result<(), serde_json::Error> {
        match resource {
            Resource::Appointments => {
                self.appointments = records
                    .into_iter()
                    .map(serde_json::from_value)
                    .collect::<Result<_, _>>()?;
            }
            Resource::Staffs => self.staffs = records,
            Resource::Patients => self.patients = records,
            Resource::Devices => self.devices = records,
            Resource::Medicines => self.medicines = records,
            Resource::Schedule => self.schedule = records,
        }
        self.failed.remove(&resource);
        self.loaded.insert(resource);
        Ok(())
    }

    fn mark_failed(&mut self, resource: Resource) {
        self.failed.insert(resource);
    }

    pub fn is_loaded(&self, resource: Resource) -> bool {
        self.loaded.contains(&resource)
    }

    pub fn has_failed(&self, resource: Resource) -> bool {
        self.failed.contains(&resource)
    }

    pub fn metrics(&self, today: NaiveDate) -> DashboardMetrics {
        DashboardMetrics::compute(
            &self.appointments,
            &self.staffs,
            &self.patients,
            &self.devices,
            &self.medicines,
            today,
        )
    }
}

/// Charts whose input includes `resource`.
pub fn charts_fed_by(resource: Resource) -> &'static [ChartId] {
    match resource {
        Resource::Appointments => &[ChartId::Satisfaction, ChartId::Billing, ChartId::Weekly],
        Resource::Staffs | Resource::Patients | Resource::Devices | Resource::Medicines => {
            &[ChartId::Entities]
        }
        Resource::Schedule => &[],
    }
}

// ═══════════════════════════════════════════════════════════
// Cancellation
// ═══════════════════════════════════════════════════════════

/// Cancellation token scoped to one view's lifetime.
#[derive(Debug, Clone, Default)]
pub struct ViewLifetime {
    cancelled: Arc<AtomicBool>,
}

impl ViewLifetime {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// What the view learned from one settled fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Loaded(Resource),
    Failed(Resource),
}

struct FetchResult {
    resource: Resource,
    outcome: Result<Records, ApiError>,
}

// ═══════════════════════════════════════════════════════════
// DashboardView
// ═══════════════════════════════════════════════════════════

pub struct DashboardView<R: ChartRenderer> {
    id: Uuid,
    state: DashboardState,
    charts: ChartBoard<R>,
    updates: mpsc::UnboundedReceiver<FetchResult>,
    tasks: Vec<JoinHandle<()>>,
    lifetime: ViewLifetime,
    today: Option<NaiveDate>,
}

impl<R: ChartRenderer> DashboardView<R> {
    /// Open the view: draw empty charts and start all six fetches.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open<S: ResourceSource>(source: Arc<S>, renderer: R) -> Self {
        Self::open_with_today(source, renderer, None)
    }

    /// Like `open`, with "today" pinned instead of read from the local clock.
    pub fn open_on<S: ResourceSource>(source: Arc<S>, renderer: R, today: NaiveDate) -> Self {
        Self::open_with_today(source, renderer, Some(today))
    }

    fn open_with_today<S: ResourceSource>(
        source: Arc<S>,
        renderer: R,
        today: Option<NaiveDate>,
    ) -> Self {
        let id = Uuid::new_v4();
        let lifetime = ViewLifetime::default();
        let (tx, updates) = mpsc::unbounded_channel();

        let tasks = Resource::DASHBOARD
            .into_iter()
            .map(|resource| spawn_fetch(source.clone(), resource, lifetime.clone(), tx.clone()))
            .collect();
        // Channel closes once every task has reported or been aborted
        drop(tx);

        tracing::info!(view_id = %id, "Dashboard opened, fetching {} collections", Resource::DASHBOARD.len());

        let mut view = Self {
            id,
            state: DashboardState::default(),
            charts: ChartBoard::new(renderer),
            updates,
            tasks,
            lifetime,
            today,
        };
        view.redraw(&ChartId::ALL);
        view
    }

    /// Wait for the next fetch to settle and commit it.
    ///
    /// Returns `None` once every fetch has settled or the view is torn down.
    pub async fn next_update(&mut self) -> Option<Update> {
        if self.lifetime.is_cancelled() {
            return None;
        }
        let FetchResult { resource, outcome } = self.updates.recv().await?;
        if self.lifetime.is_cancelled() {
            tracing::debug!(view_id = %self.id, %resource, "Discarding fetch result after teardown");
            return None;
        }
        Some(self.apply(resource, outcome))
    }

    /// Commit every remaining fetch result.
    pub async fn settle(&mut self) {
        while self.next_update().await.is_some() {}
    }

    /// `settle` with an upper bound. Returns whether every fetch settled.
    pub async fn settle_within(&mut self, limit: Duration) -> bool {
        tokio::time::timeout(limit, self.settle()).await.is_ok()
    }

    fn apply(&mut self, resource: Resource, outcome: Result<Records, ApiError>) -> Update {
        let committed = match outcome {
            Ok(records) => {
                let count = records.len();
                match self.state.commit(resource, records) {
                    Ok(()) => {
                        tracing::debug!(view_id = %self.id, %resource, count, "Collection loaded");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(view_id = %self.id, %resource, error = %e, "Malformed collection");
                        false
                    }
                }
            }
            Err(e) => {
                tracing::warn!(view_id = %self.id, %resource, error = %e, "Dashboard fetch failed");
                false
            }
        };

        if committed {
            self.redraw(charts_fed_by(resource));
            Update::Loaded(resource)
        } else {
            self.state.mark_failed(resource);
            Update::Failed(resource)
        }
    }

    fn redraw(&mut self, surfaces: &[ChartId]) {
        if surfaces.is_empty() {
            return;
        }
        let metrics = self.metrics();
        for surface in surfaces {
            let config = match surface {
                ChartId::Satisfaction => satisfaction_chart(&metrics.satisfaction),
                ChartId::Billing => billing_chart(&metrics.completion_billing),
                ChartId::Weekly => weekly_chart(&metrics.weekly),
                ChartId::Entities => entity_chart(&metrics.entities),
            };
            self.charts.draw(*surface, &config);
        }
    }

    /// Cancel fetches and release every chart. Idempotent.
    pub fn teardown(&mut self) {
        if self.lifetime.is_cancelled() {
            return;
        }
        self.lifetime.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.updates.close();
        self.charts.release_all();
        tracing::info!(view_id = %self.id, "Dashboard torn down");
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn metrics(&self) -> DashboardMetrics {
        self.state.metrics(self.today())
    }

    pub fn charts(&self) -> &ChartBoard<R> {
        &self.charts
    }

    pub fn is_torn_down(&self) -> bool {
        self.lifetime.is_cancelled()
    }
}

impl<R: ChartRenderer> Drop for DashboardView<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn spawn_fetch<S: ResourceSource>(
    source: Arc<S>,
    resource: Resource,
    lifetime: ViewLifetime,
    tx: mpsc::UnboundedSender<FetchResult>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = source.fetch(resource).await;
        if lifetime.is_cancelled() {
            tracing::debug!(%resource, "View gone, dropping fetch result");
            return;
        }
        // Receiver closed means the view was torn down meanwhile
        let _ = tx.send(FetchResult { resource, outcome });
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
