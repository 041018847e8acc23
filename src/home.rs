//! Home landing view: greets the signed-in user and links to the dashboard.

use crate::api::{ApiError, ClinicClient};
use crate::config;
use crate::models::User;
use crate::routes::Route;

/// Sections listed on the landing page, in display order.
pub const SECTIONS: [&str; 4] = ["Staffs", "Patients", "Medicines", "Devices"];

pub const LOADING_TEXT: &str = "Loading data...";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HomeView {
    #[default]
    Loading,
    Ready(User),
}

impl HomeView {
    /// `GET users/`. A failure is logged and the view stays `Loading`.
    pub async fn load(client: &ClinicClient) -> Self {
        Self::try_load(client).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load current user");
            HomeView::Loading
        })
    }

    /// `GET users/`, surfacing the error so callers can react to a rejected
    /// session.
    pub async fn try_load(client: &ClinicClient) -> Result<Self, ApiError> {
        let user = client.current_user().await?;
        tracing::debug!(username = %user.username, "Home data loaded");
        Ok(HomeView::Ready(user))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, HomeView::Ready(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            HomeView::Ready(user) => Some(user),
            HomeView::Loading => None,
        }
    }

    pub fn greeting(&self) -> Option<String> {
        self.user()
            .map(|user| format!("Welcome to {}, {}", config::APP_NAME, user.username))
    }

    pub fn sections(&self) -> &'static [&'static str] {
        if self.is_ready() {
            &SECTIONS
        } else {
            &[]
        }
    }

    pub fn dashboard_link(&self) -> Route {
        Route::Dashboard
    }

    /// Plain-text rendering for the terminal.
    pub fn render(&self) -> String {
        let Some(greeting) = self.greeting() else {
            return LOADING_TEXT.to_string();
        };
        let mut out = format!("{greeting}\n");
        for section in self.sections() {
            out.push_str(&format!("  - {section}\n"));
        }
        out.push_str(&format!("Dashboard: {}\n", self.dashboard_link()));
        out
    }
}
