pub mod api;
pub mod config;
pub mod dashboard;
pub mod home;
pub mod login;
pub mod models;
pub mod routes;
pub mod session;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use api::{ApiError, ClinicClient};
use config::ClientConfig;
use dashboard::{DashboardView, TextRenderer};
use home::HomeView;
use login::{LoginError, LoginForm};
use session::{Session, SessionError, TokenStore};

/// Errors that stop the command-line client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No stored session and BKCLINIC_EMAIL / BKCLINIC_PASSWORD are not set")]
    NoCredentials,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

pub fn run() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ClientConfig::from_env();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match std::env::args().nth(1).as_deref() {
        Some("logout") => logout(&config),
        _ => runtime.block_on(show_dashboard(config)),
    }
}

fn logout(config: &ClientConfig) -> Result<(), AppError> {
    let store = TokenStore::new(&config.storage_path);
    match Session::restore(&store)? {
        Some(session) => session.logout(&store)?,
        None => tracing::info!("No stored session"),
    }
    Ok(())
}

/// Sign in (or reuse the stored token), greet the user, then load and print
/// the dashboard charts.
async fn show_dashboard(config: ClientConfig) -> Result<(), AppError> {
    let store = TokenStore::new(&config.storage_path);
    let (client, home) = sign_in(&config, &store).await?;
    println!("{}", home.render());

    let mut view = DashboardView::open(Arc::new(client), TextRenderer::new());
    let limit = Duration::from_secs(config::DASHBOARD_SETTLE_SECS);
    if !view.settle_within(limit).await {
        tracing::warn!(
            "Dashboard fetches still pending after {}s, showing partial data",
            limit.as_secs()
        );
    }
    println!("{}", view.charts().renderer().output());

    view.teardown();
    Ok(())
}

/// Authenticated client plus the loaded home view.
///
/// A stored token the backend rejects is cleared and replaced by a fresh
/// login with the configured credentials.
async fn sign_in(
    config: &ClientConfig,
    store: &TokenStore,
) -> Result<(ClinicClient, HomeView), AppError> {
    let client = ClinicClient::from_config(config)?;

    let Some(session) = Session::restore(store)? else {
        let client = login_with_credentials(client, config, store).await?;
        let home = HomeView::load(&client).await;
        return Ok((client, home));
    };

    let client = client.with_session(Arc::new(session));
    match HomeView::try_load(&client).await {
        Ok(home) => Ok((client, home)),
        Err(e) if e.is_unauthorized() => {
            tracing::warn!(error = %e, "Stored session rejected, signing in again");
            Session::clear(store)?;
            let client = login_with_credentials(client.without_session(), config, store).await?;
            let home = HomeView::load(&client).await;
            Ok((client, home))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load current user");
            Ok((client, HomeView::Loading))
        }
    }
}

async fn login_with_credentials(
    client: ClinicClient,
    config: &ClientConfig,
    store: &TokenStore,
) -> Result<ClinicClient, AppError> {
    let (email, password) = config.credentials.clone().ok_or(AppError::NoCredentials)?;
    let logged_in = LoginForm::new(email, password).submit(&client, store).await?;
    Ok(client.with_session(Arc::new(logged_in.session)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support::{spawn_backend, BackendFixture};

    fn setup(
        base: &str,
        dir: &tempfile::TempDir,
        with_credentials: bool,
    ) -> (ClientConfig, TokenStore) {
        let mut config = ClientConfig::new(base);
        config.timeout = Duration::from_secs(5);
        config.storage_path = dir.path().join("storage.json");
        if with_credentials {
            config.credentials = Some((
                BackendFixture::EMAIL.to_string(),
                BackendFixture::PASSWORD.to_string(),
            ));
        }
        let store = TokenStore::new(&config.storage_path);
        (config, store)
    }

    fn stored_token(store: &TokenStore) -> Option<String> {
        store.get(config::TOKEN_KEY).unwrap()
    }

    #[tokio::test]
    async fn stored_token_is_reused() {
        let base = spawn_backend(BackendFixture::default().require_token("tok-saved")).await;
        let dir = tempfile::tempdir().unwrap();
        let (config, store) = setup(&base, &dir, false);
        Session::new("tok-saved".into()).persist(&store).unwrap();

        let (_client, home) = sign_in(&config, &store).await.unwrap();
        assert!(home.is_ready());
        assert_eq!(stored_token(&store).as_deref(), Some("tok-saved"));
    }

    #[tokio::test]
    async fn no_stored_token_logs_in() {
        let base =
            spawn_backend(BackendFixture::default().require_token(BackendFixture::TOKEN)).await;
        let dir = tempfile::tempdir().unwrap();
        let (config, store) = setup(&base, &dir, true);

        let (client, home) = sign_in(&config, &store).await.unwrap();
        assert!(home.is_ready());
        assert!(client.session().is_some());
        assert_eq!(stored_token(&store).as_deref(), Some(BackendFixture::TOKEN));
    }

    #[tokio::test]
    async fn rejected_token_is_replaced_by_fresh_login() {
        let base =
            spawn_backend(BackendFixture::default().require_token(BackendFixture::TOKEN)).await;
        let dir = tempfile::tempdir().unwrap();
        let (config, store) = setup(&base, &dir, true);
        Session::new("tok-stale".into()).persist(&store).unwrap();

        let (client, home) = sign_in(&config, &store).await.unwrap();
        assert_eq!(home.user().unwrap().username, "jcathrine");
        assert_eq!(
            client.session().unwrap().authorization(),
            format!("Token {}", BackendFixture::TOKEN)
        );
        assert_eq!(stored_token(&store).as_deref(), Some(BackendFixture::TOKEN));
    }

    #[tokio::test]
    async fn rejected_token_without_credentials_is_cleared() {
        let base =
            spawn_backend(BackendFixture::default().require_token(BackendFixture::TOKEN)).await;
        let dir = tempfile::tempdir().unwrap();
        let (config, store) = setup(&base, &dir, false);
        Session::new("tok-stale".into()).persist(&store).unwrap();

        let err = sign_in(&config, &store).await.unwrap_err();
        assert!(matches!(err, AppError::NoCredentials));
        assert_eq!(stored_token(&store), None);
    }
}
