//! The HTTP front end.
//!
//! Routes:
//!
//! | Method | Path                 | Handler                    |
//! |--------|----------------------|----------------------------|
//! | GET    | `/`                  | empty submission form      |
//! | POST   | `/`                  | store, notify, confirm     |
//! | GET    | `/records`           | all records, newest first  |
//! | GET    | `/record/{id}/pdf`   | PDF download, 404 if absent|
//!
//! Handlers open a short-lived [`Storage`] per request on tokio's blocking
//! pool; nothing is shared between requests except [`AppState`].

mod handlers;
pub mod pages;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::storage::Storage;

pub use handlers::PageError;

/// Shared state injected into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    database_path: Arc<PathBuf>,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create state for a database file and a notifier.
    pub fn new(database_path: impl Into<PathBuf>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            database_path: Arc::new(database_path.into()),
            notifier,
        }
    }

    /// The database file requests operate on.
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Run `f` against a fresh storage connection on the blocking pool.
    pub(crate) async fn with_storage<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Storage) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = Arc::clone(&self.database_path);
        tokio::task::spawn_blocking(move || {
            let storage = Storage::open(path.as_path())?;
            f(&storage)
        })
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::form).post(handlers::submit))
        .route("/records", get(handlers::records))
        .route("/record/{id}/pdf", get(handlers::export))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the application on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    // Make sure the database is usable before accepting requests
    let records = state.with_storage(|storage| storage.count()).await?;

    let listener = TcpListener::bind(addr).await?;
    info!(
        address = %listener.local_addr()?,
        database = %state.database_path().display(),
        records,
        "Listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server runs until killed
        std::future::pending::<()>().await;
    }
}
