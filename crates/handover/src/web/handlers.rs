//! Request handlers.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use tracing::{debug, error, info, warn};

use super::{pages, AppState};
use crate::document;
use crate::error::Error;
use crate::notify::Delivery;
use crate::record::{Field, HandoverFields};

/// An error on its way to becoming an HTML error page.
#[derive(Debug)]
pub struct PageError(Error);

impl From<Error> for PageError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.is_not_found() {
            return (StatusCode::NOT_FOUND, Html(pages::not_found(&err.to_string())))
                .into_response();
        }
        error!("Request failed: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::failure())).into_response()
    }
}

/// `GET /`
pub async fn form() -> Html<String> {
    Html(pages::form())
}

/// `POST /`: store the submission, notify staff, confirm.
pub async fn submit(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>, PageError> {
    let fields = HandoverFields::from_pairs(pairs).normalized();
    let record = state
        .with_storage(move |storage| {
            let id = storage.create(&fields)?;
            storage.require(id)
        })
        .await?;

    info!(
        id = record.id,
        employee = record.text(Field::EmployeeName),
        item = record.text(Field::ItemName),
        "Handover record created"
    );

    match state.notifier.notify(&record).await {
        Delivery::Sent => debug!(id = record.id, "Notification sent"),
        Delivery::Skipped { reason } => debug!(id = record.id, %reason, "Notification skipped"),
        Delivery::Failed { reason } => warn!(id = record.id, %reason, "Notification failed"),
    }

    Ok(Html(pages::submitted(&record)))
}

/// `GET /records`
pub async fn records(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let records = state.with_storage(|storage| storage.list_all()).await?;
    Ok(Html(pages::records(&records)))
}

/// `GET /record/{id}/pdf`
pub async fn export(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    let document = state
        .with_storage(move |storage| {
            let record = storage.require(id)?;
            document::render(&record)
        })
        .await?;

    info!(id, size = document.bytes.len(), "Handover document exported");

    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    Ok((
        [
            (header::CONTENT_TYPE, document::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}

/// Any route that is not defined.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(pages::not_found("The requested page does not exist.")),
    )
}
