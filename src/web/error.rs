use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Handler failure. Pool exhaustion is reported as temporary; everything
/// else is a plain 500 with the cause kept in the log only.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<r2d2::Error>().is_some() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Some(render) = self.0.downcast_ref::<tera::Error>() {
            tracing::error!(error = ?render, "Template rendering failed");
        } else {
            tracing::error!(status = status.as_u16(), "Request failed: {:#}", self.0);
        }

        match status {
            StatusCode::SERVICE_UNAVAILABLE => (
                status,
                [(header::RETRY_AFTER, "5")],
                "The blog is busy, please retry shortly",
            )
                .into_response(),
            _ => (status, "Something went wrong on our side").into_response(),
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
