use std::error::Error;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::article::StoreError;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Article not found")]
    ArticleNotFound,

    #[error("Error encountered talking to the article store")]
    Store(#[from] StoreError),
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        error!("{}: {:?}", self, self.source());

        let status = match self {
            RestError::ArticleNotFound => StatusCode::NOT_FOUND,
            RestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(json!({"message": self.to_string()}));

        (status, payload).into_response()
    }
}
