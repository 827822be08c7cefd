use actix_web::{HttpResponse, http::StatusCode, ResponseError};
use thiserror::Error;
use serde::Serialize;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{entity} not found.")]
    NotFound { entity: &'static str, id: String },
    #[error("Email already registered.")]
    DuplicateEmail,
    #[error("Message must have at least one recipient.")]
    NoRecipients,
    #[error("Sender not found.")]
    SenderNotFound,
    #[error("Recipient with ID {id} not found.")]
    RecipientNotFound { id: String },
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal server error.")]
    Internal,
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ApiError::NotFound { entity, id: id.into() }
    }
}

#[derive(Serialize)]
struct ApiErrBody {
    detail: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. }
            | ApiError::SenderNotFound
            | ApiError::RecipientNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DuplicateEmail | ApiError::NoRecipients | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
    fn error_response(&self) -> HttpResponse {
        if let ApiError::NotFound { entity, id } = self {
            log::debug!("{entity} {id} not found");
        }
        HttpResponse::build(self.status_code()).json(ApiErrBody { detail: self.to_string() })
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        log::error!("db error: {e:?}");
        ApiError::Internal
    }
}

/// True when the database rejected a write because of a UNIQUE constraint.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn messages_are_stable() {
        assert_eq!(ApiError::not_found("User", "abc").to_string(), "User not found.");
        assert_eq!(ApiError::SenderNotFound.to_string(), "Sender not found.");
        assert_eq!(
            ApiError::NoRecipients.to_string(),
            "Message must have at least one recipient."
        );
        assert_eq!(
            ApiError::RecipientNotFound { id: "42".into() }.to_string(),
            "Recipient with ID 42 not found."
        );
        assert_eq!(ApiError::DuplicateEmail.to_string(), "Email already registered.");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(ApiError::not_found("Message", "x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::SenderNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::RecipientNotFound { id: "x".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::DuplicateEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoRecipients.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn error_body_carries_detail() {
        let resp = ApiError::SenderNotFound.error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Sender not found.");
    }
}
