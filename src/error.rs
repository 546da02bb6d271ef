use crate::models::ApiResponse;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Failures raised by a [`crate::repo::LedgerStore`] backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
	#[error("store unavailable: {0}")]
	Unavailable(String),

	#[error("duplicate record: {0}")]
	Duplicate(String),

	/// A conditional balance update matched no row: the balance no longer covers the debit.
	#[error("balance changed concurrently")]
	BalanceConflict,

	#[error("record not found")]
	NotFound,

	#[error("query failed: {0}")]
	Query(String),
}

impl From<DieselError> for StoreError {
	fn from(err: DieselError) -> Self {
		match err {
			DieselError::NotFound => StoreError::NotFound,
			DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) =>
				StoreError::Duplicate(info.message().to_string()),
			DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) =>
				StoreError::BalanceConflict,
			DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) =>
				StoreError::Unavailable(info.message().to_string()),
			other => {
				log::debug!("diesel operation failed: {:?}", other);
				StoreError::Query(other.to_string())
			},
		}
	}
}

impl From<r2d2::Error> for StoreError {
	fn from(err: r2d2::Error) -> Self {
		StoreError::Unavailable(err.to_string())
	}
}

/// Every way a banking operation can be refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
	#[error("{0}")]
	Validation(String),

	#[error("{0}")]
	DuplicateAccount(String),

	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	Unauthorized(String),

	#[error("You tried to tranfer funds to yourself!")]
	SelfTransfer,

	#[error("Funds NOT sufficient!")]
	InsufficientFunds,

	#[error("Balance changed while the request was processed, please retry")]
	Conflict,

	#[error("Service temporarily unavailable")]
	ServiceUnavailable,

	#[error("Internal server error")]
	Internal,
}

impl From<StoreError> for LedgerError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::Unavailable(reason) => {
				log::error!("Store unavailable: {}", reason);
				LedgerError::ServiceUnavailable
			},
			StoreError::Duplicate(reason) => {
				log::warn!("Duplicate record rejected by the store: {}", reason);
				LedgerError::DuplicateAccount("Record already exists!".to_string())
			},
			StoreError::BalanceConflict => LedgerError::Conflict,
			StoreError::NotFound => LedgerError::NotFound("Account does not exist!".to_string()),
			StoreError::Query(reason) => {
				log::error!("Store query failed: {}", reason);
				LedgerError::Internal
			},
		}
	}
}

impl From<validator::ValidationErrors> for LedgerError {
	fn from(errors: validator::ValidationErrors) -> Self {
		let mut messages = errors
			.field_errors()
			.into_iter()
			.flat_map(|(field, errs)| {
				errs.iter().map(move |e| match &e.message {
					Some(message) => message.to_string(),
					None => format!("{} is invalid", field),
				})
			})
			.collect::<Vec<_>>();
		messages.sort();
		LedgerError::Validation(messages.join(", "))
	}
}

impl From<bcrypt::BcryptError> for LedgerError {
	fn from(err: bcrypt::BcryptError) -> Self {
		log::error!("Password hashing failed: {}", err);
		LedgerError::Internal
	}
}

impl From<jsonwebtoken::errors::Error> for LedgerError {
	fn from(err: jsonwebtoken::errors::Error) -> Self {
		log::error!("JWT creation error: {:?}", err);
		LedgerError::Internal
	}
}

impl From<actix_web::error::BlockingError> for LedgerError {
	fn from(err: actix_web::error::BlockingError) -> Self {
		log::error!("Blocking task failed: {}", err);
		LedgerError::Internal
	}
}

impl ResponseError for LedgerError {
	fn status_code(&self) -> StatusCode {
		match self {
			LedgerError::Validation(_) |
			LedgerError::DuplicateAccount(_) |
			LedgerError::SelfTransfer |
			LedgerError::InsufficientFunds => StatusCode::BAD_REQUEST,
			LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
			LedgerError::Unauthorized(_) => StatusCode::FORBIDDEN,
			LedgerError::Conflict => StatusCode::CONFLICT,
			LedgerError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
			LedgerError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code()).json(ApiResponse::<()>::failure(self.to_string()))
	}
}
