use crate::schema::*;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: Uuid,
	pub fullname: String,
	pub email: String,
	/// bcrypt hash, never sent back to clients.
	#[serde(skip_serializing, default)]
	pub password: String,
	pub created_at: DateTime<Utc>,
}

impl User {
	pub fn new(fullname: &str, email: &str, password_hash: String) -> Self {
		Self {
			id: Uuid::new_v4(),
			fullname: fullname.to_string(),
			email: email.to_string(),
			password: password_hash,
			created_at: Utc::now(),
		}
	}
}

/// The owning user's public fields, embedded into account and history listings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Holder {
	pub fullname: String,
	pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Populated<T> {
	#[serde(flatten)]
	pub record: T,
	pub user: Holder,
}

/// The caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
	pub id: Uuid,
	pub fullname: String,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Account {
	pub id: Uuid,
	pub user_id: Uuid,
	pub bank_name: String,
	pub balance: BigDecimal,
	pub account_number: String,
	#[serde(skip_serializing, default, rename = "transactionPIN")]
	pub transaction_pin: i64,
	pub created_at: DateTime<Utc>,
}

impl Account {
	pub fn open(user_id: Uuid, account_number: &str, transaction_pin: i64, bank_name: &str) -> Self {
		Self {
			id: Uuid::new_v4(),
			user_id,
			bank_name: bank_name.to_string(),
			balance: BigDecimal::from(0),
			account_number: account_number.to_string(),
			transaction_pin,
			created_at: Utc::now(),
		}
	}
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = transfers)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
	pub id: Uuid,
	pub user_id: Uuid,
	pub transfer_amount: BigDecimal,
	pub recipient_account_number: String,
	pub recipient_name: String,
	pub is_transfered: bool,
	pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = withdrawals)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
	pub id: Uuid,
	pub user_id: Uuid,
	pub withdraw_amount: BigDecimal,
	pub recipient_bank: String,
	pub recipient_account_number: String,
	pub is_withdrawn: bool,
	pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = deposits)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
	pub id: Uuid,
	pub user_id: Uuid,
	pub deposit_amount: BigDecimal,
	pub reference_id: Option<String>,
	pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = transaction_histories)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistory {
	pub id: Uuid,
	pub user_id: Uuid,
	pub transaction_type: String,
	pub transaction_amount: BigDecimal,
	pub created_at: DateTime<Utc>,
}

impl TransactionHistory {
	pub fn new(user_id: Uuid, transaction_type: TransactionType, amount: &BigDecimal) -> Self {
		Self {
			id: Uuid::new_v4(),
			user_id,
			transaction_type: transaction_type.as_str().to_string(),
			transaction_amount: amount.clone(),
			created_at: Utc::now(),
		}
	}
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = validation_attempts)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct ValidationAttempt {
	pub id: Uuid,
	pub user_id: Uuid,
	pub validation_number: i64,
	pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
	Transfer,
	Withdrawal,
	Deposit,
}

impl TransactionType {
	pub fn as_str(&self) -> &str {
		match self {
			TransactionType::Transfer => "Transfer",
			TransactionType::Withdrawal => "Withdrawal",
			TransactionType::Deposit => "Deposit",
		}
	}
}

/// A numeric secret that clients send either as a JSON number or as a digit string.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum NumericInput {
	Number(i64),
	Text(String),
}

// Read through `Value`: with arbitrary-precision numbers an untagged derive
// no longer sees JSON numbers as integers.
impl<'de> Deserialize<'de> for NumericInput {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Value::deserialize(deserializer)? {
			Value::Number(n) => n
				.as_i64()
				.map(NumericInput::Number)
				.ok_or_else(|| de::Error::custom(format!("{} is not a whole number", n))),
			Value::String(text) => Ok(NumericInput::Text(text)),
			other => Err(de::Error::custom(format!("expected a number or a string, got {}", other))),
		}
	}
}

impl NumericInput {
	pub fn is_blank(&self) -> bool {
		matches!(self, NumericInput::Text(text) if text.trim().is_empty())
	}

	pub fn value(&self) -> Option<i64> {
		match self {
			NumericInput::Number(n) if *n >= 0 => Some(*n),
			NumericInput::Number(_) => None,
			NumericInput::Text(text) => {
				let text = text.trim();
				if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
					return None;
				}
				text.parse::<i64>().ok()
			},
		}
	}
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
	#[serde(default)]
	#[validate(length(
		min = 1,
		message = "Account number is required (this will be your phone number)"
	))]
	pub account_number: String,
	#[serde(default, rename = "transactionPIN")]
	pub transaction_pin: Option<NumericInput>,
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
	pub transfer_amount: BigDecimal,
	#[serde(default)]
	#[validate(length(min = 1, message = "Recipient account number is required"))]
	pub recipient_account_number: String,
	#[serde(default)]
	#[validate(length(min = 1, message = "Recipient name is required"))]
	pub recipient_name: String,
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
	pub withdraw_amount: BigDecimal,
	#[serde(default)]
	#[validate(length(min = 1, message = "Recipient bank is required"))]
	pub recipient_bank: String,
	#[serde(default)]
	#[validate(length(min = 1, message = "Recipient account number is required"))]
	pub recipient_account_number: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
	#[serde(alias = "depositeAmount")]
	pub deposit_amount: BigDecimal,
	#[serde(default)]
	pub reference_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTransactionRequest {
	#[serde(default, alias = "validattionNumber")]
	pub validation_number: Option<NumericInput>,
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
pub struct RegisterRequest {
	#[serde(default)]
	#[validate(length(min = 2, max = 30, message = "Name must be between 2 and 30 characters"))]
	pub fullname: String,
	#[serde(default)]
	#[validate(email(message = "Invalid Email"))]
	pub email: String,
	#[serde(default)]
	#[validate(length(min = 6, max = 30, message = "Password must be at least 6 characters"))]
	pub password: String,
	#[serde(default)]
	#[validate(must_match(other = "password", message = "Password did not match"))]
	pub password2: String,
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
pub struct LoginRequest {
	#[serde(default)]
	#[validate(email(message = "Invalid Email"))]
	pub email: String,
	#[serde(default)]
	#[validate(length(min = 1, message = "Password field is required"))]
	pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResp {
	pub uid: String,
	pub token: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
	pub status: String,
	pub data: Option<T>,
	pub error: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn success(data: T) -> Self {
		Self { status: "success".to_string(), data: Some(data), error: None }
	}

	pub fn failure(message: impl Into<String>) -> Self {
		Self { status: "error".to_string(), data: None, error: Some(message.into()) }
	}
}
