use crate::{
	constants::MESSAGE_WELCOME,
	error::LedgerError,
	ledger::Ledger,
	midware::jwt::Claims,
	models::{
		ApiResponse, CreateAccountRequest, DepositRequest, LoginRequest, RegisterRequest,
		TransferRequest, ValidateTransactionRequest, WithdrawRequest,
	},
	users::UserDirectory,
};
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

/// Bad JSON bodies are answered with the same envelope as every other error.
pub fn json_config() -> web::JsonConfig {
	web::JsonConfig::default().error_handler(|err, _req| {
		log::warn!("Rejected request body: {}", err);
		LedgerError::Validation(err.to_string()).into()
	})
}

fn parse_user_id(raw: &str) -> Result<Uuid, LedgerError> {
	Uuid::parse_str(raw).map_err(|e| {
		log::error!("Invalid user ID format: {:?}", e);
		LedgerError::Validation("Invalid user ID format".to_string())
	})
}

pub async fn welcome() -> HttpResponse {
	HttpResponse::Ok().json(ApiResponse::success(json!({ "message": MESSAGE_WELCOME })))
}

pub struct UserHandler;

impl UserHandler {
	pub async fn register_handler(
		users: web::Data<UserDirectory>,
		req: web::Json<RegisterRequest>,
	) -> Result<HttpResponse, LedgerError> {
		let users = users.get_ref().clone();
		let user = web::block(move || users.register(&req)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
	}

	pub async fn login_handler(
		users: web::Data<UserDirectory>,
		req: web::Json<LoginRequest>,
	) -> Result<HttpResponse, LedgerError> {
		let users = users.get_ref().clone();
		let login = web::block(move || users.login(&req)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(login)))
	}

	pub async fn list_users_handler(
		users: web::Data<UserDirectory>,
	) -> Result<HttpResponse, LedgerError> {
		let users = users.get_ref().clone();
		let all = web::block(move || users.all()).await??;
		log::info!("Listed {} users", all.len());
		Ok(HttpResponse::Ok().json(ApiResponse::success(all)))
	}

	pub async fn user_by_email_handler(
		users: web::Data<UserDirectory>,
		path: web::Path<String>,
	) -> Result<HttpResponse, LedgerError> {
		let users = users.get_ref().clone();
		let email = path.into_inner();
		let user = web::block(move || users.by_email(&email)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
	}
}

pub struct AccountHandler;

impl AccountHandler {
	pub async fn create_account_handler(
		ledger: web::Data<Ledger>,
		claims: web::ReqData<Claims>,
		req: web::Json<CreateAccountRequest>,
	) -> Result<HttpResponse, LedgerError> {
		let who = claims.identity()?;
		let ledger = ledger.get_ref().clone();
		let account = web::block(move || ledger.create_account(&who, &req)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(account)))
	}

	pub async fn list_accounts_handler(
		ledger: web::Data<Ledger>,
	) -> Result<HttpResponse, LedgerError> {
		let ledger = ledger.get_ref().clone();
		let accounts = web::block(move || ledger.list_accounts()).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(accounts)))
	}

	pub async fn current_user_account_handler(
		ledger: web::Data<Ledger>,
		path: web::Path<String>,
	) -> Result<HttpResponse, LedgerError> {
		let user_id = parse_user_id(&path.into_inner())?;
		let ledger = ledger.get_ref().clone();
		let account = web::block(move || ledger.account_of(user_id)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(account)))
	}

	pub async fn transfer_handler(
		ledger: web::Data<Ledger>,
		claims: web::ReqData<Claims>,
		req: web::Json<TransferRequest>,
	) -> Result<HttpResponse, LedgerError> {
		let who = claims.identity()?;
		let ledger = ledger.get_ref().clone();
		let account = web::block(move || ledger.transfer(&who, &req)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(account)))
	}

	pub async fn withdraw_handler(
		ledger: web::Data<Ledger>,
		claims: web::ReqData<Claims>,
		req: web::Json<WithdrawRequest>,
	) -> Result<HttpResponse, LedgerError> {
		let who = claims.identity()?;
		let ledger = ledger.get_ref().clone();
		let account = web::block(move || ledger.withdraw(&who, &req)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(account)))
	}

	pub async fn deposit_handler(
		ledger: web::Data<Ledger>,
		claims: web::ReqData<Claims>,
		req: web::Json<DepositRequest>,
	) -> Result<HttpResponse, LedgerError> {
		let who = claims.identity()?;
		let ledger = ledger.get_ref().clone();
		let account = web::block(move || ledger.deposit(&who, &req)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(account)))
	}

	pub async fn validate_transaction_handler(
		ledger: web::Data<Ledger>,
		claims: web::ReqData<Claims>,
		req: web::Json<ValidateTransactionRequest>,
	) -> Result<HttpResponse, LedgerError> {
		let who = claims.identity()?;
		let ledger = ledger.get_ref().clone();
		let attempt = web::block(move || ledger.validate_pin(&who, &req)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(attempt)))
	}

	pub async fn list_transactions_handler(
		ledger: web::Data<Ledger>,
	) -> Result<HttpResponse, LedgerError> {
		let ledger = ledger.get_ref().clone();
		let history = web::block(move || ledger.history(None)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::success(history)))
	}

	pub async fn user_transactions_handler(
		ledger: web::Data<Ledger>,
		path: web::Path<String>,
	) -> Result<HttpResponse, LedgerError> {
		let user_id = parse_user_id(&path.into_inner())?;
		let ledger = ledger.get_ref().clone();
		let history = web::block(move || ledger.history(Some(user_id))).await??;
		log::info!("Retrieved {} transactions for user: {}", history.len(), user_id);
		Ok(HttpResponse::Ok().json(ApiResponse::success(history)))
	}
}
