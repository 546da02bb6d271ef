use crate::{
	handler::{json_config, AccountHandler},
	midware::jwt::Authentication,
};
use actix_web::web;

pub fn init(cfg: &mut web::ServiceConfig) {
	cfg.app_data(json_config()).service(
		web::scope("/accounts")
			// public lookups
			.route("/all", web::get().to(AccountHandler::list_accounts_handler))
			.route(
				"/current-user/{user_id}",
				web::get().to(AccountHandler::current_user_account_handler),
			)
			.route("/transactions", web::get().to(AccountHandler::list_transactions_handler))
			.route(
				"/transactions/current-user/{user_id}",
				web::get().to(AccountHandler::user_transactions_handler),
			)
			// bearer token required
			.service(
				web::resource("/create-account")
					.wrap(Authentication)
					.route(web::post().to(AccountHandler::create_account_handler)),
			)
			.service(
				web::resource("/transfer")
					.wrap(Authentication)
					.route(web::post().to(AccountHandler::transfer_handler)),
			)
			.service(
				web::resource("/withdraw")
					.wrap(Authentication)
					.route(web::post().to(AccountHandler::withdraw_handler)),
			)
			.service(
				web::resource("/deposit")
					.wrap(Authentication)
					.route(web::post().to(AccountHandler::deposit_handler)),
			)
			.service(
				web::resource("/validate-transaction")
					.wrap(Authentication)
					.route(web::post().to(AccountHandler::validate_transaction_handler)),
			),
	);
}
