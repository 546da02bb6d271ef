use crate::handler::{json_config, welcome, UserHandler};
use actix_web::web;

pub fn init(cfg: &mut web::ServiceConfig) {
	cfg.app_data(json_config())
		.route("/", web::get().to(welcome))
		.service(
			web::scope("/users")
				.route("/register", web::post().to(UserHandler::register_handler))
				.route("/login", web::post().to(UserHandler::login_handler))
				.route("/all", web::get().to(UserHandler::list_users_handler))
				.route("/user-email/{email}", web::get().to(UserHandler::user_by_email_handler)),
		);
}
