mod account_routes;
mod config;
mod constants;
mod db;
mod error;
mod handler;
mod ledger;
mod memory_repo;
mod midware;
mod models;
mod repo;
mod schema;
#[cfg(test)]
mod tests;
mod user_routes;
mod users;
use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};

use config::{AppConfig, StoreBackend};
use dotenv::dotenv;
use env_logger::Env;
use ledger::Ledger;
use memory_repo::MemoryRepo;
use midware::jwt::JWT;
use repo::{LedgerStore, PgRepo};
use std::sync::Arc;
use users::UserDirectory;

fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
	match (config.store, config.database_url.as_deref()) {
		(StoreBackend::Postgres, Some(database_url)) => {
			let pool = db::get_db_pool(database_url)?;
			db::init(&pool)?;
			log::info!("Using PostgreSQL store");
			Ok(Arc::new(PgRepo::new(pool)))
		},
		(StoreBackend::Postgres, None) => anyhow::bail!("DATABASE_URL must be set"),
		(StoreBackend::Memory, _) => {
			log::warn!("Using in-memory store, data is lost on shutdown");
			Ok(Arc::new(MemoryRepo::new()))
		},
	}
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	dotenv().ok();
	env_logger::init_from_env(Env::default().default_filter_or("info"));
	let config = AppConfig::load()?;
	let store = open_store(&config)?;

	let jwt = JWT::new(&config.jwt_secret, config.token_ttl_secs);
	let ledger = web::Data::new(Ledger::new(store.clone()));
	let users = web::Data::new(UserDirectory::new(store, jwt.clone(), config.bcrypt_cost));
	let jwt = web::Data::new(jwt);

	log::info!("Listening on: {} with {} workers", config.socket_url, config.workers());

	HttpServer::new(move || {
		App::new()
			.app_data(ledger.clone())
			.app_data(users.clone())
			.app_data(jwt.clone())
			.wrap(
				Cors::default()
					.allow_any_origin()
					.allow_any_method()
					.allow_any_header()
					.expose_headers(vec![header::CONTENT_DISPOSITION])
					.supports_credentials()
					.max_age(3600),
			)
			.wrap(actix_web::middleware::Logger::default())
			.configure(user_routes::init)
			.configure(account_routes::init)
	})
	.workers(config.workers())
	.bind(&config.socket_url)?
	.run()
	.await?;
	Ok(())
}
