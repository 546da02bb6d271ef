use crate::constants::FIFTEEN_MINUTES;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
	Postgres,
	Memory,
}

/// Server settings, read from flags or from the environment (`.env` included).
#[derive(Debug, Clone, Parser)]
#[command(name = "pxb-bank", version, about = "REST backend for the PxB toy bank")]
pub struct AppConfig {
	/// Address the HTTP server binds to.
	#[arg(long, env = "SOCKET_URL", default_value = "127.0.0.1:5000")]
	pub socket_url: String,

	/// PostgreSQL connection string, required for the postgres backend.
	#[arg(long, env = "DATABASE_URL")]
	pub database_url: Option<String>,

	#[arg(long, env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Postgres)]
	pub store: StoreBackend,

	#[arg(long, env = "JWT_SECRET", hide_env_values = true)]
	pub jwt_secret: String,

	/// Lifetime of issued tokens, in seconds.
	#[arg(long, env = "TOKEN_TTL_SECS", default_value_t = FIFTEEN_MINUTES)]
	pub token_ttl_secs: i64,

	#[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
	pub bcrypt_cost: u32,

	/// Number of HTTP workers; defaults to the number of CPUs.
	#[arg(long, env = "WORKERS")]
	pub workers: Option<usize>,
}

impl AppConfig {
	pub fn load() -> anyhow::Result<Self> {
		let config = Self::parse();
		config.check()?;
		Ok(config)
	}

	pub fn check(&self) -> anyhow::Result<()> {
		if self.jwt_secret.trim().is_empty() {
			anyhow::bail!("JWT_SECRET must not be empty");
		}
		if self.token_ttl_secs <= 0 {
			anyhow::bail!("TOKEN_TTL_SECS must be positive, got {}", self.token_ttl_secs);
		}
		if !(4..=31).contains(&self.bcrypt_cost) {
			anyhow::bail!("BCRYPT_COST must be between 4 and 31, got {}", self.bcrypt_cost);
		}
		if self.store == StoreBackend::Postgres && self.database_url.is_none() {
			anyhow::bail!("DATABASE_URL must be set when STORE_BACKEND is postgres");
		}
		Ok(())
	}

	pub fn workers(&self) -> usize {
		self.workers.unwrap_or_else(num_cpus::get).max(1)
	}
}
