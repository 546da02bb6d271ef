use bigdecimal::BigDecimal;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::{
	constants::DEFAULT_BANK_NAME,
	ledger::Ledger,
	memory_repo::MemoryRepo,
	midware::jwt::{Claims, JWT},
	models::{Account, Identity, User},
	repo::LedgerStore,
	tests::fixtures::TestFixtures,
	users::UserDirectory,
};

pub const TEST_SECRET: &str = "test_secret";

/// A memory-backed bank with the same wiring `main` uses.
pub struct TestBank {
	pub repo: Arc<MemoryRepo>,
	pub ledger: Ledger,
	pub users: UserDirectory,
	pub jwt: JWT,
}

impl TestBank {
	pub fn new() -> Self {
		let repo = Arc::new(MemoryRepo::new());
		let jwt = JWT::new(TEST_SECRET, 900);
		Self {
			ledger: Ledger::new(repo.clone()),
			users: UserDirectory::new(repo.clone(), jwt.clone(), 4),
			repo,
			jwt,
		}
	}

	pub fn user(&self, fullname: &str, email: &str) -> Identity {
		let user = self.repo.insert_user(&User::new(fullname, email, "unused".to_string())).unwrap();
		Identity { id: user.id, fullname: user.fullname }
	}

	pub fn customer(
		&self,
		fullname: &str,
		email: &str,
		account_number: &str,
		pin: i64,
		balance: i64,
	) -> (Identity, Account) {
		let who = self.user(fullname, email);
		let account = self
			.ledger
			.create_account(&who, &TestFixtures::account_request(account_number, pin))
			.unwrap();
		let account = self
			.repo
			.adjust_balance(account.id, &BigDecimal::from(balance), DEFAULT_BANK_NAME)
			.unwrap();
		(who, account)
	}

	pub fn balance_of(&self, who: &Identity) -> BigDecimal {
		self.repo.find_account_by_user(who.id).unwrap().expect("account exists").balance
	}
}

pub fn generate_test_token(who: &Identity) -> String {
	token_with_expiry(who, chrono::Utc::now() + chrono::Duration::hours(1))
}

pub fn token_with_expiry(who: &Identity, expires: chrono::DateTime<chrono::Utc>) -> String {
	let claims = Claims {
		iat: chrono::Utc::now().timestamp() as usize,
		exp: expires.timestamp() as usize,
		sub: who.id.to_string(),
		fullname: who.fullname.clone(),
	};

	encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_ref())).unwrap()
}

pub fn bearer(token: &str) -> (&'static str, String) {
	("Authorization", format!("Bearer {}", token))
}

macro_rules! test_app {
	($bank:expr) => {
		actix_web::test::init_service(
			actix_web::App::new()
				.app_data(actix_web::web::Data::new($bank.ledger.clone()))
				.app_data(actix_web::web::Data::new($bank.users.clone()))
				.app_data(actix_web::web::Data::new($bank.jwt.clone()))
				.configure(crate::user_routes::init)
				.configure(crate::account_routes::init),
		)
		.await
	};
}

pub(crate) use test_app;
