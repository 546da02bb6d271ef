use crate::{
	error::{LedgerError, StoreError},
	midware::jwt::JWT,
	models::{LoginRequest, LoginResp, RegisterRequest, User},
	repo::LedgerStore,
};
use std::sync::Arc;
use validator::Validate;

const EMAIL_TAKEN: &str = "Email already exists!";

/// Registration and login on top of the shared store.
#[derive(Clone)]
pub struct UserDirectory {
	store: Arc<dyn LedgerStore>,
	jwt: JWT,
	bcrypt_cost: u32,
}

impl UserDirectory {
	pub fn new(store: Arc<dyn LedgerStore>, jwt: JWT, bcrypt_cost: u32) -> Self {
		Self { store, jwt, bcrypt_cost }
	}

	pub fn register(&self, req: &RegisterRequest) -> Result<User, LedgerError> {
		req.validate()?;
		if self.store.find_user_by_email(&req.email)?.is_some() {
			log::warn!("Registration attempt with taken email: {}", req.email);
			return Err(LedgerError::Validation(EMAIL_TAKEN.to_string()));
		}

		let hashed = bcrypt::hash(req.password.as_bytes(), self.bcrypt_cost)?;
		let user = match self.store.insert_user(&User::new(&req.fullname, &req.email, hashed)) {
			Err(StoreError::Duplicate(reason)) => {
				log::warn!("Concurrent registration lost on email {}: {}", req.email, reason);
				return Err(LedgerError::Validation(EMAIL_TAKEN.to_string()));
			},
			inserted => inserted?,
		};
		log::info!("Registered user {} ({})", user.id, user.email);
		Ok(user)
	}

	pub fn login(&self, req: &LoginRequest) -> Result<LoginResp, LedgerError> {
		req.validate()?;
		let user = self.store.find_user_by_email(&req.email)?.ok_or_else(|| {
			log::info!("Login attempt for unknown email: {}", req.email);
			LedgerError::NotFound("User not found".to_string())
		})?;

		if !bcrypt::verify(req.password.as_bytes(), &user.password)? {
			log::warn!("Incorrect password for user {}", user.id);
			return Err(LedgerError::Unauthorized("Incorrect password".to_string()));
		}

		let token = self.jwt.create_jwt(&user)?;
		log::info!("Login successful for user ID: {}", user.id);
		Ok(LoginResp { uid: user.id.to_string(), token })
	}

	pub fn all(&self) -> Result<Vec<User>, LedgerError> {
		Ok(self.store.list_users()?)
	}

	pub fn by_email(&self, email: &str) -> Result<User, LedgerError> {
		self.store
			.find_user_by_email(email)?
			.ok_or_else(|| LedgerError::NotFound("User not found".to_string()))
	}
}
