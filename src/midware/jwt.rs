use crate::{
	constants::MESSAGE_INVALID_TOKEN,
	error::LedgerError,
	models::{ApiResponse, Identity, User},
};
use actix_service::forward_ready;
use actix_web::{
	body::EitherBody,
	dev::{Service, ServiceRequest, ServiceResponse, Transform},
	http::{header::Header, Method},
	web, Error as AxError, HttpMessage, HttpResponse,
};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::Utc;
use futures::future::{ok, LocalBoxFuture, Ready};
use jsonwebtoken::{
	decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader,
	Validation,
};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
	pub iat: usize,
	pub exp: usize,
	pub sub: String,
	pub fullname: String,
}

impl Claims {
	pub fn identity(&self) -> Result<Identity, LedgerError> {
		let id = Uuid::parse_str(&self.sub).map_err(|e| {
			error!("Token subject is not a user id: {:?}", e);
			LedgerError::Unauthorized(MESSAGE_INVALID_TOKEN.to_string())
		})?;
		Ok(Identity { id, fullname: self.fullname.clone() })
	}
}

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct JWT {
	secret: String,
	ttl_secs: i64,
}

impl JWT {
	pub fn new(secret: &str, ttl_secs: i64) -> Self {
		Self { secret: secret.to_string(), ttl_secs }
	}

	pub fn create_jwt(&self, user: &User) -> Result<String, Error> {
		let now = Utc::now().timestamp();
		let claims = Claims {
			iat: now as usize,
			exp: (now + self.ttl_secs) as usize,
			sub: user.id.to_string(),
			fullname: user.fullname.clone(),
		};
		debug!("Creating token for user {} valid for {}s", claims.sub, self.ttl_secs);
		encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.secret.as_ref()))
	}

	pub fn verify_jwt(&self, token: &str) -> Result<Claims, Error> {
		decode::<Claims>(
			token,
			&DecodingKey::from_secret(self.secret.as_ref()),
			&Validation::new(Algorithm::HS256),
		)
		.map(|data| data.claims)
	}
}

/// Rejects requests without a valid bearer token and hands the [`Claims`]
/// to the wrapped handler through request extensions.
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = AxError>,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<EitherBody<B>>;
	type Error = AxError;
	type InitError = ();
	type Transform = AuthenticationMiddleware<S>;
	type Future = Ready<Result<Self::Transform, Self::InitError>>;

	fn new_transform(&self, service: S) -> Self::Future {
		ok(AuthenticationMiddleware { service })
	}
}

pub struct AuthenticationMiddleware<S> {
	service: S,
}

fn bearer_claims(req: &ServiceRequest) -> Option<Claims> {
	let Some(jwt) = req.app_data::<web::Data<JWT>>() else {
		error!("JWT settings are not registered on the app");
		return None;
	};
	let auth = match Authorization::<Bearer>::parse(req) {
		Ok(auth) => auth,
		Err(e) => {
			debug!("Missing or malformed Authorization header: {:?}", e);
			return None;
		},
	};
	match jwt.verify_jwt(auth.into_scheme().token()) {
		Ok(claims) => Some(claims),
		Err(e) => {
			error!("Invalid token: {:?}", e);
			None
		},
	}
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = AxError>,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<EitherBody<B>>;
	type Error = AxError;
	type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

	forward_ready!(service);

	fn call(&self, req: ServiceRequest) -> Self::Future {
		debug!("## Req: {}", req.path());

		if Method::OPTIONS != *req.method() {
			match bearer_claims(&req) {
				Some(claims) => {
					req.extensions_mut().insert(claims);
				},
				None => {
					let (request, _pl) = req.into_parts();
					let response = HttpResponse::Unauthorized()
						.json(ApiResponse::<()>::failure(MESSAGE_INVALID_TOKEN))
						.map_into_right_body();
					return Box::pin(async { Ok(ServiceResponse::new(request, response)) });
				},
			}
		}

		let res = self.service.call(req);

		Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
	}
}
