use actix_web::{
	http::{header::ContentType, StatusCode},
	test,
};
use bigdecimal::BigDecimal;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
	models::{Account, ApiResponse, Populated, TransactionHistory, ValidationAttempt},
	tests::{
		fixtures::TestFixtures,
		test_utils::{bearer, generate_test_token, test_app, token_with_expiry, TestBank},
	},
};

#[actix_web::test]
async fn test_create_account_requires_token() {
	let bank = TestBank::new();
	let app = test_app!(bank);

	let resp = test::TestRequest::post()
		.uri("/accounts/create-account")
		.set_json(TestFixtures::account_request("08011111111", 1234))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
	let body: ApiResponse<()> = test::read_body_json(resp).await;
	assert_eq!(body.status, "error");
	assert_eq!(body.error.as_deref(), Some("Invalid token, please login again"));
	assert!(bank.ledger.list_accounts().unwrap().is_empty());
}

#[actix_web::test]
async fn test_expired_token_is_rejected() {
	let bank = TestBank::new();
	let alice = bank.user("Alice Ade", "alice@example.com");
	let app = test_app!(bank);
	let stale = token_with_expiry(&alice, chrono::Utc::now() - chrono::Duration::hours(2));

	let resp = test::TestRequest::post()
		.uri("/accounts/deposit")
		.insert_header(bearer(&stale))
		.set_json(TestFixtures::deposit("10"))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_account_hides_pin() {
	let bank = TestBank::new();
	let alice = bank.user("Alice Ade", "alice@example.com");
	let app = test_app!(bank);

	let resp = test::TestRequest::post()
		.uri("/accounts/create-account")
		.insert_header(bearer(&generate_test_token(&alice)))
		.set_json(json!({ "accountNumber": "08011111111", "transactionPIN": "1234" }))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::OK);
	let body: Value = test::read_body_json(resp).await;
	assert_eq!(body["status"], "success");
	assert_eq!(body["data"]["accountNumber"], "08011111111");
	assert_eq!(body["data"]["bankName"], "PxB");
	assert!(body["data"].get("transactionPIN").is_none());
}

#[actix_web::test]
async fn test_create_account_without_pin() {
	let bank = TestBank::new();
	let alice = bank.user("Alice Ade", "alice@example.com");
	let app = test_app!(bank);

	let resp = test::TestRequest::post()
		.uri("/accounts/create-account")
		.insert_header(bearer(&generate_test_token(&alice)))
		.set_json(json!({ "accountNumber": "08011111111" }))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	let body: ApiResponse<()> = test::read_body_json(resp).await;
	assert_eq!(body.error.as_deref(), Some("Please enter your transaction PIN"));
}

#[actix_web::test]
async fn test_transfer_over_http() {
	let bank = TestBank::new();
	let (alice, _) = bank.customer("Alice Ade", "alice@example.com", "08011111111", 1234, 1000);
	let (bob, _) = bank.customer("Bob Bello", "bob@example.com", "08022222222", 4321, 50);
	let app = test_app!(bank);

	let resp = test::TestRequest::post()
		.uri("/accounts/transfer")
		.insert_header(bearer(&generate_test_token(&alice)))
		.set_json(json!({
			"transferAmount": "300",
			"recipientAccountNumber": "08022222222",
			"recipientName": "Bob Bello"
		}))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::OK);
	let body: ApiResponse<Account> = test::read_body_json(resp).await;
	assert_eq!(body.data.unwrap().balance, BigDecimal::from(700));

	let resp = test::TestRequest::get()
		.uri(&format!("/accounts/current-user/{}", bob.id))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: ApiResponse<Populated<Account>> = test::read_body_json(resp).await;
	let bob_account = body.data.unwrap();
	assert_eq!(bob_account.record.balance, BigDecimal::from(350));
	assert_eq!(bob_account.user.fullname, "Bob Bello");
}

#[actix_web::test]
async fn test_self_transfer_over_http() {
	let bank = TestBank::new();
	let (alice, _) = bank.customer("Alice Ade", "alice@example.com", "08011111111", 1234, 1000);
	let app = test_app!(bank);

	let resp = test::TestRequest::post()
		.uri("/accounts/transfer")
		.insert_header(bearer(&generate_test_token(&alice)))
		.set_json(TestFixtures::transfer("1", "08011111111", "Alice Ade"))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	let body: ApiResponse<()> = test::read_body_json(resp).await;
	assert_eq!(body.error.as_deref(), Some("You tried to tranfer funds to yourself!"));
}

#[actix_web::test]
async fn test_withdraw_insufficient_funds_over_http() {
	let bank = TestBank::new();
	let (alice, _) = bank.customer("Alice Ade", "alice@example.com", "08011111111", 1234, 100);
	let app = test_app!(bank);

	let resp = test::TestRequest::post()
		.uri("/accounts/withdraw")
		.insert_header(bearer(&generate_test_token(&alice)))
		.set_json(TestFixtures::withdrawal("150", "Fidelity Bank"))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	let body: ApiResponse<()> = test::read_body_json(resp).await;
	assert_eq!(body.error.as_deref(), Some("Funds NOT sufficient!"));
	assert_eq!(bank.balance_of(&alice), BigDecimal::from(100));
}

#[actix_web::test]
async fn test_deposit_accepts_legacy_field_name() {
	let bank = TestBank::new();
	let (alice, _) = bank.customer("Alice Ade", "alice@example.com", "08011111111", 1234, 200);
	let app = test_app!(bank);

	let resp = test::TestRequest::post()
		.uri("/accounts/deposit")
		.insert_header(bearer(&generate_test_token(&alice)))
		.set_json(json!({ "depositeAmount": "500" }))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::OK);
	let body: ApiResponse<Account> = test::read_body_json(resp).await;
	let account = body.data.unwrap();
	assert_eq!(account.balance, BigDecimal::from(700));
	assert_eq!(account.bank_name, "VeeGil Bank");
}

#[actix_web::test]
async fn test_validate_transaction_over_http() {
	let bank = TestBank::new();
	let (alice, _) = bank.customer("Alice Ade", "alice@example.com", "08011111111", 1706, 0);
	let app = test_app!(bank);
	let token = generate_test_token(&alice);

	let resp = test::TestRequest::post()
		.uri("/accounts/validate-transaction")
		.insert_header(bearer(&token))
		.set_json(json!({ "validationNumber": 1111 }))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::FORBIDDEN);
	let body: ApiResponse<()> = test::read_body_json(resp).await;
	assert_eq!(body.error.as_deref(), Some("You are NOT authorized"));

	let resp = test::TestRequest::post()
		.uri("/accounts/validate-transaction")
		.insert_header(bearer(&token))
		.set_json(json!({ "validattionNumber": "1706" }))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: ApiResponse<ValidationAttempt> = test::read_body_json(resp).await;
	assert_eq!(body.data.unwrap().validation_number, 1706);
}

#[actix_web::test]
async fn test_list_accounts_embeds_holder() {
	let bank = TestBank::new();
	bank.customer("Alice Ade", "alice@example.com", "08011111111", 1234, 0);
	bank.customer("Bob Bello", "bob@example.com", "08022222222", 4321, 0);
	let app = test_app!(bank);

	let resp = test::TestRequest::get().uri("/accounts/all").send_request(&app).await;

	assert_eq!(resp.status(), StatusCode::OK);
	let body: Value = test::read_body_json(resp).await;
	let accounts = body["data"].as_array().unwrap();
	assert_eq!(accounts.len(), 2);
	for account in accounts {
		assert!(account["user"]["fullname"].is_string());
		assert!(account["user"]["email"].is_string());
		assert!(account.get("transactionPIN").is_none());
	}
}

#[actix_web::test]
async fn test_current_user_account_lookup_errors() {
	let bank = TestBank::new();
	let app = test_app!(bank);

	let resp =
		test::TestRequest::get().uri("/accounts/current-user/not-a-uuid").send_request(&app).await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	let resp = test::TestRequest::get()
		.uri(&format!("/accounts/current-user/{}", Uuid::new_v4()))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);
	let body: ApiResponse<()> = test::read_body_json(resp).await;
	assert_eq!(body.error.as_deref(), Some("Account does not exist!"));
}

#[actix_web::test]
async fn test_transaction_listings() {
	let bank = TestBank::new();
	let (alice, _) = bank.customer("Alice Ade", "alice@example.com", "08011111111", 1234, 0);
	let (bob, _) = bank.customer("Bob Bello", "bob@example.com", "08022222222", 4321, 0);
	bank.ledger.deposit(&alice, &TestFixtures::deposit("100")).unwrap();
	bank.ledger.deposit(&bob, &TestFixtures::deposit("40")).unwrap();
	bank.ledger.withdraw(&alice, &TestFixtures::withdrawal("30", "Access Bank")).unwrap();
	let app = test_app!(bank);

	let resp = test::TestRequest::get().uri("/accounts/transactions").send_request(&app).await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: ApiResponse<Vec<Populated<TransactionHistory>>> = test::read_body_json(resp).await;
	assert_eq!(body.data.unwrap().len(), 3);

	let resp = test::TestRequest::get()
		.uri(&format!("/accounts/transactions/current-user/{}", alice.id))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: ApiResponse<Vec<Populated<TransactionHistory>>> = test::read_body_json(resp).await;
	let history = body.data.unwrap();
	assert_eq!(history.len(), 2);
	assert_eq!(history[0].record.transaction_type, "Withdrawal");
	assert_eq!(history[1].record.transaction_type, "Deposit");
	assert!(history.iter().all(|entry| entry.user.email == "alice@example.com"));
}

#[actix_web::test]
async fn test_malformed_body_uses_error_envelope() {
	let bank = TestBank::new();
	let (alice, _) = bank.customer("Alice Ade", "alice@example.com", "08011111111", 1234, 0);
	let app = test_app!(bank);

	let resp = test::TestRequest::post()
		.uri("/accounts/deposit")
		.insert_header(bearer(&generate_test_token(&alice)))
		.set_json(json!({ "depositAmount": "lots" }))
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	let body: ApiResponse<()> = test::read_body_json(resp).await;
	assert_eq!(body.status, "error");
	assert!(body.error.is_some());
}

#[actix_web::test]
async fn test_numeric_amounts_keep_every_digit() {
	let bank = TestBank::new();
	let (alice, _) = bank.customer("Alice Ade", "alice@example.com", "08011111111", 1234, 0);
	let app = test_app!(bank);
	let token = generate_test_token(&alice);

	for payload in [r#"{"depositAmount": 0.1}"#, r#"{"depositAmount": 0.2}"#] {
		let resp = test::TestRequest::post()
			.uri("/accounts/deposit")
			.insert_header(bearer(&token))
			.insert_header(ContentType::json())
			.set_payload(payload)
			.send_request(&app)
			.await;
		assert_eq!(resp.status(), StatusCode::OK);
	}
	assert_eq!(bank.balance_of(&alice), TestFixtures::amount("0.3"));

	let resp = test::TestRequest::post()
		.uri("/accounts/deposit")
		.insert_header(bearer(&token))
		.insert_header(ContentType::json())
		.set_payload(r#"{"depositAmount": 123456789012345678901234567890}"#)
		.send_request(&app)
		.await;

	assert_eq!(resp.status(), StatusCode::OK);
	let body: Value = test::read_body_json(resp).await;
	assert_eq!(body["data"]["balance"], "123456789012345678901234567890.3");
}

#[actix_web::test]
async fn test_numeric_transfer_and_withdraw_amounts() {
	let bank = TestBank::new();
	let (alice, _) = bank.customer("Alice Ade", "alice@example.com", "08011111111", 1234, 1);
	let (bob, _) = bank.customer("Bob Bello", "bob@example.com", "08022222222", 4321, 0);
	let app = test_app!(bank);
	let token = generate_test_token(&alice);

	let resp = test::TestRequest::post()
		.uri("/accounts/transfer")
		.insert_header(bearer(&token))
		.set_json(json!({
			"transferAmount": 0.7,
			"recipientAccountNumber": "08022222222",
			"recipientName": "Bob Bello"
		}))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK);

	let resp = test::TestRequest::post()
		.uri("/accounts/withdraw")
		.insert_header(bearer(&token))
		.set_json(json!({
			"withdrawAmount": 0.3,
			"recipientBank": "Access Bank",
			"recipientAccountNumber": "0123456789"
		}))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK);

	assert_eq!(bank.balance_of(&alice), BigDecimal::from(0));
	assert_eq!(bank.balance_of(&bob), TestFixtures::amount("0.7"));
}
