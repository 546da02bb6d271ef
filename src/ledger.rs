//! Account ledger: account creation, the three money movements, PIN checks and history.
//!
//! Every operation validates and looks up everything it needs before the
//! balance is touched, then mutates through one atomic store primitive.
//! Event records and history entries are written afterwards by
//! [`Ledger::record`], so a refused request leaves no trace.

use crate::{
	constants::{DEFAULT_BANK_NAME, DEPOSIT_BANK_NAME, TRANSFER_BANK_NAME},
	error::{LedgerError, StoreError},
	models::{
		Account, CreateAccountRequest, Deposit, DepositRequest, Holder, Identity, Populated,
		TransactionHistory, TransactionType, Transfer, TransferRequest, ValidateTransactionRequest,
		ValidationAttempt, WithdrawRequest, Withdrawal,
	},
	repo::LedgerStore,
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

const NO_ACCOUNT: &str = "You have not yet created your bank account!";

/// The event row written alongside a history entry once a movement commits.
enum LedgerEvent {
	Transfer(Transfer),
	Withdrawal(Withdrawal),
	Deposit(Deposit),
}

impl LedgerEvent {
	fn kind(&self) -> TransactionType {
		match self {
			LedgerEvent::Transfer(_) => TransactionType::Transfer,
			LedgerEvent::Withdrawal(_) => TransactionType::Withdrawal,
			LedgerEvent::Deposit(_) => TransactionType::Deposit,
		}
	}

	fn user_id(&self) -> Uuid {
		match self {
			LedgerEvent::Transfer(t) => t.user_id,
			LedgerEvent::Withdrawal(w) => w.user_id,
			LedgerEvent::Deposit(d) => d.user_id,
		}
	}

	fn amount(&self) -> &BigDecimal {
		match self {
			LedgerEvent::Transfer(t) => &t.transfer_amount,
			LedgerEvent::Withdrawal(w) => &w.withdraw_amount,
			LedgerEvent::Deposit(d) => &d.deposit_amount,
		}
	}
}

#[derive(Clone)]
pub struct Ledger {
	store: Arc<dyn LedgerStore>,
}

fn check_amount(amount: &BigDecimal, field: &str) -> Result<(), LedgerError> {
	if *amount < BigDecimal::from(0) {
		log::warn!("Rejected negative {}: {}", field, amount);
		return Err(LedgerError::Validation(format!("{} must not be negative", field)));
	}
	Ok(())
}

impl Ledger {
	pub fn new(store: Arc<dyn LedgerStore>) -> Self {
		Self { store }
	}

	fn own_account(&self, who: &Identity) -> Result<Account, LedgerError> {
		self.store.find_account_by_user(who.id)?.ok_or_else(|| {
			log::warn!("User {} has no bank account", who.id);
			LedgerError::NotFound(NO_ACCOUNT.to_string())
		})
	}

	pub fn create_account(
		&self,
		who: &Identity,
		req: &CreateAccountRequest,
	) -> Result<Account, LedgerError> {
		req.validate()?;
		let pin = match &req.transaction_pin {
			None => None,
			Some(pin) if pin.is_blank() => None,
			Some(pin) => Some(pin.value().ok_or_else(|| {
				LedgerError::Validation("Transaction PIN must be numeric".to_string())
			})?),
		}
		.ok_or_else(|| LedgerError::Validation("Please enter your transaction PIN".to_string()))?;

		if self.store.find_account_by_number(&req.account_number)?.is_some() {
			log::warn!("Account number {} already exists", req.account_number);
			return Err(LedgerError::DuplicateAccount("Account number already exists!".to_string()));
		}
		if self.store.find_account_by_user(who.id)?.is_some() {
			log::warn!("User {} already owns an account", who.id);
			return Err(LedgerError::DuplicateAccount(
				"You already have a bank account!".to_string(),
			));
		}

		let account = Account::open(who.id, &req.account_number, pin, DEFAULT_BANK_NAME);
		let created = self.store.insert_account(&account)?;
		log::info!("Account {} created for user {}", created.account_number, who.id);
		Ok(created)
	}

	pub fn list_accounts(&self) -> Result<Vec<Populated<Account>>, LedgerError> {
		Ok(self.store.list_accounts()?)
	}

	pub fn account_of(&self, user_id: Uuid) -> Result<Populated<Account>, LedgerError> {
		let missing = || LedgerError::NotFound("Account does not exist!".to_string());
		let account = self.store.find_account_by_user(user_id)?.ok_or_else(missing)?;
		let owner = self.store.find_user(user_id)?.ok_or_else(missing)?;
		Ok(Populated { record: account, user: Holder { fullname: owner.fullname, email: owner.email } })
	}

	pub fn transfer(&self, who: &Identity, req: &TransferRequest) -> Result<Account, LedgerError> {
		req.validate()?;
		check_amount(&req.transfer_amount, "transferAmount")?;

		let holders = self.store.account_holder_names()?;
		if !holders.iter().any(|name| *name == req.recipient_name) {
			log::warn!("Transfer to unregistered recipient {:?}", req.recipient_name);
			return Err(LedgerError::NotFound(
				"You can ONLY transfer funds to registered recipients!".to_string(),
			));
		}
		if req.recipient_name == who.fullname {
			log::warn!("User {} tried to transfer to themselves", who.id);
			return Err(LedgerError::SelfTransfer);
		}

		let sender = self.own_account(who)?;
		if sender.balance < req.transfer_amount {
			log::warn!("Insufficient funds for transfer by user {}", who.id);
			return Err(LedgerError::InsufficientFunds);
		}

		let recipient =
			self.store.find_account_by_number(&req.recipient_account_number)?.ok_or_else(|| {
				LedgerError::NotFound("Account number does NOT belong to this recipient!".to_string())
			})?;
		if recipient.id == sender.id {
			log::warn!("User {} tried to transfer to their own account number", who.id);
			return Err(LedgerError::SelfTransfer);
		}

		let updated = self
			.store
			.move_funds(sender.id, recipient.id, &req.transfer_amount, TRANSFER_BANK_NAME)
			.map_err(|e| self.movement_failed(who, e))?;
		log::info!(
			"Transferred {} from {} to {}",
			req.transfer_amount,
			sender.account_number,
			recipient.account_number
		);

		self.record(LedgerEvent::Transfer(Transfer {
			id: Uuid::new_v4(),
			user_id: who.id,
			transfer_amount: req.transfer_amount.clone(),
			recipient_account_number: req.recipient_account_number.clone(),
			recipient_name: req.recipient_name.clone(),
			is_transfered: true,
			created_at: Utc::now(),
		}));
		Ok(updated)
	}

	pub fn withdraw(&self, who: &Identity, req: &WithdrawRequest) -> Result<Account, LedgerError> {
		req.validate()?;
		check_amount(&req.withdraw_amount, "withdrawAmount")?;

		let account = self.own_account(who)?;
		if account.balance < req.withdraw_amount {
			log::warn!("Insufficient funds for withdrawal by user {}", who.id);
			return Err(LedgerError::InsufficientFunds);
		}

		let debit = -req.withdraw_amount.clone();
		let updated = self
			.store
			.adjust_balance(account.id, &debit, &req.recipient_bank)
			.map_err(|e| self.movement_failed(who, e))?;
		log::info!("Withdrew {} from {} to {}", req.withdraw_amount, account.account_number, req.recipient_bank);

		self.record(LedgerEvent::Withdrawal(Withdrawal {
			id: Uuid::new_v4(),
			user_id: who.id,
			withdraw_amount: req.withdraw_amount.clone(),
			recipient_bank: req.recipient_bank.clone(),
			recipient_account_number: req.recipient_account_number.clone(),
			is_withdrawn: true,
			created_at: Utc::now(),
		}));
		Ok(updated)
	}

	pub fn deposit(&self, who: &Identity, req: &DepositRequest) -> Result<Account, LedgerError> {
		check_amount(&req.deposit_amount, "depositAmount")?;

		let account = self.own_account(who)?;
		let updated = self
			.store
			.adjust_balance(account.id, &req.deposit_amount, DEPOSIT_BANK_NAME)
			.map_err(|e| self.movement_failed(who, e))?;
		log::info!("Deposited {} into {}", req.deposit_amount, account.account_number);

		self.record(LedgerEvent::Deposit(Deposit {
			id: Uuid::new_v4(),
			user_id: who.id,
			deposit_amount: req.deposit_amount.clone(),
			reference_id: req.reference_id.clone(),
			created_at: Utc::now(),
		}));
		Ok(updated)
	}

	/// Compares the supplied number with the account PIN. Every attempt that
	/// reaches the comparison is stored, matching or not.
	pub fn validate_pin(
		&self,
		who: &Identity,
		req: &ValidateTransactionRequest,
	) -> Result<ValidationAttempt, LedgerError> {
		let account = self.own_account(who)?;
		let supplied = req
			.validation_number
			.as_ref()
			.and_then(|n| n.value())
			.ok_or_else(|| LedgerError::Validation("Validation number is required".to_string()))?;

		let attempt = self.store.insert_validation_attempt(&ValidationAttempt {
			id: Uuid::new_v4(),
			user_id: who.id,
			validation_number: supplied,
			created_at: Utc::now(),
		})?;

		if supplied != account.transaction_pin {
			log::warn!("PIN mismatch for user {}", who.id);
			return Err(LedgerError::Unauthorized("You are NOT authorized".to_string()));
		}
		Ok(attempt)
	}

	pub fn history(
		&self,
		user_id: Option<Uuid>,
	) -> Result<Vec<Populated<TransactionHistory>>, LedgerError> {
		Ok(self.store.list_history(user_id)?)
	}

	fn movement_failed(&self, who: &Identity, err: StoreError) -> LedgerError {
		if err == StoreError::BalanceConflict {
			log::warn!("Balance of user {} changed under a concurrent request", who.id);
		}
		LedgerError::from(err)
	}

	/// Post-commit hook: the balance already moved, so failures here are only logged.
	fn record(&self, event: LedgerEvent) {
		let entry = TransactionHistory::new(event.user_id(), event.kind(), event.amount());
		let saved = match &event {
			LedgerEvent::Transfer(t) => self.store.insert_transfer(t).map(|_| ()),
			LedgerEvent::Withdrawal(w) => self.store.insert_withdrawal(w).map(|_| ()),
			LedgerEvent::Deposit(d) => self.store.insert_deposit(d).map(|_| ()),
		};
		if let Err(e) = saved {
			log::error!("Failed to store {} record for user {}: {}", entry.transaction_type, entry.user_id, e);
		}
		if let Err(e) = self.store.append_history(&entry) {
			log::error!("Failed to append history for user {}: {}", entry.user_id, e);
		}
	}
}
