use crate::{
	error::StoreError,
	models::{
		Account, Deposit, Holder, Populated, TransactionHistory, Transfer, User,
		ValidationAttempt, Withdrawal,
	},
	repo::LedgerStore,
};
use bigdecimal::BigDecimal;
use std::{
	cmp::Reverse,
	sync::{Mutex, MutexGuard},
};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
	users: Vec<User>,
	accounts: Vec<Account>,
	transfers: Vec<Transfer>,
	withdrawals: Vec<Withdrawal>,
	deposits: Vec<Deposit>,
	history: Vec<TransactionHistory>,
	validations: Vec<ValidationAttempt>,
}

impl Tables {
	fn holder(&self, user_id: Uuid) -> Option<Holder> {
		self.users
			.iter()
			.find(|u| u.id == user_id)
			.map(|u| Holder { fullname: u.fullname.clone(), email: u.email.clone() })
	}

	fn account_mut(&mut self, account_id: Uuid) -> Result<&mut Account, StoreError> {
		self.accounts.iter_mut().find(|a| a.id == account_id).ok_or(StoreError::NotFound)
	}
}

/// In-process store for running without PostgreSQL.
///
/// One mutex guards every table, so a balance move is observed either fully or not at all.
#[derive(Default)]
pub struct MemoryRepo {
	tables: Mutex<Tables>,
}

impl MemoryRepo {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
		self.tables
			.lock()
			.map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
	}

	#[cfg(test)]
	pub fn transfers(&self) -> Result<Vec<Transfer>, StoreError> {
		Ok(self.lock()?.transfers.clone())
	}

	#[cfg(test)]
	pub fn withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError> {
		Ok(self.lock()?.withdrawals.clone())
	}

	#[cfg(test)]
	pub fn deposits(&self) -> Result<Vec<Deposit>, StoreError> {
		Ok(self.lock()?.deposits.clone())
	}

	#[cfg(test)]
	pub fn validation_attempts(&self) -> Result<Vec<ValidationAttempt>, StoreError> {
		Ok(self.lock()?.validations.clone())
	}
}

impl LedgerStore for MemoryRepo {
	fn insert_user(&self, user: &User) -> Result<User, StoreError> {
		let mut tables = self.lock()?;
		if tables.users.iter().any(|u| u.email == user.email) {
			return Err(StoreError::Duplicate(format!("email {} already exists", user.email)));
		}
		tables.users.push(user.clone());
		Ok(user.clone())
	}

	fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
		Ok(self.lock()?.users.iter().find(|u| u.id == user_id).cloned())
	}

	fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
		Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
	}

	fn list_users(&self) -> Result<Vec<User>, StoreError> {
		let mut users = self.lock()?.users.clone();
		users.sort_by_key(|u| Reverse(u.created_at));
		Ok(users)
	}

	fn insert_account(&self, account: &Account) -> Result<Account, StoreError> {
		let mut tables = self.lock()?;
		if tables.accounts.iter().any(|a| a.account_number == account.account_number) {
			return Err(StoreError::Duplicate(format!(
				"account number {} already exists",
				account.account_number
			)));
		}
		if tables.accounts.iter().any(|a| a.user_id == account.user_id) {
			return Err(StoreError::Duplicate(format!(
				"user {} already owns an account",
				account.user_id
			)));
		}
		tables.accounts.push(account.clone());
		Ok(account.clone())
	}

	fn find_account_by_user(&self, user_id: Uuid) -> Result<Option<Account>, StoreError> {
		Ok(self.lock()?.accounts.iter().find(|a| a.user_id == user_id).cloned())
	}

	fn find_account_by_number(&self, account_number: &str) -> Result<Option<Account>, StoreError> {
		Ok(self.lock()?.accounts.iter().find(|a| a.account_number == account_number).cloned())
	}

	fn list_accounts(&self) -> Result<Vec<Populated<Account>>, StoreError> {
		let tables = self.lock()?;
		let mut accounts = tables
			.accounts
			.iter()
			.filter_map(|a| tables.holder(a.user_id).map(|user| Populated { record: a.clone(), user }))
			.collect::<Vec<_>>();
		accounts.sort_by_key(|p| Reverse(p.record.created_at));
		Ok(accounts)
	}

	fn account_holder_names(&self) -> Result<Vec<String>, StoreError> {
		let tables = self.lock()?;
		Ok(tables.accounts.iter().filter_map(|a| tables.holder(a.user_id)).map(|h| h.fullname).collect())
	}

	fn adjust_balance(
		&self,
		account_id: Uuid,
		delta: &BigDecimal,
		bank_name: &str,
	) -> Result<Account, StoreError> {
		let mut tables = self.lock()?;
		let account = tables.account_mut(account_id)?;
		let balance = &account.balance + delta;
		if balance < BigDecimal::from(0) {
			return Err(StoreError::BalanceConflict);
		}
		account.balance = balance;
		account.bank_name = bank_name.to_string();
		Ok(account.clone())
	}

	fn move_funds(
		&self,
		from: Uuid,
		to: Uuid,
		amount: &BigDecimal,
		sender_bank_name: &str,
	) -> Result<Account, StoreError> {
		let mut tables = self.lock()?;
		tables.account_mut(to)?;
		let sender = tables.account_mut(from)?;
		if sender.balance < *amount {
			return Err(StoreError::BalanceConflict);
		}
		sender.balance = &sender.balance - amount;
		sender.bank_name = sender_bank_name.to_string();
		let debited = sender.clone();
		let recipient = tables.account_mut(to)?;
		recipient.balance = &recipient.balance + amount;
		Ok(debited)
	}

	fn insert_transfer(&self, transfer: &Transfer) -> Result<Transfer, StoreError> {
		self.lock()?.transfers.push(transfer.clone());
		Ok(transfer.clone())
	}

	fn insert_withdrawal(&self, withdrawal: &Withdrawal) -> Result<Withdrawal, StoreError> {
		self.lock()?.withdrawals.push(withdrawal.clone());
		Ok(withdrawal.clone())
	}

	fn insert_deposit(&self, deposit: &Deposit) -> Result<Deposit, StoreError> {
		self.lock()?.deposits.push(deposit.clone());
		Ok(deposit.clone())
	}

	fn append_history(&self, entry: &TransactionHistory) -> Result<TransactionHistory, StoreError> {
		self.lock()?.history.push(entry.clone());
		Ok(entry.clone())
	}

	fn list_history(
		&self,
		user_id: Option<Uuid>,
	) -> Result<Vec<Populated<TransactionHistory>>, StoreError> {
		let tables = self.lock()?;
		let mut entries = tables
			.history
			.iter()
			.filter(|h| user_id.map_or(true, |id| h.user_id == id))
			.filter_map(|h| tables.holder(h.user_id).map(|user| Populated { record: h.clone(), user }))
			.collect::<Vec<_>>();
		// Entries appended within the same clock tick keep insertion order reversed.
		entries.reverse();
		entries.sort_by_key(|p| Reverse(p.record.created_at));
		Ok(entries)
	}

	fn insert_validation_attempt(
		&self,
		attempt: &ValidationAttempt,
	) -> Result<ValidationAttempt, StoreError> {
		self.lock()?.validations.push(attempt.clone());
		Ok(attempt.clone())
	}
}
