use crate::{
	db::DbPool,
	error::StoreError,
	models::{
		Account, Deposit, Holder, Populated, TransactionHistory, Transfer, User,
		ValidationAttempt, Withdrawal,
	},
	schema::{
		accounts, deposits, transaction_histories, transfers, users, validation_attempts,
		withdrawals,
	},
};
use bigdecimal::BigDecimal;
use diesel::{
	prelude::*,
	r2d2::{ConnectionManager, PooledConnection},
};
use uuid::Uuid;

/// Persistence seam for users, accounts and the ledger's event log.
///
/// Balance changes only go through [`LedgerStore::adjust_balance`] and
/// [`LedgerStore::move_funds`]; both refuse to take a balance below zero and
/// report [`StoreError::BalanceConflict`] instead.
#[cfg_attr(test, mockall::automock)]
pub trait LedgerStore: Send + Sync {
	fn insert_user(&self, user: &User) -> Result<User, StoreError>;
	fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;
	fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
	fn list_users(&self) -> Result<Vec<User>, StoreError>;

	/// Fails with [`StoreError::Duplicate`] when the account number or the owner is taken.
	fn insert_account(&self, account: &Account) -> Result<Account, StoreError>;
	fn find_account_by_user(&self, user_id: Uuid) -> Result<Option<Account>, StoreError>;
	fn find_account_by_number(&self, account_number: &str) -> Result<Option<Account>, StoreError>;
	fn list_accounts(&self) -> Result<Vec<Populated<Account>>, StoreError>;
	fn account_holder_names(&self) -> Result<Vec<String>, StoreError>;

	/// Adds `delta` (possibly negative) to the balance and relabels the account.
	fn adjust_balance(
		&self,
		account_id: Uuid,
		delta: &BigDecimal,
		bank_name: &str,
	) -> Result<Account, StoreError>;

	/// Debits `from` and credits `to` as one unit, returning the debited account.
	fn move_funds(
		&self,
		from: Uuid,
		to: Uuid,
		amount: &BigDecimal,
		sender_bank_name: &str,
	) -> Result<Account, StoreError>;

	fn insert_transfer(&self, transfer: &Transfer) -> Result<Transfer, StoreError>;
	fn insert_withdrawal(&self, withdrawal: &Withdrawal) -> Result<Withdrawal, StoreError>;
	fn insert_deposit(&self, deposit: &Deposit) -> Result<Deposit, StoreError>;
	fn append_history(&self, entry: &TransactionHistory) -> Result<TransactionHistory, StoreError>;

	/// Newest first; `None` lists every user's entries.
	fn list_history(
		&self,
		user_id: Option<Uuid>,
	) -> Result<Vec<Populated<TransactionHistory>>, StoreError>;

	fn insert_validation_attempt(
		&self,
		attempt: &ValidationAttempt,
	) -> Result<ValidationAttempt, StoreError>;
}

type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

/// PostgreSQL backend.
#[derive(Clone)]
pub struct PgRepo {
	pool: DbPool,
}

impl PgRepo {
	pub fn new(pool: DbPool) -> Self {
		Self { pool }
	}

	fn conn(&self) -> Result<PgPooled, StoreError> {
		self.pool.get().map_err(|e| {
			log::error!("Database connection error: {:?}", e);
			StoreError::from(e)
		})
	}
}

fn debit(
	conn: &mut PgConnection,
	account_id: Uuid,
	amount: &BigDecimal,
	bank_name: &str,
) -> Result<Account, StoreError> {
	diesel::update(
		accounts::table.filter(accounts::id.eq(account_id)).filter(accounts::balance.ge(amount)),
	)
	.set((accounts::balance.eq(accounts::balance - amount), accounts::bank_name.eq(bank_name)))
	.returning(Account::as_returning())
	.get_result::<Account>(conn)
	.optional()?
	.map_or_else(|| Err(missing_or_conflict(conn, account_id)), Ok)
}

fn credit(
	conn: &mut PgConnection,
	account_id: Uuid,
	amount: &BigDecimal,
	bank_name: Option<&str>,
) -> Result<Account, StoreError> {
	let target = accounts::table.filter(accounts::id.eq(account_id));
	let updated = match bank_name {
		Some(label) => diesel::update(target)
			.set((accounts::balance.eq(accounts::balance + amount), accounts::bank_name.eq(label)))
			.returning(Account::as_returning())
			.get_result::<Account>(conn),
		None => diesel::update(target)
			.set(accounts::balance.eq(accounts::balance + amount))
			.returning(Account::as_returning())
			.get_result::<Account>(conn),
	};
	Ok(updated?)
}

/// Tells a missing account apart from a debit the balance could not cover.
fn missing_or_conflict(conn: &mut PgConnection, account_id: Uuid) -> StoreError {
	let exists = accounts::table
		.filter(accounts::id.eq(account_id))
		.select(accounts::id)
		.first::<Uuid>(conn)
		.optional();
	match exists {
		Ok(Some(_)) => StoreError::BalanceConflict,
		Ok(None) => StoreError::NotFound,
		Err(e) => StoreError::from(e),
	}
}

fn populate<T>(rows: Vec<(T, (String, String))>) -> Vec<Populated<T>> {
	rows.into_iter()
		.map(|(record, (fullname, email))| Populated { record, user: Holder { fullname, email } })
		.collect()
}

impl LedgerStore for PgRepo {
	fn insert_user(&self, user: &User) -> Result<User, StoreError> {
		let mut conn = self.conn()?;
		Ok(diesel::insert_into(users::table)
			.values(user)
			.returning(User::as_returning())
			.get_result(&mut conn)?)
	}

	fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
		let mut conn = self.conn()?;
		Ok(users::table
			.filter(users::id.eq(user_id))
			.select(User::as_select())
			.first(&mut conn)
			.optional()?)
	}

	fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
		let mut conn = self.conn()?;
		Ok(users::table
			.filter(users::email.eq(email))
			.select(User::as_select())
			.first(&mut conn)
			.optional()?)
	}

	fn list_users(&self) -> Result<Vec<User>, StoreError> {
		let mut conn = self.conn()?;
		Ok(users::table
			.order(users::created_at.desc())
			.select(User::as_select())
			.load(&mut conn)?)
	}

	fn insert_account(&self, account: &Account) -> Result<Account, StoreError> {
		let mut conn = self.conn()?;
		Ok(diesel::insert_into(accounts::table)
			.values(account)
			.returning(Account::as_returning())
			.get_result(&mut conn)?)
	}

	fn find_account_by_user(&self, user_id: Uuid) -> Result<Option<Account>, StoreError> {
		let mut conn = self.conn()?;
		Ok(accounts::table
			.filter(accounts::user_id.eq(user_id))
			.order(accounts::created_at.desc())
			.select(Account::as_select())
			.first(&mut conn)
			.optional()?)
	}

	fn find_account_by_number(&self, account_number: &str) -> Result<Option<Account>, StoreError> {
		let mut conn = self.conn()?;
		Ok(accounts::table
			.filter(accounts::account_number.eq(account_number))
			.select(Account::as_select())
			.first(&mut conn)
			.optional()?)
	}

	fn list_accounts(&self) -> Result<Vec<Populated<Account>>, StoreError> {
		let mut conn = self.conn()?;
		let rows = accounts::table
			.inner_join(users::table)
			.order(accounts::created_at.desc())
			.select((Account::as_select(), (users::fullname, users::email)))
			.load::<(Account, (String, String))>(&mut conn)?;
		Ok(populate(rows))
	}

	fn account_holder_names(&self) -> Result<Vec<String>, StoreError> {
		let mut conn = self.conn()?;
		Ok(accounts::table.inner_join(users::table).select(users::fullname).load(&mut conn)?)
	}

	fn adjust_balance(
		&self,
		account_id: Uuid,
		delta: &BigDecimal,
		bank_name: &str,
	) -> Result<Account, StoreError> {
		let mut conn = self.conn()?;
		if *delta < BigDecimal::from(0) {
			let amount = -delta.clone();
			debit(&mut conn, account_id, &amount, bank_name)
		} else {
			credit(&mut conn, account_id, delta, Some(bank_name))
		}
	}

	fn move_funds(
		&self,
		from: Uuid,
		to: Uuid,
		amount: &BigDecimal,
		sender_bank_name: &str,
	) -> Result<Account, StoreError> {
		let mut pooled = self.conn()?;
		let conn: &mut PgConnection = &mut pooled;
		conn.transaction::<_, StoreError, _>(|conn| {
			let sender = debit(conn, from, amount, sender_bank_name)?;
			credit(conn, to, amount, None)?;
			Ok(sender)
		})
	}

	fn insert_transfer(&self, transfer: &Transfer) -> Result<Transfer, StoreError> {
		let mut conn = self.conn()?;
		Ok(diesel::insert_into(transfers::table)
			.values(transfer)
			.returning(Transfer::as_returning())
			.get_result(&mut conn)?)
	}

	fn insert_withdrawal(&self, withdrawal: &Withdrawal) -> Result<Withdrawal, StoreError> {
		let mut conn = self.conn()?;
		Ok(diesel::insert_into(withdrawals::table)
			.values(withdrawal)
			.returning(Withdrawal::as_returning())
			.get_result(&mut conn)?)
	}

	fn insert_deposit(&self, deposit: &Deposit) -> Result<Deposit, StoreError> {
		let mut conn = self.conn()?;
		Ok(diesel::insert_into(deposits::table)
			.values(deposit)
			.returning(Deposit::as_returning())
			.get_result(&mut conn)?)
	}

	fn append_history(&self, entry: &TransactionHistory) -> Result<TransactionHistory, StoreError> {
		let mut conn = self.conn()?;
		Ok(diesel::insert_into(transaction_histories::table)
			.values(entry)
			.returning(TransactionHistory::as_returning())
			.get_result(&mut conn)?)
	}

	fn list_history(
		&self,
		user_id: Option<Uuid>,
	) -> Result<Vec<Populated<TransactionHistory>>, StoreError> {
		let mut conn = self.conn()?;
		let mut query = transaction_histories::table
			.inner_join(users::table)
			.order(transaction_histories::created_at.desc())
			.select((TransactionHistory::as_select(), (users::fullname, users::email)))
			.into_boxed();
		if let Some(user_id) = user_id {
			query = query.filter(transaction_histories::user_id.eq(user_id));
		}
		let rows = query.load::<(TransactionHistory, (String, String))>(&mut conn)?;
		Ok(populate(rows))
	}

	fn insert_validation_attempt(
		&self,
		attempt: &ValidationAttempt,
	) -> Result<ValidationAttempt, StoreError> {
		let mut conn = self.conn()?;
		Ok(diesel::insert_into(validation_attempts::table)
			.values(attempt)
			.returning(ValidationAttempt::as_returning())
			.get_result(&mut conn)?)
	}
}
