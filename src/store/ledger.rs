use rusqlite::{params, Connection, DatabaseName, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::schema::ALL_TABLES;
use super::schema_gen::{generate_create_table, generate_indexes};
use crate::catalog::Character;

/// Telegram user id
pub type UserId = i64;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("adding {delta} coins to user {user_id} would overdraw a balance of {balance}")]
    WouldOverdraw {
        user_id: UserId,
        balance: i64,
        delta: i64,
    },

    #[error("adding {delta} coins to user {user_id} would overflow a balance of {balance}")]
    BalanceOverflow {
        user_id: UserId,
        balance: i64,
        delta: i64,
    },

    #[error("debit amount must not be negative, got {0}")]
    NegativeDebit(i64),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// A character a user has acquired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedCharacter {
    pub char_id: String,
    pub char_name: String,
    pub rarity: String,
}

/// Coin balances and character ownership, backed by SQLite
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Open (or create) the ledger database at `path`
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::init(conn)
    }

    /// Ledger that lives only as long as the value, for tests and dry runs
    pub fn open_in_memory() -> LedgerResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> LedgerResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        for schema in ALL_TABLES {
            conn.execute(&generate_create_table(schema), [])?;
            for index_sql in generate_indexes(schema) {
                conn.execute(&index_sql, [])?;
            }
        }

        Ok(Self { conn })
    }

    /// Create a zero-balance row for `user_id` unless one exists
    pub fn ensure(&self, user_id: UserId) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO users (user_id, coins) VALUES (?1, 0)",
            params![user_id],
        )?;
        Ok(())
    }

    /// Add `delta` (possibly negative) to the balance and return the new one.
    ///
    /// Fails with [`LedgerError::WouldOverdraw`] if the result would be
    /// negative and with [`LedgerError::BalanceOverflow`] if it does not fit an
    /// `i64`; the balance is left alone in both cases.
    pub fn add_coins(&self, user_id: UserId, delta: i64) -> LedgerResult<i64> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO users (user_id, coins) VALUES (?1, 0)",
            params![user_id],
        )?;

        let balance = balance_of(&tx, user_id)?;
        let Some(updated) = balance.checked_add(delta) else {
            return Err(LedgerError::BalanceOverflow {
                user_id,
                balance,
                delta,
            });
        };
        if updated < 0 {
            return Err(LedgerError::WouldOverdraw {
                user_id,
                balance,
                delta,
            });
        }

        tx.execute(
            "UPDATE users SET coins = ?2 WHERE user_id = ?1",
            params![user_id, updated],
        )?;
        tx.commit()?;
        debug!(user_id, delta, balance = updated, "coins adjusted");
        Ok(updated)
    }

    /// Current balance, creating the user if needed
    pub fn get_coins(&self, user_id: UserId) -> LedgerResult<i64> {
        self.ensure(user_id)?;
        balance_of(&self.conn, user_id)
    }

    /// Subtract `amount` only if the balance covers it.
    ///
    /// Returns the new balance, or `None` when funds are insufficient. The
    /// check and the decrement are one statement, so two concurrent debits
    /// cannot both spend the same coins.
    pub fn try_debit(&self, user_id: UserId, amount: i64) -> LedgerResult<Option<i64>> {
        if amount < 0 {
            return Err(LedgerError::NegativeDebit(amount));
        }
        self.ensure(user_id)?;

        let balance = self
            .conn
            .query_row(
                "UPDATE users SET coins = coins - ?2
                 WHERE user_id = ?1 AND coins >= ?2
                 RETURNING coins",
                params![user_id, amount],
                |row| row.get(0),
            )
            .optional()?;
        Ok(balance)
    }

    /// Record that `user_id` now owns `character`
    pub fn add_character(&self, user_id: UserId, character: &Character) -> LedgerResult<()> {
        self.ensure(user_id)?;
        self.conn.execute(
            "INSERT INTO user_chars (user_id, char_id, char_name, rarity) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, character.id, character.name, character.rarity],
        )?;
        Ok(())
    }

    /// Everything `user_id` owns, oldest first
    pub fn list_characters(&self, user_id: UserId) -> LedgerResult<Vec<OwnedCharacter>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT char_id, char_name, rarity FROM user_chars WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(OwnedCharacter {
                char_id: row.get(0)?,
                char_name: row.get(1)?,
                rarity: row.get(2)?,
            })
        })?;

        let mut owned = Vec::new();
        for row in rows {
            owned.push(row?);
        }
        Ok(owned)
    }

    /// Remove a user and, through the foreign key, everything they own
    pub fn delete_user(&self, user_id: UserId) -> LedgerResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
        Ok(deleted > 0)
    }

    /// Write a consistent snapshot of the live database to `dest`
    pub fn backup_to(&self, dest: &Path) -> LedgerResult<()> {
        self.conn.backup(DatabaseName::Main, dest, None)?;
        Ok(())
    }
}

fn balance_of(conn: &Connection, user_id: UserId) -> LedgerResult<i64> {
    let coins = conn.query_row(
        "SELECT coins FROM users WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(coins)
}
