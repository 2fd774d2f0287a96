//! Game rules that sit between the chat surface and the ledger.
//!
//! Each function takes the ledger and the freshly loaded catalog explicitly
//! and returns an outcome enum; turning outcomes into chat replies is the
//! dispatcher's job.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::{find_item, Character, ShopItem};
use crate::config::AdminList;
use crate::selector::pick_weighted;
use crate::store::{Ledger, LedgerResult, UserId};

#[derive(Debug, Clone, PartialEq)]
pub enum SummonOutcome {
    /// The character was drawn and now belongs to the user
    Summoned(Character),
    /// Empty catalog or every weight is zero
    NothingAvailable,
}

/// Draw a character for `user_id` and record the ownership
pub fn summon<R: Rng + ?Sized>(
    ledger: &Ledger,
    characters: &[Character],
    user_id: UserId,
    rng: &mut R,
) -> LedgerResult<SummonOutcome> {
    let Some(picked) = pick_weighted(characters, rng) else {
        return Ok(SummonOutcome::NothingAvailable);
    };

    ledger.add_character(user_id, picked)?;
    info!(user_id, char_id = %picked.id, rarity = %picked.rarity, "character summoned");
    Ok(SummonOutcome::Summoned(picked.clone()))
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    NotFound,
    InsufficientFunds { balance: i64, price: i64 },
    Settled { item: ShopItem, balance: i64 },
}

/// Buy `item_id` for `user_id` if the balance covers its price
pub fn purchase(
    ledger: &Ledger,
    items: &[ShopItem],
    user_id: UserId,
    item_id: &str,
) -> LedgerResult<PurchaseOutcome> {
    let Some(item) = find_item(items, item_id) else {
        return Ok(PurchaseOutcome::NotFound);
    };

    match ledger.try_debit(user_id, item.price)? {
        Some(balance) => {
            info!(user_id, item_id, price = item.price, balance, "purchase settled");
            Ok(PurchaseOutcome::Settled {
                item: item.clone(),
                balance,
            })
        }
        None => Ok(PurchaseOutcome::InsufficientFunds {
            balance: ledger.get_coins(user_id)?,
            price: item.price,
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackupOutcome {
    Unauthorized,
    Created(PathBuf),
}

/// File name for a snapshot taken at `now`, to the millisecond
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("bot_db_backup_{}.db", now.format("%Y%m%d_%H%M%S_%3f"))
}

/// Snapshot the ledger into `backups_dir`
pub fn create_backup(ledger: &Ledger, backups_dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(backups_dir)
        .with_context(|| format!("Failed to create backups directory: {:?}", backups_dir))?;

    let dest = backups_dir.join(backup_file_name(now));
    if dest.exists() {
        bail!("Backup already exists: {:?}", dest);
    }
    ledger
        .backup_to(&dest)
        .with_context(|| format!("Failed to write backup: {:?}", dest))?;

    info!(path = %dest.display(), "database backup created");
    Ok(dest)
}

/// Snapshot the ledger on behalf of `caller`, who must be an admin
pub fn backup(
    ledger: &Ledger,
    admins: &AdminList,
    caller: UserId,
    backups_dir: &Path,
    now: DateTime<Utc>,
) -> Result<BackupOutcome> {
    if !admins.contains(caller) {
        return Ok(BackupOutcome::Unauthorized);
    }
    create_backup(ledger, backups_dir, now).map(BackupOutcome::Created)
}
