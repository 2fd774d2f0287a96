use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use tracing::{debug, error, info, warn};

use super::command::{parse_command, Command, Invocation};
use super::replies;
use crate::catalog::{load_characters, load_shop_items, parse_buy_callback};
use crate::config::Config;
use crate::game::{self, BackupOutcome, PurchaseOutcome, SummonOutcome};
use crate::store::{Ledger, LedgerError, UserId};
use crate::telegram::{CallbackQuery, Message, Messenger, OutgoingMessage, Update};

/// Which entry point drew the character; only the reply wording differs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawKind {
    Summon,
    Drop,
}

/// Routes updates to handlers against an explicit ledger and config
pub struct Bot<'a, M: Messenger> {
    ledger: &'a Ledger,
    config: &'a Config,
    messenger: &'a M,
    username: Option<String>,
}

impl<'a, M: Messenger> Bot<'a, M> {
    pub fn new(ledger: &'a Ledger, config: &'a Config, messenger: &'a M) -> Self {
        Self {
            ledger,
            config,
            messenger,
            username: None,
        }
    }

    /// Only accept `/cmd@name` suffixes naming this bot
    pub fn with_username(self, username: Option<String>) -> Self {
        Self { username, ..self }
    }

    /// Handle one update. Failures are reported, never returned.
    pub fn handle_update<R: Rng + ?Sized>(&self, update: &Update, rng: &mut R) {
        if let Some(message) = &update.message {
            self.handle_message(message, rng);
        } else if let Some(query) = &update.callback_query {
            let chat_id = query
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(query.from.id);
            if let Err(err) = self.on_callback(query) {
                // Stop the button spinner; a second answer is rejected harmlessly
                if let Err(answer_err) =
                    self.messenger.answer_callback_query(&query.id, None, false)
                {
                    debug!(error = %answer_err, "callback already answered");
                }
                self.report_failure(chat_id, "buy_callback", &err);
            }
        } else {
            debug!(update_id = update.update_id, "ignoring update");
        }
    }

    fn handle_message<R: Rng + ?Sized>(&self, message: &Message, rng: &mut R) {
        let (Some(text), Some(from)) = (message.text.as_deref(), message.from.as_ref()) else {
            return;
        };
        let Some(invocation) = parse_command(text, self.username.as_deref()) else {
            return;
        };

        let chat_id = message.chat.id;
        let command = invocation.command;
        debug!(user_id = from.id, command = command.name(), "command received");

        if command.is_admin_only() && !self.config.admins.contains(from.id) {
            info!(user_id = from.id, command = command.name(), "rejected non-admin");
            if let Err(err) = self.reply(OutgoingMessage::text(chat_id, replies::NOT_AUTHORIZED)) {
                self.report_failure(chat_id, command.name(), &err);
            }
            return;
        }

        if let Err(err) = self.on_command(&invocation, chat_id, from.id, rng) {
            self.report_failure(chat_id, command.name(), &err);
        }
    }

    fn on_command<R: Rng + ?Sized>(
        &self,
        invocation: &Invocation<'_>,
        chat_id: i64,
        user_id: UserId,
        rng: &mut R,
    ) -> Result<()> {
        match invocation.command {
            Command::Start => self.reply(OutgoingMessage::text(chat_id, replies::WELCOME)),
            Command::Help => self.reply(OutgoingMessage::text(chat_id, replies::HELP)),
            Command::Summon => self.on_draw(DrawKind::Summon, chat_id, user_id, rng),
            Command::SimulateDrop => self.on_draw(DrawKind::Drop, chat_id, user_id, rng),
            Command::Shop => self.on_shop(chat_id),
            Command::Backup => self.on_backup(chat_id, user_id),
            Command::Balance => {
                let coins = self.ledger.get_coins(user_id)?;
                self.reply(OutgoingMessage::text(chat_id, replies::balance(coins)))
            }
            Command::Collection => {
                let owned = self.ledger.list_characters(user_id)?;
                self.reply(OutgoingMessage::text(chat_id, replies::collection(&owned)))
            }
            Command::Grant => self.on_grant(chat_id, invocation.args),
        }
    }

    fn on_draw<R: Rng + ?Sized>(
        &self,
        kind: DrawKind,
        chat_id: i64,
        user_id: UserId,
        rng: &mut R,
    ) -> Result<()> {
        let characters = load_characters(&self.config.characters_path)?;

        let reply = match game::summon(self.ledger, &characters, user_id, rng)? {
            SummonOutcome::Summoned(ch) => match kind {
                DrawKind::Summon => OutgoingMessage::html(chat_id, replies::summoned(&ch)),
                DrawKind::Drop => OutgoingMessage::text(chat_id, replies::dropped(&ch)),
            },
            SummonOutcome::NothingAvailable => {
                debug!(user_id, "nothing to draw");
                let text = match kind {
                    DrawKind::Summon => replies::NOTHING_TO_SUMMON,
                    DrawKind::Drop => replies::NOTHING_TO_DROP,
                };
                OutgoingMessage::text(chat_id, text)
            }
        };
        self.reply(reply)
    }

    fn on_shop(&self, chat_id: i64) -> Result<()> {
        let items = load_shop_items(&self.config.shop_path)?;
        if items.is_empty() {
            return self.reply(OutgoingMessage::text(chat_id, replies::SHOP_EMPTY));
        }

        let (text, keyboard) = replies::shop_listing(&items);
        self.reply(OutgoingMessage::text(chat_id, text).with_keyboard(keyboard))
    }

    fn on_callback(&self, query: &CallbackQuery) -> Result<()> {
        let Some(item_id) = query.data.as_deref().and_then(parse_buy_callback) else {
            // Not ours, but the client spins until the query is answered
            self.messenger.answer_callback_query(&query.id, None, false)?;
            return Ok(());
        };

        let user_id = query.from.id;
        let items = load_shop_items(&self.config.shop_path)?;

        match game::purchase(self.ledger, &items, user_id, item_id)? {
            PurchaseOutcome::NotFound => {
                debug!(user_id, item_id, "unknown item");
                self.messenger.answer_callback_query(&query.id, None, false)?;
                match &query.message {
                    Some(msg) => self.messenger.edit_message_text(
                        msg.chat.id,
                        msg.message_id,
                        replies::ITEM_NOT_FOUND,
                    )?,
                    None => self.reply(OutgoingMessage::text(user_id, replies::ITEM_NOT_FOUND))?,
                }
            }
            PurchaseOutcome::InsufficientFunds { balance, price } => {
                debug!(user_id, item_id, balance, price, "insufficient funds");
                let text = replies::insufficient_funds(balance, price);
                self.messenger.answer_callback_query(&query.id, Some(&text), true)?;
            }
            PurchaseOutcome::Settled { item, balance } => {
                let text = replies::purchase_settled(&item, balance);
                self.messenger.answer_callback_query(&query.id, Some(&text), true)?;
            }
        }
        Ok(())
    }

    fn on_backup(&self, chat_id: i64, user_id: UserId) -> Result<()> {
        let outcome = game::backup(
            self.ledger,
            &self.config.admins,
            user_id,
            &self.config.backups_dir,
            Utc::now(),
        )?;

        let text = match outcome {
            BackupOutcome::Unauthorized => replies::NOT_AUTHORIZED.to_string(),
            BackupOutcome::Created(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                replies::backup_created(&name)
            }
        };
        self.reply(OutgoingMessage::text(chat_id, text))
    }

    fn on_grant(&self, chat_id: i64, args: &str) -> Result<()> {
        let Some((target, delta)) = parse_grant_args(args) else {
            return self.reply(OutgoingMessage::text(chat_id, replies::GRANT_USAGE));
        };

        let text = match self.ledger.add_coins(target, delta) {
            Ok(balance) => {
                info!(user_id = target, delta, balance, "coins granted");
                replies::granted(target, delta, balance)
            }
            Err(LedgerError::WouldOverdraw { balance, .. }) => {
                replies::would_overdraw(target, balance)
            }
            Err(LedgerError::BalanceOverflow { balance, .. }) => {
                replies::would_overflow(target, balance)
            }
            Err(err) => return Err(err.into()),
        };
        self.reply(OutgoingMessage::text(chat_id, text))
    }

    fn reply(&self, message: OutgoingMessage) -> Result<()> {
        self.messenger
            .send_message(&message)
            .with_context(|| format!("Failed to send message to chat {}", message.chat_id))
    }

    /// Log an unexpected failure, apologise to the user and tell every admin
    fn report_failure(&self, chat_id: i64, handler: &str, err: &anyhow::Error) {
        error!(handler, chat_id, error = ?err, "handler failed");

        if let Err(send_err) = self
            .messenger
            .send_message(&OutgoingMessage::text(chat_id, replies::INTERNAL_ERROR))
        {
            warn!(chat_id, error = %send_err, "failed to tell user about the failure");
        }

        let detail = format!("{:?}", err);
        let notice = replies::admin_failure(handler, &detail);
        for &admin_id in self.config.admins.ids() {
            if let Err(send_err) = self
                .messenger
                .send_message(&OutgoingMessage::html(admin_id, notice.clone()))
            {
                error!(admin_id, error = %send_err, "failed to notify admin");
            }
        }
    }
}

/// `<user_id> <amount>` with a signed amount
fn parse_grant_args(args: &str) -> Option<(UserId, i64)> {
    let mut parts = args.split_whitespace();
    let user_id = parts.next()?.parse().ok()?;
    let delta = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((user_id, delta))
}
