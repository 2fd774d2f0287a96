use anyhow::{Context, Result};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use super::dispatch::Bot;
use crate::config::Config;
use crate::store::Ledger;
use crate::telegram::BotClient;

/// Pause after a failed `getUpdates` before polling again
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Validate the token, then long-poll and dispatch updates one at a time.
///
/// Only returns on startup failure; stop the bot by terminating the process.
pub fn run(client: &BotClient, ledger: &Ledger, config: &Config) -> Result<()> {
    let me = client.get_me().context("Token validation failed")?;
    info!(
        bot_id = me.id,
        username = me.username.as_deref().unwrap_or(""),
        admins = config.admins.ids().len(),
        "Bot started"
    );
    if config.admins.is_empty() {
        warn!("ADMIN_IDS is empty; admin commands are disabled and failures notify nobody");
    }

    let bot = Bot::new(ledger, config, client).with_username(me.username);
    let mut rng = rand::thread_rng();
    let mut offset: i64 = 0;

    loop {
        let updates = match client.get_updates(offset) {
            Ok(updates) => updates,
            Err(err) => {
                warn!(error = %err, "getUpdates failed");
                thread::sleep(POLL_ERROR_BACKOFF);
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            bot.handle_update(&update, &mut rng);
        }
    }
}
