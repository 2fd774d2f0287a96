//! Reply texts

use crate::catalog::{Character, ShopItem};
use crate::store::OwnedCharacter;
use crate::telegram::{escape_html, InlineKeyboardButton, InlineKeyboardMarkup};

pub const WELCOME: &str = "Welcome to Catch Character Bot!\nCommands:\n\
    /summon - summon a character\n\
    /shop - view shop\n\
    /simulate_drop - simulate a character drop\n\
    /balance - show your coins\n\
    /collection - list your characters\n\
    /backup - admin only";

pub const HELP: &str = "Use /start to see all commands.\nContact admin for more info.";

pub const NOTHING_TO_SUMMON: &str = "No characters available.";
pub const NOTHING_TO_DROP: &str = "No characters available for drop.";
pub const SHOP_EMPTY: &str = "Shop is empty.";
pub const ITEM_NOT_FOUND: &str = "Item not found.";
pub const NOT_AUTHORIZED: &str = "You are not authorized to use this command.";
pub const INTERNAL_ERROR: &str = "An internal error occurred. The admin has been notified.";
pub const GRANT_USAGE: &str = "Usage: /grant <user_id> <amount>";
pub const EMPTY_COLLECTION: &str = "You don't own any characters yet. Try /summon!";

/// Messages longer than this are rejected by Telegram
const MAX_MESSAGE_CHARS: usize = 4096;

/// HTML reply for `/summon`
pub fn summoned(character: &Character) -> String {
    let mut text = format!(
        "You summoned <b>{}</b>! (Rarity: {})",
        escape_html(&character.name),
        escape_html(&character.rarity)
    );
    if let Some(desc) = character.description.as_deref().filter(|d| !d.is_empty()) {
        text.push('\n');
        text.push_str(&escape_html(desc));
    }
    text
}

/// Plain reply for `/simulate_drop`
pub fn dropped(character: &Character) -> String {
    format!("A wild card dropped: {}! It's yours.", character.name)
}

/// Listing text and one "Buy" button per item
pub fn shop_listing(items: &[ShopItem]) -> (String, InlineKeyboardMarkup) {
    let text = items
        .iter()
        .map(|it| {
            format!(
                "{} - {} coins\n{}",
                it.name,
                it.price,
                it.description.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let buttons = items
        .iter()
        .map(|it| InlineKeyboardButton {
            text: format!("Buy {}", it.name),
            callback_data: it.callback_data(),
        })
        .collect();

    (text, InlineKeyboardMarkup::single_column(buttons))
}

pub fn insufficient_funds(balance: i64, price: i64) -> String {
    format!("Not enough coins: you have {}, this costs {}.", balance, price)
}

pub fn purchase_settled(item: &ShopItem, balance: i64) -> String {
    format!("Purchase successful! You bought {}. Balance: {} coins.", item.name, balance)
}

pub fn balance(coins: i64) -> String {
    format!("You have {} coins.", coins)
}

pub fn collection(owned: &[OwnedCharacter]) -> String {
    if owned.is_empty() {
        return EMPTY_COLLECTION.to_string();
    }
    let mut text = format!("Your characters ({}):", owned.len());
    for ch in owned {
        text.push_str(&format!("\n- {} ({})", ch.char_name, ch.rarity));
    }
    truncate_chars(&text, MAX_MESSAGE_CHARS)
}

pub fn granted(user_id: i64, delta: i64, balance: i64) -> String {
    format!("User {} balance changed by {}; now {} coins.", user_id, delta, balance)
}

pub fn would_overdraw(user_id: i64, balance: i64) -> String {
    format!("Refused: user {} only has {} coins.", user_id, balance)
}

pub fn would_overflow(user_id: i64, balance: i64) -> String {
    format!(
        "Refused: user {} already has {} coins; that amount would overflow.",
        user_id, balance
    )
}

pub fn backup_created(file_name: &str) -> String {
    format!("Backup created: {}", file_name)
}

/// HTML notification sent to every admin when a handler fails
pub fn admin_failure(handler: &str, detail: &str) -> String {
    // Leave room for the wrapper markup and entity expansion
    let detail = truncate_chars(detail, MAX_MESSAGE_CHARS / 2);
    format!(
        "Error in handler <code>{}</code>:\n<pre>{}</pre>",
        escape_html(handler),
        escape_html(&detail)
    )
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
