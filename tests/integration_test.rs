//! End-to-end tests that drive the dispatcher the way Telegram would.
//!
//! Each test gets:
//! 1. An in-memory ledger
//! 2. Catalog files in a temporary directory
//! 3. A recording messenger standing in for the Bot API

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use catch_character_bot::bot::{replies, Bot};
use catch_character_bot::config::{AdminList, Config};
use catch_character_bot::store::Ledger;
use catch_character_bot::telegram::{OutgoingMessage, RecordingMessenger, Sent, Update};

// =============================================================================
// Fixtures
// =============================================================================

const ADMIN: i64 = 1;
const PLAYER: i64 = 42;
const RANDOM_SEED: u64 = 42;

static CHARACTERS: Lazy<Value> = Lazy::new(|| {
    json!([
        {"id": "c1", "name": "Rex", "weight": 1},
        {"id": "c2", "name": "Ghost", "rarity": "legendary", "weight": 0}
    ])
});

static SHOP: Lazy<Value> = Lazy::new(|| {
    json!([
        {"id": "potion", "name": "Potion", "price": 10, "description": "Heals a little"},
        {"id": "ticket", "name": "Summon Ticket", "price": 100}
    ])
});

struct Harness {
    dir: TempDir,
    config: Config,
    ledger: Ledger,
    messenger: RecordingMessenger,
}

impl Harness {
    fn new() -> Self {
        Self::with_catalogs(&CHARACTERS, &SHOP)
    }

    fn with_catalogs(characters: &Value, shop: &Value) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let characters_path = dir.path().join("characters.json");
        let shop_path = dir.path().join("shop_items.json");
        fs::write(&characters_path, characters.to_string()).unwrap();
        fs::write(&shop_path, shop.to_string()).unwrap();

        let config = Config {
            bot_token: None,
            admins: AdminList::new(vec![ADMIN]),
            db_path: dir.path().join("bot.db"),
            log_path: dir.path().join("bot.log"),
            characters_path,
            shop_path,
            backups_dir: dir.path().join("backups"),
        };

        Self {
            dir,
            config,
            ledger: Ledger::open_in_memory().expect("Failed to open ledger"),
            messenger: RecordingMessenger::new(),
        }
    }

    fn dispatch(&self, update: Value) {
        let update: Update = serde_json::from_value(update).expect("Invalid update fixture");
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        Bot::new(&self.ledger, &self.config, &self.messenger).handle_update(&update, &mut rng);
    }

    fn command(&self, user_id: i64, text: &str) {
        self.dispatch(json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "chat": {"id": user_id},
                "from": {"id": user_id, "is_bot": false, "first_name": "Test"},
                "text": text
            }
        }));
    }

    fn press(&self, user_id: i64, data: &str) {
        self.dispatch(json!({
            "update_id": 2,
            "callback_query": {
                "id": "cb",
                "from": {"id": user_id, "is_bot": false, "first_name": "Test"},
                "message": {"message_id": 11, "chat": {"id": user_id}},
                "data": data
            }
        }));
    }

    fn backups_dir(&self) -> PathBuf {
        self.dir.path().join("backups")
    }
}

fn callback_answer(sent: &[Sent]) -> Option<(Option<String>, bool)> {
    sent.iter().find_map(|s| match s {
        Sent::CallbackAnswer {
            text, show_alert, ..
        } => Some((text.clone(), *show_alert)),
        _ => None,
    })
}

// =============================================================================
// Summon / drop
// =============================================================================

#[test]
fn test_summon_awards_character() {
    let h = Harness::new();
    h.command(PLAYER, "/summon");

    let owned = h.ledger.list_characters(PLAYER).unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].char_id, "c1");
    assert_eq!(owned[0].char_name, "Rex");
    assert_eq!(owned[0].rarity, "unknown");

    let replies = h.messenger.messages_to(PLAYER);
    assert_eq!(replies, vec!["You summoned <b>Rex</b>! (Rarity: unknown)"]);
}

#[test]
fn test_simulate_drop_shares_summon() {
    let h = Harness::new();
    h.command(PLAYER, "/simulate_drop");
    h.command(PLAYER, "/summon");

    assert_eq!(h.ledger.list_characters(PLAYER).unwrap().len(), 2);
    assert_eq!(
        h.messenger.messages_to(PLAYER)[0],
        "A wild card dropped: Rex! It's yours."
    );
}

#[test]
fn test_summon_with_empty_catalog() {
    let h = Harness::with_catalogs(&json!([]), &SHOP);
    h.command(PLAYER, "/summon");
    h.command(PLAYER, "/simulate_drop");

    assert!(h.ledger.list_characters(PLAYER).unwrap().is_empty());
    assert_eq!(
        h.messenger.messages_to(PLAYER),
        vec![replies::NOTHING_TO_SUMMON, replies::NOTHING_TO_DROP]
    );
}

// =============================================================================
// Shop / purchase
// =============================================================================

#[test]
fn test_shop_lists_buy_buttons() {
    let h = Harness::new();
    h.command(PLAYER, "/shop");

    let sent = h.messenger.take();
    let Some(Sent::Message(msg)) = sent.first() else {
        panic!("expected a shop listing, got {:?}", sent);
    };
    assert!(msg.text.contains("Potion - 10 coins\nHeals a little"));
    let markup = msg.reply_markup.as_ref().expect("listing has buttons");
    let payloads: Vec<_> = markup
        .inline_keyboard
        .iter()
        .map(|row| row[0].callback_data.as_str())
        .collect();
    assert_eq!(payloads, vec!["buy:potion", "buy:ticket"]);
}

#[test]
fn test_empty_shop() {
    let h = Harness::with_catalogs(&CHARACTERS, &json!([]));
    h.command(PLAYER, "/shop");
    assert_eq!(h.messenger.messages_to(PLAYER), vec![replies::SHOP_EMPTY]);
}

#[test]
fn test_buy_with_insufficient_funds() {
    let h = Harness::new();
    h.ledger.add_coins(PLAYER, 50).unwrap();

    h.press(PLAYER, "buy:ticket");

    assert_eq!(h.ledger.get_coins(PLAYER).unwrap(), 50);
    let (text, alert) = callback_answer(&h.messenger.take()).expect("callback answered");
    assert!(alert);
    assert_eq!(text.as_deref(), Some("Not enough coins: you have 50, this costs 100."));
}

#[test]
fn test_buy_debits_price() {
    let h = Harness::new();
    h.ledger.add_coins(PLAYER, 120).unwrap();

    h.press(PLAYER, "buy:ticket");

    assert_eq!(h.ledger.get_coins(PLAYER).unwrap(), 20);
    let (text, _) = callback_answer(&h.messenger.take()).expect("callback answered");
    assert!(text.unwrap().starts_with("Purchase successful!"));
}

#[test]
fn test_buy_unknown_item_edits_listing() {
    let h = Harness::new();
    h.ledger.add_coins(PLAYER, 500).unwrap();

    h.press(PLAYER, "buy:sword");

    assert_eq!(h.ledger.get_coins(PLAYER).unwrap(), 500);
    let sent = h.messenger.take();
    assert!(sent.contains(&Sent::Edit {
        chat_id: PLAYER,
        message_id: 11,
        text: replies::ITEM_NOT_FOUND.to_string(),
    }));
}

#[test]
fn test_foreign_callback_is_acknowledged() {
    let h = Harness::new();
    h.press(PLAYER, "vote:yes");
    assert_eq!(callback_answer(&h.messenger.take()), Some((None, false)));
}

// =============================================================================
// Admin commands
// =============================================================================

#[test]
fn test_backup_rejects_non_admin() {
    let h = Harness::new();
    h.command(PLAYER, "/backup");

    assert_eq!(h.messenger.messages_to(PLAYER), vec![replies::NOT_AUTHORIZED]);
    assert!(!h.backups_dir().exists());
}

#[test]
fn test_backup_by_admin() {
    let h = Harness::new();
    h.ledger.add_coins(PLAYER, 77).unwrap();
    h.command(ADMIN, "/backup");

    let files: Vec<_> = fs::read_dir(h.backups_dir())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);

    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("bot_db_backup_") && name.ends_with(".db"));
    assert_eq!(
        h.messenger.messages_to(ADMIN),
        vec![format!("Backup created: {}", name)]
    );

    let copy = Ledger::open(&files[0]).unwrap();
    assert_eq!(copy.get_coins(PLAYER).unwrap(), 77);
}

#[test]
fn test_grant() {
    let h = Harness::new();
    h.command(ADMIN, "/grant 42 100");
    assert_eq!(h.ledger.get_coins(PLAYER).unwrap(), 100);

    h.command(ADMIN, "/grant 42 -150");
    assert_eq!(h.ledger.get_coins(PLAYER).unwrap(), 100);

    h.command(ADMIN, "/grant 42");
    h.command(PLAYER, "/grant 42 1000");
    assert_eq!(h.ledger.get_coins(PLAYER).unwrap(), 100);

    h.command(ADMIN, &format!("/grant 42 {}", i64::MAX));
    assert_eq!(h.ledger.get_coins(PLAYER).unwrap(), 100);

    let admin_replies = h.messenger.messages_to(ADMIN);
    assert_eq!(admin_replies[1], "Refused: user 42 only has 100 coins.");
    assert_eq!(admin_replies[2], replies::GRANT_USAGE);
    assert_eq!(
        admin_replies[3],
        "Refused: user 42 already has 100 coins; that amount would overflow."
    );
    assert_eq!(h.messenger.messages_to(PLAYER), vec![replies::NOT_AUTHORIZED]);
}

// =============================================================================
// Informational commands
// =============================================================================

#[test]
fn test_balance_and_collection() {
    let h = Harness::new();
    h.ledger.add_coins(PLAYER, 5).unwrap();
    h.command(PLAYER, "/summon");
    h.command(PLAYER, "/balance");
    h.command(PLAYER, "/collection");

    let texts = h.messenger.messages_to(PLAYER);
    assert_eq!(texts[1], "You have 5 coins.");
    assert_eq!(texts[2], "Your characters (1):\n- Rex (unknown)");
}

#[test]
fn test_plain_text_and_unknown_commands_are_ignored() {
    let h = Harness::new();
    h.command(PLAYER, "hello there");
    h.command(PLAYER, "/dance");
    assert!(h.messenger.take().is_empty());
}

#[test]
fn test_start_lists_commands() {
    let h = Harness::new();
    h.command(PLAYER, "/start");
    h.command(PLAYER, "/help");

    let texts = h.messenger.messages_to(PLAYER);
    assert!(texts[0].contains("/summon - summon a character"));
    assert_eq!(texts[1], replies::HELP);
}

// =============================================================================
// Error boundary
// =============================================================================

#[test]
fn test_internal_error_notifies_admins() {
    let h = Harness::new();
    fs::write(&h.config.characters_path, "not json").unwrap();

    h.command(PLAYER, "/summon");

    assert_eq!(h.messenger.messages_to(PLAYER), vec![replies::INTERNAL_ERROR]);
    let notices = h.messenger.messages_to(ADMIN);
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Error in handler <code>summon</code>"));
    assert!(notices[0].contains("Failed to parse catalog"));
    assert!(h.ledger.list_characters(PLAYER).unwrap().is_empty());
}

#[test]
fn test_failed_purchase_still_answers_callback() {
    let h = Harness::new();
    fs::remove_file(&h.config.shop_path).unwrap();

    h.press(PLAYER, "buy:potion");

    let sent = h.messenger.take();
    assert_eq!(callback_answer(&sent), Some((None, false)));
    assert!(sent.contains(&Sent::Message(OutgoingMessage::text(
        PLAYER,
        replies::INTERNAL_ERROR
    ))));
}

#[test]
fn test_unreachable_admin_does_not_stop_reporting() {
    let mut h = Harness::new();
    h.config.admins = AdminList::new(vec![ADMIN, 2]);
    h.messenger = RecordingMessenger::new().with_unreachable(ADMIN);
    fs::remove_file(&h.config.shop_path).unwrap();

    h.command(PLAYER, "/shop");

    assert_eq!(h.messenger.messages_to(PLAYER), vec![replies::INTERNAL_ERROR]);
    assert_eq!(h.messenger.messages_to(2).len(), 1);
}
