use serde::{Deserialize, Serialize};

use crate::selector::Weighted;

/// Rarity shown when a character record omits one
pub const UNKNOWN_RARITY: &str = "unknown";

fn default_rarity() -> String {
    UNKNOWN_RARITY.to_string()
}

/// A summonable character from `characters.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default = "default_rarity")]
    pub rarity: String,
    /// Relative drop weight; records without one never drop
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Weighted for Character {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// An item for sale from `shop_items.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Prefix of the inline-button payload that starts a purchase
pub const BUY_PREFIX: &str = "buy:";

/// Telegram rejects callback payloads longer than this many bytes
pub const MAX_CALLBACK_DATA: usize = 64;

impl ShopItem {
    /// Callback payload carried by this item's "Buy" button
    pub fn callback_data(&self) -> String {
        format!("{}{}", BUY_PREFIX, self.id)
    }
}

/// Extract the item id from a `buy:<item_id>` payload
pub fn parse_buy_callback(data: &str) -> Option<&str> {
    data.strip_prefix(BUY_PREFIX).filter(|id| !id.is_empty())
}

/// Find a shop item by id
pub fn find_item<'a>(items: &'a [ShopItem], item_id: &str) -> Option<&'a ShopItem> {
    items.iter().find(|item| item.id == item_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_defaults() {
        let ch: Character = serde_json::from_str(r#"{"id": "c1", "name": "Rex"}"#).unwrap();
        assert_eq!(ch.rarity, "unknown");
        assert_eq!(ch.weight, 0.0);
        assert_eq!(ch.description, None);
    }

    #[test]
    fn test_parse_buy_callback() {
        assert_eq!(parse_buy_callback("buy:potion"), Some("potion"));
        assert_eq!(parse_buy_callback("buy:a:b"), Some("a:b"));
        assert_eq!(parse_buy_callback("buy:"), None);
        assert_eq!(parse_buy_callback("sell:potion"), None);
    }

    #[test]
    fn test_find_item() {
        let items = vec![
            ShopItem {
                id: "potion".into(),
                name: "Potion".into(),
                price: 10,
                description: None,
            },
            ShopItem {
                id: "ticket".into(),
                name: "Summon Ticket".into(),
                price: 100,
                description: None,
            },
        ];
        assert_eq!(find_item(&items, "ticket").map(|i| i.price), Some(100));
        assert!(find_item(&items, "sword").is_none());
        assert_eq!(items[1].callback_data(), "buy:ticket");
    }
}
