use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::record::{Character, ShopItem, BUY_PREFIX, MAX_CALLBACK_DATA};

/// Read a JSON array of records from disk.
///
/// Catalogs are small and edited by hand while the bot is running, so every
/// caller reads the file again instead of holding on to a copy.
fn load_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Failed to open catalog: {:?}", path))?;
    let records: Vec<T> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse catalog: {:?}", path))?;
    Ok(records)
}

/// Load and validate the character catalog
pub fn load_characters(path: &Path) -> Result<Vec<Character>> {
    let characters: Vec<Character> = load_json_array(path)?;
    validate_characters(&characters).with_context(|| format!("Invalid catalog: {:?}", path))?;
    Ok(characters)
}

/// Load and validate the shop catalog
pub fn load_shop_items(path: &Path) -> Result<Vec<ShopItem>> {
    let items: Vec<ShopItem> = load_json_array(path)?;
    validate_shop_items(&items).with_context(|| format!("Invalid catalog: {:?}", path))?;
    Ok(items)
}

fn validate_characters(characters: &[Character]) -> Result<()> {
    let mut seen = HashSet::new();
    for ch in characters {
        if ch.id.is_empty() {
            bail!("Character {:?} has an empty id", ch.name);
        }
        if !seen.insert(ch.id.as_str()) {
            bail!("Duplicate character id: {}", ch.id);
        }
        if !ch.weight.is_finite() || ch.weight < 0.0 {
            bail!("Character {} has invalid weight {}", ch.id, ch.weight);
        }
    }

    let total: f64 = characters.iter().map(|ch| ch.weight).sum();
    if !total.is_finite() {
        bail!("Character weights sum to {}", total);
    }
    Ok(())
}

fn validate_shop_items(items: &[ShopItem]) -> Result<()> {
    let mut seen = HashSet::new();
    for item in items {
        if item.id.is_empty() {
            bail!("Shop item {:?} has an empty id", item.name);
        }
        if !seen.insert(item.id.as_str()) {
            bail!("Duplicate shop item id: {}", item.id);
        }
        if item.price < 0 {
            bail!("Shop item {} has negative price {}", item.id, item.price);
        }
        if BUY_PREFIX.len() + item.id.len() > MAX_CALLBACK_DATA {
            bail!(
                "Shop item id {} is too long for a button payload ({} bytes max)",
                item.id,
                MAX_CALLBACK_DATA - BUY_PREFIX.len()
            );
        }
    }
    Ok(())
}
