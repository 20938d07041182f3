//! Deck catalog and the combined deck a table is dealt from.
//!
//! The catalog is an ordered list of scraped decks. A table combines two of them:
//! the first deck keeps ids `0..n`, the second continues from `n`.

use std::collections::BTreeMap;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::game::types::CardId;

const BUILTIN_CATALOG: &str = include_str!("../../decks/catalog.json");

/// One catalog entry: image suffixes relative to `resource_prefix`, in deal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckDescriptor {
    pub name: String,
    pub resource_prefix: String,
    pub default_back_url: String,
    pub cards: Vec<String>,
    /// Back images for individual cards, by position in `cards`.
    #[serde(default)]
    pub backs: BTreeMap<usize, String>,
}

#[derive(Debug, Clone)]
pub struct DeckCatalog {
    decks: Vec<DeckDescriptor>,
}

impl DeckCatalog {
    pub fn new(decks: Vec<DeckDescriptor>) -> Result<Self, TableError> {
        if decks.is_empty() {
            return Err(TableError::EmptyCatalog);
        }
        Ok(Self { decks })
    }

    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let catalog = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!("[DeckCatalog] Loaded {} decks from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn get(&self, index: usize) -> Result<&DeckDescriptor, TableError> {
        self.decks.get(index).ok_or(TableError::MissingDeck(index))
    }

    /// Index following `index`, wrapping to the start of the catalog.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.decks.len()
    }

    /// Combines two catalog decks into the unresolved deck of one table.
    pub fn combine(&self, first: usize, second: usize) -> Result<TableDeck, TableError> {
        let a = self.get(first)?;
        let b = self.get(second)?;

        let mut deck = TableDeck {
            deck_name: format!("{} vs {}", a.name, b.name),
            resource_prefix: a.resource_prefix.clone(),
            default_back_url: a.default_back_url.clone(),
            ..TableDeck::default()
        };
        let mut next_id: CardId = 0;
        for source in [a, b] {
            for (pos, suffix) in source.cards.iter().enumerate() {
                deck.urls.insert(next_id, qualify(source, suffix, a));
                if let Some(back) = source.backs.get(&pos) {
                    deck.back_urls.insert(next_id, qualify(source, back, a));
                } else if source.default_back_url != a.default_back_url {
                    deck.back_urls.insert(next_id, source.default_back_url.clone());
                }
                next_id += 1;
            }
        }
        Ok(deck)
    }
}

/// References of the second deck are made absolute when the two decks do not
/// share a resource prefix, so one prefix can serve the combined deck.
fn qualify(source: &DeckDescriptor, suffix: &str, primary: &DeckDescriptor) -> String {
    if source.resource_prefix == primary.resource_prefix
        || suffix.starts_with('/')
        || suffix.contains("://")
    {
        suffix.to_string()
    } else {
        format!("{}{}", source.resource_prefix, suffix)
    }
}

/// Image references for every card of one epoch, keyed by card id.
///
/// Serialized as part of the client snapshot, hence the wire field names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableDeck {
    pub deck_name: String,
    pub resource_prefix: String,
    pub default_back_url: String,
    pub urls: BTreeMap<CardId, String>,
    /// Thumbnails. Clients show a card missing here at full size.
    pub urls_small: BTreeMap<CardId, String>,
    pub back_urls: BTreeMap<CardId, String>,
    pub titles: BTreeMap<CardId, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, prefix: &str, cards: &[&str]) -> DeckDescriptor {
        DeckDescriptor {
            name: name.into(),
            resource_prefix: prefix.into(),
            default_back_url: "/images/back.jpg".into(),
            cards: cards.iter().map(|c| c.to_string()).collect(),
            backs: BTreeMap::new(),
        }
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = DeckCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(0).unwrap().name, "Odric");
        assert!(catalog.get(1).unwrap().cards.len() == 60);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(DeckCatalog::from_json("[]"), Err(TableError::EmptyCatalog)));
        assert!(matches!(DeckCatalog::from_json("{"), Err(TableError::Json(_))));
    }

    #[test]
    fn test_next_index_wraps() {
        let catalog = DeckCatalog::new(vec![
            descriptor("a", "p/", &["1"]),
            descriptor("b", "p/", &["2"]),
            descriptor("c", "p/", &["3"]),
        ])
        .unwrap();
        assert_eq!(catalog.next_index(0), 1);
        assert_eq!(catalog.next_index(2), 0);
        assert!(matches!(catalog.get(3), Err(TableError::MissingDeck(3))));
    }

    #[test]
    fn test_combine_numbers_second_deck_after_first() {
        let catalog = DeckCatalog::new(vec![
            descriptor("red", "http://cards/", &["r/1.jpg", "r/2.jpg"]),
            descriptor("blue", "http://cards/", &["b/1.jpg", "b/2.jpg", "b/3.jpg"]),
        ])
        .unwrap();
        let deck = catalog.combine(0, 1).unwrap();
        assert_eq!(deck.urls.len(), 5);
        assert_eq!(deck.urls[&0], "r/1.jpg");
        assert_eq!(deck.urls[&2], "b/1.jpg");
        assert_eq!(deck.urls[&4], "b/3.jpg");
        assert_eq!(deck.deck_name, "red vs blue");
        assert!(deck.back_urls.is_empty());
    }

    #[test]
    fn test_combine_qualifies_foreign_prefix_and_backs() {
        let mut other = descriptor("blue", "http://elsewhere/", &["b/1.jpg"]);
        other.backs.insert(0, "b/back.jpg".into());
        let red = descriptor("red", "http://cards/", &["r/1.jpg"]);
        let catalog = DeckCatalog::new(vec![red, other]).unwrap();
        let deck = catalog.combine(0, 1).unwrap();
        assert_eq!(deck.urls[&1], "http://elsewhere/b/1.jpg");
        assert_eq!(deck.back_urls[&1], "http://elsewhere/b/back.jpg");
        assert!(!deck.back_urls.contains_key(&0));
        assert_eq!(deck.default_back_url, "/images/back.jpg");
    }
}
