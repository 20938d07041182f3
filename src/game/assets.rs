//! Resolution of card image references.
//!
//! A resolver receives the combined deck with references relative to its resource
//! prefix and returns the same deck with every reference replaced by one clients can
//! load directly. Thumbnails are optional: clients fall back to the full image.

use crate::error::TableError;
use crate::game::deck::TableDeck;

pub trait DeckResolver: Send + Sync {
    fn resolve(&self, deck: TableDeck) -> Result<TableDeck, TableError>;
}

/// Rewrites references into absolute URLs without fetching anything.
///
/// `/path` references point at the local static server, `http(s)://` references are
/// kept, anything else is appended to the deck's resource prefix.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    serving_prefix: String,
    local_address: String,
}

impl UrlResolver {
    pub fn new(serving_prefix: impl Into<String>, local_address: impl Into<String>) -> Self {
        Self {
            serving_prefix: serving_prefix.into(),
            local_address: local_address.into(),
        }
    }

    fn absolute(&self, deck_prefix: &str, reference: &str) -> Result<String, TableError> {
        if reference.is_empty() {
            return Err(TableError::Asset("empty image reference".into()));
        }
        if let Some(path) = reference.strip_prefix('/') {
            return Ok(format!("{}/{}", self.local_address.trim_end_matches('/'), path));
        }
        if reference.starts_with("http:") || reference.starts_with("https:") {
            return Ok(reference.to_string());
        }
        Ok(format!("{deck_prefix}{reference}"))
    }
}

impl DeckResolver for UrlResolver {
    fn resolve(&self, mut deck: TableDeck) -> Result<TableDeck, TableError> {
        let prefix = std::mem::replace(&mut deck.resource_prefix, self.serving_prefix.clone());

        for (card, url) in deck.urls.iter_mut() {
            *url = self
                .absolute(&prefix, url)
                .map_err(|e| TableError::Asset(format!("card {card}: {e}")))?;
        }
        for url in deck.back_urls.values_mut() {
            *url = self.absolute(&prefix, url)?;
        }
        deck.default_back_url = self.absolute(&prefix, &deck.default_back_url)?;
        deck.urls_small.retain(|card, _| deck.urls.contains_key(card));

        Ok(deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(urls: &[&str]) -> TableDeck {
        let mut deck = TableDeck {
            deck_name: "test".into(),
            resource_prefix: "http://magiccards.info/scans/en/".into(),
            default_back_url: "/third_party/images/mtg_detail.jpg".into(),
            ..TableDeck::default()
        };
        for (i, url) in urls.iter().enumerate() {
            deck.urls.insert(i as u32, url.to_string());
        }
        deck
    }

    #[test]
    fn test_resolves_each_reference_style() {
        let resolver = UrlResolver::new("", "http://localhost:8000/");
        let resolved = resolver
            .resolve(deck(&["m13/10.jpg", "https://img.example/x.jpg", "/local/y.jpg"]))
            .unwrap();

        assert_eq!(resolved.urls[&0], "http://magiccards.info/scans/en/m13/10.jpg");
        assert_eq!(resolved.urls[&1], "https://img.example/x.jpg");
        assert_eq!(resolved.urls[&2], "http://localhost:8000/local/y.jpg");
        assert_eq!(
            resolved.default_back_url,
            "http://localhost:8000/third_party/images/mtg_detail.jpg"
        );
        assert_eq!(resolved.resource_prefix, "");
    }

    #[test]
    fn test_empty_reference_fails_whole_deck() {
        let resolver = UrlResolver::new("", "http://localhost:8000/");
        let err = resolver.resolve(deck(&["a.jpg", ""])).unwrap_err();
        assert!(matches!(err, TableError::Asset(msg) if msg.starts_with("card 1")));
    }
}
