//! the game catalog: ordered items with stable positions
//!
//! position is the row/column into the content similarity matrix. names are
//! resolved case-insensitively; when two games share a name the first one in
//! catalog order wins.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// a single game in the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub game_id: String,
    pub name: String,
    /// display-only fields (cover_image, genres, ...), never inspected by ranking
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
impl Item {
    pub fn new(game_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            name: name.into(),
            attributes: serde_json::Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: serde_json::Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }
}

// artifacts exported from dataframes often carry numeric ids
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
#[error("duplicate game id in catalog: {0}")]
pub struct DuplicateId(pub String);

/// immutable, ordered collection of games
#[derive(Debug)]
pub struct Catalog {
    items: Vec<Item>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Result<Self, DuplicateId> {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut by_name = HashMap::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            if by_id.insert(item.game_id.clone(), position).is_some() {
                return Err(DuplicateId(item.game_id.clone()));
            }

            let key = item.name.to_lowercase();
            if let Some(&first) = by_name.get(&key) {
                log::warn!(
                    "duplicate game name '{}' at position {}, lookups resolve to position {}",
                    item.name,
                    position,
                    first
                );
            } else {
                by_name.insert(key, position);
            }
        }

        Ok(Self {
            items,
            by_id,
            by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, position: usize) -> Option<&Item> {
        self.items.get(position)
    }

    /// case-insensitive exact name lookup
    pub fn position_of_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        self.position_of_name(name).map(|p| &self.items[p])
    }

    pub fn find_by_id(&self, game_id: &str) -> Option<&Item> {
        self.by_id.get(game_id).map(|&p| &self.items[p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Item::new("1", "Portal"),
            Item::new("2", "Celeste"),
            Item::new("3", "portal"),
        ])
        .unwrap()
    }

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        let catalog = catalog();
        assert_eq!(catalog.position_of_name("CELESTE"), Some(1));
        assert_eq!(catalog.position_of_name("celeste"), Some(1));
        assert_eq!(catalog.position_of_name("Hades"), None);
    }

    #[test]
    fn test_duplicate_name_resolves_to_first() {
        let catalog = catalog();
        assert_eq!(catalog.position_of_name("portal"), Some(0));
        assert_eq!(catalog.find_by_name("PORTAL").unwrap().game_id, "1");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = Catalog::new(vec![Item::new("7", "A"), Item::new("7", "B")]).unwrap_err();
        assert_eq!(err.0, "7");
    }

    #[test]
    fn test_item_deserializes_numeric_id_and_attributes() {
        let item: Item = serde_json::from_str(
            r#"{"game_id": 42, "name": "Hades", "rating": 4.5, "genres": "Action"}"#,
        )
        .unwrap();

        assert_eq!(item.game_id, "42");
        assert_eq!(item.name, "Hades");
        assert_eq!(item.attributes["genres"], "Action");
        assert!(!item.attributes.contains_key("name"));
    }
}
