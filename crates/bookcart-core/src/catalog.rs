#![forbid(unsafe_code)]

//! The read-only catalog of purchasable items.
//!
//! A [`Catalog`] is built once and never mutated. It preserves the order its
//! items were given in; every projection over the cart follows that order.

use crate::price::Price;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Stable identity of a catalog item.
///
/// Encoded as a bare JSON integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(ItemId)
    }
}

impl From<i64> for ItemId {
    fn from(raw: i64) -> Self {
        ItemId(raw)
    }
}

/// A catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique, stable identifier.
    pub id: ItemId,
    /// Display title.
    pub name: String,
    /// Display author.
    pub author: String,
    /// Unit price.
    pub price: Price,
    /// Cover image reference (URL or asset path).
    #[serde(rename = "image", default)]
    pub image_ref: String,
}

impl Item {
    /// Build an item with a price in cents.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        author: impl Into<String>,
        price_cents: u64,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId(id),
            name: name.into(),
            author: author.into(),
            price: Price::from_cents(price_cents),
            image_ref: image_ref.into(),
        }
    }
}

/// Errors produced while building or loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    Io(std::io::Error),
    /// The catalog JSON is malformed or holds an invalid price.
    Parse(serde_json::Error),
    /// Two items share an identifier.
    DuplicateId(ItemId),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read catalog: {e}"),
            Self::Parse(e) => write!(f, "invalid catalog: {e}"),
            Self::DuplicateId(id) => write!(f, "duplicate catalog id {id}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Immutable, ordered list of items with lookup by id.
#[derive(Clone, Debug)]
pub struct Catalog {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate identifiers.
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if index.insert(item.id, pos).is_some() {
                return Err(CatalogError::DuplicateId(item.id));
            }
        }
        Ok(Self { items, index })
    }

    /// Parse a JSON array of items.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let items: Vec<Item> = serde_json::from_str(text)?;
        Self::new(items)
    }

    /// Read a JSON catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json(&text)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            items = catalog.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// The bookstore's built-in stock.
    #[must_use]
    pub fn builtin() -> Self {
        const COVER: &str = "https://images.unsplash.com/photo-";
        const CROP: &str = "?w=400&h=600&fit=crop";
        let cover = |photo: &str| format!("{COVER}{photo}{CROP}");
        let items = vec![
            Item::new(1, "The Great Gatsby", "F. Scott Fitzgerald", 1999, cover("1481627834876-b7833e8f5570")),
            Item::new(2, "To Kill a Mockingbird", "Harper Lee", 2250, cover("1532012197267-da84d127e765")),
            Item::new(3, "1984", "George Orwell", 1875, cover("1507003211169-0a1dd7228f2d")),
            Item::new(4, "Pride and Prejudice", "Jane Austen", 2125, cover("1543002588-bfa74002ed7e")),
            Item::new(5, "The Catcher in the Rye", "J.D. Salinger", 2000, cover("1524995997946-a1c2e315a42f")),
            Item::new(6, "Lord of the Flies", "William Golding", 1799, cover("1512820790803-83ca734da794")),
            Item::new(7, "Animal Farm", "George Orwell", 1650, cover("1456513080510-7bf3a84b82f8")),
            Item::new(8, "The Hobbit", "J.R.R. Tolkien", 2499, cover("1506630448388-4e683c67ddb0")),
        ];
        let index = items.iter().enumerate().map(|(pos, item)| (item.id, pos)).collect();
        Self { items, index }
    }

    /// Look up an item.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    /// Whether `id` names an item.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Items in catalog order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterate items in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_eight_unique_books() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 8);
        let rebuilt = Catalog::new(catalog.items().to_vec()).unwrap();
        assert_eq!(rebuilt.len(), 8);
        assert_eq!(catalog.get(ItemId(8)).unwrap().name, "The Hobbit");
        assert_eq!(catalog.get(ItemId(1)).unwrap().price.cents(), 1999);
        assert!(catalog.get(ItemId(9)).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let items = vec![
            Item::new(1, "A", "x", 100, ""),
            Item::new(1, "B", "y", 200, ""),
        ];
        assert!(matches!(
            Catalog::new(items),
            Err(CatalogError::DuplicateId(ItemId(1)))
        ));
    }

    #[test]
    fn from_json_reads_decimal_prices() {
        let catalog = Catalog::from_json(
            r#"[{"id":2,"name":"B","author":"y","price":22.5,"image":"b.png"},
                {"id":1,"name":"A","author":"x","price":19.99}]"#,
        )
        .unwrap();
        let ids: Vec<ItemId> = catalog.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![ItemId(2), ItemId(1)]);
        assert_eq!(catalog.get(ItemId(1)).unwrap().image_ref, "");
        assert_eq!(catalog.get(ItemId(2)).unwrap().price.cents(), 2250);
    }

    #[test]
    fn from_json_rejects_negative_price() {
        let err = Catalog::from_json(r#"[{"id":1,"name":"A","author":"x","price":-1}]"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn from_json_rejects_sub_cent_price() {
        let err = Catalog::from_json(
            r#"[{"id":1,"name":"A","author":"x","price":0.004},
                {"id":2,"name":"B","author":"y","price":0.004}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(err.to_string().contains("whole number of cents"));
    }

    #[test]
    fn item_id_parses_with_or_without_hash() {
        assert_eq!("3".parse::<ItemId>().unwrap(), ItemId(3));
        assert_eq!(" #12 ".parse::<ItemId>().unwrap(), ItemId(12));
        assert!("x".parse::<ItemId>().is_err());
    }
}
