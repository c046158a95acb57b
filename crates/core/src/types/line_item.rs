//! Cart line items.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// One product entry in the cart together with its quantity.
///
/// The serialized field names (`image_url` in particular) are the stored
/// format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier, unique within a cart.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Number of units, at least 1 for any item held by a cart.
    pub quantity: u32,
}

/// A product being added to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

impl NewLineItem {
    /// Create a new line item description.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Convert into a line item holding a single unit.
    #[must_use]
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

impl From<LineItem> for NewLineItem {
    fn from(item: LineItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewLineItem {
        NewLineItem::new(
            ProductId::parse("a").unwrap(),
            "Pineapple",
            "https://img.example/a.png",
            Price::from_cents(1000),
        )
    }

    #[test]
    fn test_into_line_item_starts_at_one() {
        let item = sample().into_line_item();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.id, "a");
    }

    #[test]
    fn test_stored_field_names() {
        let json = serde_json::to_value(sample().into_line_item()).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["id", "image_url", "price", "quantity", "title"]);
    }

    #[test]
    fn test_parse_stored_item() {
        let json = r#"{"id":"x","title":"Shirt","image_url":"u","price":25.9,"quantity":3}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "x");
        assert_eq!(item.image_url, "u");
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let json = r#"{"id":"x","title":"t","image_url":"u","price":1,"quantity":-1}"#;
        assert!(serde_json::from_str::<LineItem>(json).is_err());
    }
}
