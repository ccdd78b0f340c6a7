use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque product identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub image: String,
    #[serde(default)]
    pub sort_order: i64,
}

/// Create body for `POST /api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub image: String,
    #[serde(default)]
    pub sort_order: i64,
}

impl NewProduct {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            image: self.image,
            sort_order: self.sort_order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductField {
    Name,
    Price,
    Image,
    SortOrder,
}

impl ProductField {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Price => "price",
            ProductField::Image => "image",
            ProductField::SortOrder => "sortOrder",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for ProductField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(ProductField::Name),
            "price" => Ok(ProductField::Price),
            "image" => Ok(ProductField::Image),
            "sortorder" | "sort_order" | "sort-order" => Ok(ProductField::SortOrder),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_uses_camel_case_sort_order_key() {
        let product = Product {
            id: ProductId::from("p-1"),
            name: "Apple Pie".into(),
            price: 120.0,
            image: "https://cdn.example/pie.png".into(),
            sort_order: 3,
        };
        let json = serde_json::to_value(&product).expect("json");
        assert_eq!(json["sortOrder"], 3);
        assert_eq!(json["id"], "p-1");
    }

    #[test]
    fn product_accepts_document_store_id_alias() {
        let product: Product = serde_json::from_str(
            r#"{"_id":"65a1","name":"Banana","price":20,"image":"http://x.png","sortOrder":1}"#,
        )
        .expect("json");
        assert_eq!(product.id, ProductId::from("65a1"));
    }

    #[test]
    fn field_names_parse_case_insensitively() {
        assert_eq!("sortOrder".parse::<ProductField>(), Ok(ProductField::SortOrder));
        assert_eq!("PRICE".parse::<ProductField>(), Ok(ProductField::Price));
        assert!("colour".parse::<ProductField>().is_err());
    }
}
