use serde::{Deserialize, Serialize};

use crate::domain::{Product, ProductField};

pub const PRODUCTS_ROUTE: &str = "/api/products";

/// A single-field partial update. Serializes to the one-key PATCH body,
/// e.g. `{"sortOrder": 2}`; bodies with zero or several keys do not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldEdit {
    Name(String),
    Price(f64),
    Image(String),
    SortOrder(i64),
}

impl FieldEdit {
    pub fn field(&self) -> ProductField {
        match self {
            FieldEdit::Name(_) => ProductField::Name,
            FieldEdit::Price(_) => ProductField::Price,
            FieldEdit::Image(_) => ProductField::Image,
            FieldEdit::SortOrder(_) => ProductField::SortOrder,
        }
    }

    pub fn value_json(&self) -> serde_json::Value {
        match self {
            FieldEdit::Name(v) | FieldEdit::Image(v) => serde_json::Value::from(v.as_str()),
            FieldEdit::Price(v) => serde_json::Value::from(*v),
            FieldEdit::SortOrder(v) => serde_json::Value::from(*v),
        }
    }

    pub fn apply_to(&self, product: &mut Product) {
        match self {
            FieldEdit::Name(v) => product.name = v.clone(),
            FieldEdit::Price(v) => product.price = *v,
            FieldEdit::Image(v) => product.image = v.clone(),
            FieldEdit::SortOrder(v) => product.sort_order = *v,
        }
    }
}
