use shared::domain::{NewProduct, ProductField};

use crate::{error::ValidationError, validate::parse_leading_integer};

/// Raw contents of the add-product form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub image: String,
    pub sort_order: String,
}

impl ProductForm {
    /// Price and sort order are read as integers, so `"12.9"` becomes `12`.
    pub fn to_new_product(&self) -> Result<NewProduct, ValidationError> {
        let price = parse_leading_integer(&self.price).ok_or_else(|| {
            ValidationError::InvalidInteger {
                field: ProductField::Price,
                raw: self.price.clone(),
            }
        })?;
        if price < 0 {
            return Err(ValidationError::InvalidPrice {
                value: price as f64,
            });
        }
        let sort_order = parse_leading_integer(&self.sort_order).ok_or_else(|| {
            ValidationError::InvalidInteger {
                field: ProductField::SortOrder,
                raw: self.sort_order.clone(),
            }
        })?;
        Ok(NewProduct {
            name: self.name.trim().to_string(),
            price: price as f64,
            image: self.image.trim().to_string(),
            sort_order,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_price_is_truncated() {
        let form = ProductForm {
            name: " Apple Pie ".into(),
            price: "12.9".into(),
            image: " https://x.png ".into(),
            sort_order: "3".into(),
        };
        let product = form.to_new_product().expect("valid form");
        assert_eq!(product.price, 12.0);
        assert_eq!(product.name, "Apple Pie");
        assert_eq!(product.image, "https://x.png");
        assert_eq!(product.sort_order, 3);
    }

    #[test]
    fn negative_price_is_rejected() {
        let form = ProductForm {
            name: "Refund".into(),
            price: "-5".into(),
            image: "https://x.png".into(),
            sort_order: "1".into(),
        };
        assert_eq!(
            form.to_new_product(),
            Err(ValidationError::InvalidPrice { value: -5.0 })
        );
    }

    #[test]
    fn unparseable_sort_order_is_rejected() {
        let form = ProductForm {
            name: "Pie".into(),
            price: "10".into(),
            image: "https://x.png".into(),
            sort_order: "top".into(),
        };
        assert!(matches!(
            form.to_new_product(),
            Err(ValidationError::InvalidInteger {
                field: ProductField::SortOrder,
                ..
            })
        ));
    }
}
