use std::collections::HashSet;

use chrono::{DateTime, Utc};
use shared::domain::{Product, ProductId};
use tracing::warn;

/// Snapshot of the product collection as last seen on the remote store.
///
/// Entries are never edited in place: every change installs a whole new
/// sequence through [`CatalogState::replace`].
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    products: Vec<Product>,
    fetched_at: Option<DateTime<Utc>>,
    revision: u64,
}

impl CatalogState {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Number of replacements applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Installs `products` wholesale. Duplicate ids keep their first
    /// occurrence.
    pub(crate) fn replace(&mut self, products: Vec<Product>) {
        let mut seen = HashSet::with_capacity(products.len());
        let mut unique = Vec::with_capacity(products.len());
        for product in products {
            if seen.insert(product.id.clone()) {
                unique.push(product);
            } else {
                warn!(id = %product.id, "dropping duplicate product id from snapshot");
            }
        }
        self.products = unique;
        self.fetched_at = Some(Utc::now());
        self.revision += 1;
    }

    /// A copy of the snapshot with `product` swapped in by id, or appended.
    pub(crate) fn with_upserted(&self, product: Product) -> Vec<Product> {
        let mut products = self.products.clone();
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => *slot = product,
            None => products.push(product),
        }
        products
    }

    pub(crate) fn without(&self, id: &ProductId) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| &p.id != id)
            .cloned()
            .collect()
    }

    pub fn search(&self, query: &str) -> Vec<Product> {
        filter_by_name(&self.products, query)
    }
}

/// Case-insensitive substring match on product names, preserving order.
pub fn filter_by_name(products: &[Product], query: &str) -> Vec<Product> {
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
