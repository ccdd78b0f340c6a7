use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use shared::domain::{Product, ProductField, ProductId};

pub fn format_price(price: f64) -> String {
    format!("₹{price}")
}

/// Read-only card in the public catalog grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogCard {
    pub id: ProductId,
    pub image: String,
    pub name: String,
    pub price_label: String,
}

/// An inline-editable region on an admin card.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableRegion {
    pub field: ProductField,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminCard {
    pub id: ProductId,
    pub image_preview: String,
    pub sort_order: i64,
    pub regions: Vec<EditableRegion>,
}

impl AdminCard {
    pub fn region(&self, field: ProductField) -> Option<&EditableRegion> {
        self.regions.iter().find(|r| r.field == field)
    }

    /// The action fired when `field` loses focus holding `text`.
    pub fn blur(&self, field: ProductField, text: &str) -> CardAction {
        CardAction::Blur {
            id: self.id.clone(),
            field,
            text: text.trim().to_string(),
        }
    }

    pub fn delete(&self) -> CardAction {
        CardAction::Delete {
            id: self.id.clone(),
        }
    }
}

/// User interactions an admin card can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    Blur {
        id: ProductId,
        field: ProductField,
        text: String,
    },
    Delete {
        id: ProductId,
    },
}

/// The admin container. A fresh grid is built on every render, which is
/// also where the drag-reorder capability lives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminGrid {
    pub cards: Vec<AdminCard>,
}

impl AdminGrid {
    pub fn order(&self) -> Vec<ProductId> {
        self.cards.iter().map(|c| c.id.clone()).collect()
    }

    pub fn card(&self, id: &ProductId) -> Option<&AdminCard> {
        self.cards.iter().find(|c| &c.id == id)
    }

    /// Emulates a drop: moves the card at `from` to `to` (0-based) and
    /// returns the resulting visual order. Out-of-range positions yield `None`.
    pub fn drop_card(&self, from: usize, to: usize) -> Option<Vec<ProductId>> {
        if from >= self.cards.len() || to >= self.cards.len() {
            return None;
        }
        let mut order = self.order();
        let moved = order.remove(from);
        order.insert(to, moved);
        Some(order)
    }
}

pub fn render_catalog(products: &[Product]) -> Vec<CatalogCard> {
    products
        .iter()
        .map(|p| CatalogCard {
            id: p.id.clone(),
            image: p.image.clone(),
            name: p.name.clone(),
            price_label: format_price(p.price),
        })
        .collect()
}

/// Admin cards ordered by `sort_order`; ties keep the server's order.
pub fn render_admin(products: &[Product]) -> AdminGrid {
    let mut sorted: Vec<&Product> = products.iter().collect();
    sorted.sort_by_key(|p| p.sort_order);
    AdminGrid {
        cards: sorted
            .into_iter()
            .map(|p| AdminCard {
                id: p.id.clone(),
                image_preview: p.image.clone(),
                sort_order: p.sort_order,
                regions: vec![
                    EditableRegion {
                        field: ProductField::Name,
                        text: p.name.clone(),
                    },
                    EditableRegion {
                        field: ProductField::Price,
                        text: format_price(p.price),
                    },
                    EditableRegion {
                        field: ProductField::Image,
                        text: p.image.clone(),
                    },
                ],
            })
            .collect(),
    }
}

/// Sink for the two projections. Each call replaces the whole container.
pub trait CatalogView: Send + Sync {
    fn render_catalog(&self, cards: Vec<CatalogCard>);
    fn render_admin(&self, grid: AdminGrid);
}

/// Keeps the most recently rendered containers in memory.
#[derive(Debug, Default)]
pub struct MemoryView {
    catalog: Mutex<Vec<CatalogCard>>,
    admin: Mutex<AdminGrid>,
    catalog_renders: AtomicUsize,
    admin_renders: AtomicUsize,
}

impl MemoryView {
    pub fn catalog(&self) -> Vec<CatalogCard> {
        self.catalog
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn admin(&self) -> AdminGrid {
        self.admin
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn catalog_renders(&self) -> usize {
        self.catalog_renders.load(Ordering::SeqCst)
    }

    pub fn admin_renders(&self) -> usize {
        self.admin_renders.load(Ordering::SeqCst)
    }
}

impl CatalogView for MemoryView {
    fn render_catalog(&self, cards: Vec<CatalogCard>) {
        *self
            .catalog
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = cards;
        self.catalog_renders.fetch_add(1, Ordering::SeqCst);
    }

    fn render_admin(&self, grid: AdminGrid) {
        *self
            .admin
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = grid;
        self.admin_renders.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, sort_order: i64) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("item {id}"),
            price: 1234.5,
            image: "https://x.png".into(),
            sort_order,
        }
    }

    #[test]
    fn admin_grid_sorts_by_sort_order_with_stable_ties() {
        let grid = render_admin(&[product("a", 2), product("b", 1), product("c", 2)]);
        let order: Vec<String> = grid.order().into_iter().map(|id| id.0).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn catalog_keeps_server_order_and_formats_price() {
        let cards = render_catalog(&[product("a", 2), product("b", 1)]);
        assert_eq!(cards[0].id, ProductId::from("a"));
        assert_eq!(cards[0].price_label, "₹1234.5");
        assert_eq!(format_price(120.0), "₹120");
    }

    #[test]
    fn drop_card_moves_item_and_rejects_out_of_range() {
        let grid = render_admin(&[product("a", 1), product("b", 2), product("c", 3)]);
        let order = grid.drop_card(1, 0).expect("in range");
        let order: Vec<String> = order.into_iter().map(|id| id.0).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert!(grid.drop_card(3, 0).is_none());
    }

    #[test]
    fn blur_action_trims_text() {
        let grid = render_admin(&[product("a", 1)]);
        let card = &grid.cards[0];
        assert_eq!(
            card.blur(ProductField::Name, "  New name "),
            CardAction::Blur {
                id: ProductId::from("a"),
                field: ProductField::Name,
                text: "New name".into(),
            }
        );
        assert_eq!(
            card.region(ProductField::Price).map(|r| r.text.as_str()),
            Some("₹1234.5")
        );
    }
}
