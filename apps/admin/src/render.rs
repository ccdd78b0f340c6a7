use client_core::{AdminGrid, CatalogCard};
use shared::domain::ProductField;

pub fn catalog_lines(cards: &[CatalogCard]) -> Vec<String> {
    cards
        .iter()
        .map(|card| format!("{:<32} {:>12}  {}", card.name, card.price_label, card.image))
        .collect()
}

/// One line per admin card: 1-based position, id, sort order, then the
/// editable regions as displayed.
pub fn admin_lines(grid: &AdminGrid) -> Vec<String> {
    grid.cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let text = move |field| {
                card.region(field)
                    .map(|region| region.text.as_str())
                    .unwrap_or_default()
            };
            format!(
                "{:>3}. [{}] #{} {} {} {}",
                index + 1,
                card.id,
                card.sort_order,
                text(ProductField::Name),
                text(ProductField::Price),
                text(ProductField::Image),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::view::{render_admin, render_catalog};
    use shared::domain::{Product, ProductId};

    fn products() -> Vec<Product> {
        vec![
            Product {
                id: ProductId::from("b"),
                name: "Banana".into(),
                price: 12.0,
                image: "https://x/b.png".into(),
                sort_order: 2,
            },
            Product {
                id: ProductId::from("a"),
                name: "Apple".into(),
                price: 1234.5,
                image: "https://x/a.png".into(),
                sort_order: 1,
            },
        ]
    }

    #[test]
    fn admin_lines_follow_sorted_grid() {
        let lines = admin_lines(&render_admin(&products()));
        assert_eq!(lines[0], "  1. [a] #1 Apple ₹1234.5 https://x/a.png");
        assert_eq!(lines[1], "  2. [b] #2 Banana ₹12 https://x/b.png");
    }

    #[test]
    fn catalog_lines_keep_server_order() {
        let lines = catalog_lines(&render_catalog(&products()));
        assert!(lines[0].starts_with("Banana"));
        assert!(lines[1].contains("₹1234.5"));
    }
}
