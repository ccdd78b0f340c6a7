use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use shared::domain::{NewProduct, ProductId};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/catalog.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert a handful of demo products.
    Seed,
    /// Print every stored product, with timestamps, as JSON.
    Export,
    /// Rewrite sort orders as 1..n following the current admin order.
    Renumber,
}

const SEED_PRODUCTS: [(&str, f64, &str); 4] = [
    ("Masala Chai", 30.0, "https://images.example.com/chai.png"),
    ("Filter Coffee", 45.0, "https://images.example.com/coffee.png"),
    ("Samosa", 25.0, "https://images.example.com/samosa.png"),
    ("Vada Pav", 40.0, "https://images.example.com/vada-pav.png"),
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Seed => {
            for (index, (name, price, image)) in SEED_PRODUCTS.into_iter().enumerate() {
                let product = storage
                    .create_product(&NewProduct {
                        name: name.to_string(),
                        price,
                        image: image.to_string(),
                        sort_order: index as i64 + 1,
                    })
                    .await?;
                println!("created product id={} name={}", product.id, product.name);
            }
        }
        Command::Export => {
            let rows: Vec<_> = storage
                .list_stored_products()
                .await?
                .into_iter()
                .map(|stored| {
                    json!({
                        "product": stored.product,
                        "createdAt": stored.created_at.to_rfc3339(),
                        "updatedAt": stored.updated_at.to_rfc3339(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Renumber => {
            let order = admin_order(&storage).await?;
            let updated = storage.renumber_sort_order(&order).await?;
            println!("renumbered {updated} product(s)");
        }
    }

    Ok(())
}

/// Ids in the order the admin grid shows them: by sort order, ties by
/// insertion order.
async fn admin_order(storage: &Storage) -> Result<Vec<ProductId>> {
    let mut products = storage.list_products().await?;
    products.sort_by_key(|p| p.sort_order);
    Ok(products.into_iter().map(|p| p.id).collect())
}
