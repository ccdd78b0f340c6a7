use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_client_settings, CatalogSession, EditOutcome, HttpRemoteStore, MemoryView, ProductForm,
};
use shared::domain::{ProductField, ProductId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

use render::{admin_lines, catalog_lines};

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides `CATALOG_SERVER_URL` and `admin.toml`.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the admin grid, or the public catalog with `--catalog`.
    List {
        #[arg(long)]
        catalog: bool,
    },
    Search {
        query: String,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        image: String,
        #[arg(long, default_value = "0")]
        sort_order: String,
    },
    /// Edit one field as if typed into the card, e.g. `set <id> price "₹1,200"`.
    Set {
        id: String,
        field: String,
        value: String,
    },
    Delete {
        id: String,
    },
    /// Persist a full ordering of product ids.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Drag the card at position `from` to position `to` (1-based).
    Move {
        from: usize,
        to: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_client_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    let remote = HttpRemoteStore::new(&settings)?;
    let server_url = remote.base_url().clone();

    let view = Arc::new(MemoryView::default());
    let session = CatalogSession::new(Arc::new(remote), view.clone())
        .with_reconcile_mode(settings.reconcile);
    info!(%server_url, reconcile = ?session.reconcile_mode(), "admin client ready");

    if !session.refresh().await {
        bail!("could not load products from {server_url}");
    }

    match cli.command {
        Command::List { catalog } => {
            let lines = if catalog {
                catalog_lines(&view.catalog())
            } else {
                admin_lines(&view.admin())
            };
            print_lines(&lines);
        }
        Command::Search { query } => {
            let count = session.handle_search(&query).await;
            print_lines(&catalog_lines(&view.catalog()));
            println!("{count} match(es)");
        }
        Command::Add {
            name,
            price,
            image,
            sort_order,
        } => {
            let mut form = ProductForm {
                name,
                price,
                image,
                sort_order,
            };
            ensure_applied(session.add_product(&mut form).await)?;
            print_lines(&admin_lines(&view.admin()));
        }
        Command::Set { id, field, value } => {
            let field: ProductField = field.parse()?;
            ensure_applied(
                session
                    .edit_field(&ProductId::from(id), field, Some(value.as_str()))
                    .await,
            )?;
            print_lines(&admin_lines(&view.admin()));
        }
        Command::Delete { id } => {
            ensure_applied(session.delete_product(&ProductId::from(id)).await)?;
            print_lines(&admin_lines(&view.admin()));
        }
        Command::Reorder { ids } => {
            let order: Vec<ProductId> = ids.into_iter().map(ProductId::from).collect();
            persist_order(&session, &order).await?;
            print_lines(&admin_lines(&view.admin()));
        }
        Command::Move { from, to } => {
            let grid = view.admin();
            let order = from
                .checked_sub(1)
                .zip(to.checked_sub(1))
                .and_then(|(from, to)| grid.drop_card(from, to))
                .with_context(|| {
                    format!("positions must be between 1 and {}", grid.cards.len())
                })?;
            persist_order(&session, &order).await?;
            print_lines(&admin_lines(&view.admin()));
        }
    }

    Ok(())
}

async fn persist_order(session: &CatalogSession, order: &[ProductId]) -> Result<()> {
    let report = session.reorder(order).await;
    if report.is_complete() {
        return Ok(());
    }
    for (id, err) in &report.failed {
        eprintln!("failed to reorder {id}: {err}");
    }
    bail!(
        "{} of {} items could not be reordered",
        report.failed.len(),
        order.len()
    )
}

fn ensure_applied(outcome: EditOutcome) -> Result<()> {
    match outcome {
        EditOutcome::Applied => Ok(()),
        EditOutcome::Aborted(err) => Err(anyhow!(err)),
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
