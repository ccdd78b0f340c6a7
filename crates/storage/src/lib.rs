use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{
    domain::{NewProduct, Product, ProductId},
    protocol::FieldEdit,
};

const PRODUCT_COLUMNS: &str = "id, name, price, image, sort_order, created_at, updated_at";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// A product row together with its bookkeeping timestamps.
#[derive(Debug, Clone)]
pub struct StoredProduct {
    pub product: Product,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_product(&self, new_product: &NewProduct) -> Result<Product> {
        let id = ProductId::generate();
        let row = sqlx::query(&format!(
            "INSERT INTO products (id, name, price, image, sort_order)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_str())
        .bind(&new_product.name)
        .bind(new_product.price)
        .bind(&new_product.image)
        .bind(new_product.sort_order)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert product")?;
        Ok(stored_product_from_row(&row)?.product)
    }

    /// Products in insertion order.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self
            .list_stored_products()
            .await?
            .into_iter()
            .map(|stored| stored.product)
            .collect())
    }

    pub async fn list_stored_products(&self) -> Result<Vec<StoredProduct>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY position ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list products")?;
        rows.iter().map(stored_product_from_row).collect()
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| stored_product_from_row(&r).map(|stored| stored.product))
            .transpose()
    }

    /// Overwrites a single column. Returns `None` when no product has `id`.
    pub async fn update_product_field(
        &self,
        id: &ProductId,
        edit: &FieldEdit,
    ) -> Result<Option<Product>> {
        let column = match edit {
            FieldEdit::Name(_) => "name",
            FieldEdit::Price(_) => "price",
            FieldEdit::Image(_) => "image",
            FieldEdit::SortOrder(_) => "sort_order",
        };
        let sql = format!(
            "UPDATE products SET {column} = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?
             RETURNING {PRODUCT_COLUMNS}"
        );
        let query = sqlx::query(&sql);
        let query = match edit {
            FieldEdit::Name(value) | FieldEdit::Image(value) => query.bind(value.as_str()),
            FieldEdit::Price(value) => query.bind(*value),
            FieldEdit::SortOrder(value) => query.bind(*value),
        };
        let row = query
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to update {column} of product {id}"))?;
        row.map(|r| stored_product_from_row(&r).map(|stored| stored.product))
            .transpose()
    }

    /// Returns whether a row was removed.
    pub async fn delete_product(&self, id: &ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete product {id}"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Rewrites `sort_order` to `1..=n` following `order` in one transaction.
    pub async fn renumber_sort_order(&self, order: &[ProductId]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;
        for (index, id) in order.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE products SET sort_order = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )
            .bind(index as i64 + 1)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }
        tx.commit().await?;
        Ok(updated)
    }
}

fn stored_product_from_row(row: &SqliteRow) -> Result<StoredProduct> {
    Ok(StoredProduct {
        product: Product {
            id: ProductId(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            image: row.try_get("image")?,
            sort_order: row.try_get("sort_order")?,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
