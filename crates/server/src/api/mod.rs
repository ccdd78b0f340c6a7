use shared::{
    domain::{NewProduct, Product, ProductId},
    error::ApiError,
    protocol::FieldEdit,
};
use storage::Storage;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_products(ctx: &ApiContext) -> Result<Vec<Product>, ApiError> {
    ctx.storage.list_products().await.map_err(internal)
}

pub async fn create_product(ctx: &ApiContext, new_product: NewProduct) -> Result<Product, ApiError> {
    let new_product = NewProduct {
        name: new_product.name.trim().to_string(),
        image: new_product.image.trim().to_string(),
        ..new_product
    };
    validate_name(&new_product.name)?;
    validate_price(new_product.price)?;
    ctx.storage
        .create_product(&new_product)
        .await
        .map_err(internal)
}

pub async fn update_product(
    ctx: &ApiContext,
    id: &ProductId,
    edit: FieldEdit,
) -> Result<Product, ApiError> {
    match &edit {
        FieldEdit::Name(name) => validate_name(name)?,
        FieldEdit::Price(price) => validate_price(*price)?,
        FieldEdit::Image(_) | FieldEdit::SortOrder(_) => {}
    }
    ctx.storage
        .update_product_field(id, &edit)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))
}

pub async fn delete_product(ctx: &ApiContext, id: &ProductId) -> Result<(), ApiError> {
    let removed = ctx.storage.delete_product(id).await.map_err(internal)?;
    if !removed {
        return Err(not_found(id));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("product name cannot be empty"));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::validation(format!(
            "price must be a non-negative number, got {price}"
        )));
    }
    Ok(())
}

fn not_found(id: &ProductId) -> ApiError {
    ApiError::not_found(format!("product {id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(shared::error::ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
