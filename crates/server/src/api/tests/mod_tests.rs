use super::*;
use shared::error::ErrorCode;

async fn setup() -> ApiContext {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    ApiContext { storage }
}

fn pie() -> NewProduct {
    NewProduct {
        name: "  Apple Pie ".into(),
        price: 120.0,
        image: "https://cdn.example/pie.png".into(),
        sort_order: 1,
    }
}

#[tokio::test]
async fn create_trims_name_and_assigns_id() {
    let ctx = setup().await;
    let product = create_product(&ctx, pie()).await.expect("create");
    assert_eq!(product.name, "Apple Pie");
    assert!(!product.id.is_empty());
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let ctx = setup().await;
    let err = create_product(
        &ctx,
        NewProduct {
            price: -1.0,
            ..pie()
        },
    )
    .await
    .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);

    let product = create_product(&ctx, pie()).await.expect("create");
    let err = update_product(&ctx, &product.id, FieldEdit::Price(f64::NAN))
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn update_of_unknown_product_is_not_found() {
    let ctx = setup().await;
    let err = update_product(&ctx, &ProductId::from("nope"), FieldEdit::SortOrder(1))
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_then_list_omits_product() {
    let ctx = setup().await;
    let product = create_product(&ctx, pie()).await.expect("create");
    delete_product(&ctx, &product.id).await.expect("delete");

    let products = list_products(&ctx).await.expect("list");
    assert!(products.iter().all(|p| p.id != product.id));

    let err = delete_product(&ctx, &product.id)
        .await
        .expect_err("second delete");
    assert_eq!(err.code, ErrorCode::NotFound);
}
