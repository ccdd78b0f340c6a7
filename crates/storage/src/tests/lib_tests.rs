use super::*;

fn sample(name: &str, sort_order: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: 120.0,
        image: format!("https://cdn.example/{name}.png"),
        sort_order,
    }
}

#[tokio::test]
async fn creates_and_lists_products_in_insertion_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let pie = storage.create_product(&sample("pie", 2)).await.expect("pie");
    let tart = storage.create_product(&sample("tart", 1)).await.expect("tart");

    let products = storage.list_products().await.expect("list");
    assert_eq!(products, vec![pie, tart]);
    assert_ne!(products[0].id, products[1].id);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("catalog.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn updates_single_field_and_leaves_others() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage.create_product(&sample("pie", 1)).await.expect("pie");

    let updated = storage
        .update_product_field(&created.id, &FieldEdit::Price(1234.5))
        .await
        .expect("update")
        .expect("product exists");
    assert_eq!(updated.price, 1234.5);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.sort_order, created.sort_order);

    let renamed = storage
        .update_product_field(&created.id, &FieldEdit::Name("Apple Pie".into()))
        .await
        .expect("update")
        .expect("product exists");
    assert_eq!(renamed.name, "Apple Pie");
    assert_eq!(renamed.price, 1234.5);
}

#[tokio::test]
async fn repeated_identical_update_is_idempotent() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage.create_product(&sample("pie", 1)).await.expect("pie");

    for _ in 0..2 {
        storage
            .update_product_field(&created.id, &FieldEdit::SortOrder(7))
            .await
            .expect("update");
    }

    let products = storage.list_products().await.expect("list");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].sort_order, 7);
}

#[tokio::test]
async fn update_of_unknown_product_returns_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let missing = storage
        .update_product_field(&ProductId::from("missing"), &FieldEdit::SortOrder(1))
        .await
        .expect("update");
    assert!(missing.is_none());
}

#[tokio::test]
async fn delete_reports_whether_row_existed() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage.create_product(&sample("pie", 1)).await.expect("pie");

    assert!(storage.delete_product(&created.id).await.expect("delete"));
    assert!(!storage.delete_product(&created.id).await.expect("delete again"));
    assert!(storage.get_product(&created.id).await.expect("get").is_none());
}

#[tokio::test]
async fn renumber_rewrites_sort_order_contiguously() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let a = storage.create_product(&sample("a", 10)).await.expect("a");
    let b = storage.create_product(&sample("b", 10)).await.expect("b");
    let c = storage.create_product(&sample("c", -4)).await.expect("c");

    let updated = storage
        .renumber_sort_order(&[c.id.clone(), a.id.clone(), b.id.clone()])
        .await
        .expect("renumber");
    assert_eq!(updated, 3);

    let stored = storage.list_stored_products().await.expect("list");
    let orders: Vec<(String, i64)> = stored
        .iter()
        .map(|s| (s.product.name.clone(), s.product.sort_order))
        .collect();
    assert_eq!(
        orders,
        vec![("a".into(), 2), ("b".into(), 3), ("c".into(), 1)]
    );
    assert!(stored.iter().all(|s| s.updated_at >= s.created_at));
}
