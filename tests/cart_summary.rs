use mukena_storefront::{
    dto::cart::CartLine,
    error::AppError,
    models::ProductView,
    services::cart_service::{line_total, summarize},
};

fn line(id: i64, product_id: i64, price: i64, quantity: i32) -> CartLine {
    CartLine {
        id,
        account_id: 1,
        product_id,
        quantity,
        line_total: line_total(quantity, price).expect("line total"),
        product: ProductView {
            id: product_id,
            name: format!("Mukena {product_id}"),
            price,
            category: "Katun".into(),
            photo: None,
            description: None,
            extra_photo_1: None,
            extra_photo_2: None,
            extra_photo_3: None,
        },
    }
}

#[test]
fn line_total_is_quantity_times_price() {
    assert_eq!(line_total(3, 100_000).ok(), Some(300_000));
    assert_eq!(line_total(1, 185_000).ok(), Some(185_000));
}

#[test]
fn line_total_overflow_is_rejected_instead_of_wrapping() {
    let result = line_total(2, i64::MAX);
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[test]
fn summary_overflow_is_rejected_instead_of_wrapping() {
    let mut big = line(1, 7, 1, 1);
    big.line_total = i64::MAX - 10;
    let lines = vec![big, line(2, 9, 100_000, 1)];

    let result = summarize(lines);
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[test]
fn single_product_scenario() -> anyhow::Result<()> {
    let summary = summarize(vec![line(1, 7, 100_000, 2)])?;
    assert_eq!(summary.total_items, 2);
    assert_eq!(summary.total_price, 200_000);

    let summary = summarize(vec![line(1, 7, 100_000, 3)])?;
    assert_eq!(summary.items.len(), 1);
    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.total_price, 300_000);
    Ok(())
}

#[test]
fn summary_matches_recomputation_from_lines() -> anyhow::Result<()> {
    let lines = vec![
        line(1, 7, 100_000, 2),
        line(2, 9, 275_000, 1),
        line(3, 11, 95_000, 4),
    ];
    let expected_price: i64 = lines
        .iter()
        .map(|l| i64::from(l.quantity) * l.product.price)
        .sum();
    let expected_items: i64 = lines.iter().map(|l| i64::from(l.quantity)).sum();

    let summary = summarize(lines)?;
    assert_eq!(summary.total_price, expected_price);
    assert_eq!(summary.total_items, expected_items);
    Ok(())
}

#[test]
fn empty_cart_sums_to_zero() -> anyhow::Result<()> {
    let summary = summarize(Vec::new())?;
    assert!(summary.items.is_empty());
    assert_eq!(summary.total_items, 0);
    assert_eq!(summary.total_price, 0);
    Ok(())
}

#[test]
fn summary_serializes_with_storefront_field_names() -> anyhow::Result<()> {
    let summary = summarize(vec![line(5, 7, 100_000, 2)])?;
    let json = serde_json::to_value(&summary)?;
    assert_eq!(json["total_items"], 2);
    assert_eq!(json["total_harga"], 200_000);
    let item = &json["items"][0];
    assert_eq!(item["produk_id"], 7);
    assert_eq!(item["jumlah"], 2);
    assert_eq!(item["total_harga"], 200_000);
    assert_eq!(item["product"]["nama_produk"], "Mukena 7");
    assert_eq!(item["product"]["harga"], 100_000);
    Ok(())
}
