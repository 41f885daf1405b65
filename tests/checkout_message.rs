use mukena_storefront::{
    dto::cart::CartLine,
    models::ProductView,
    services::{
        cart_service::{line_total, summarize},
        checkout_service::{format_order_message, format_rupiah, whatsapp_link},
    },
};

fn line(product_id: i64, name: &str, price: i64, quantity: i32) -> CartLine {
    CartLine {
        id: product_id,
        account_id: 1,
        product_id,
        quantity,
        line_total: line_total(quantity, price).expect("line total"),
        product: ProductView {
            id: product_id,
            name: name.to_string(),
            price,
            category: String::new(),
            photo: None,
            description: None,
            extra_photo_1: None,
            extra_photo_2: None,
            extra_photo_3: None,
        },
    }
}

#[test]
fn rupiah_uses_dot_thousands_separator() {
    assert_eq!(format_rupiah(0), "0");
    assert_eq!(format_rupiah(950), "950");
    assert_eq!(format_rupiah(1_000), "1.000");
    assert_eq!(format_rupiah(200_000), "200.000");
    assert_eq!(format_rupiah(1_234_567), "1.234.567");
    assert_eq!(format_rupiah(-45_000), "-45.000");
}

#[test]
fn message_lists_each_line_and_the_total() {
    let summary = summarize(vec![
        line(7, "Mukena Katun Jepang", 100_000, 3),
        line(9, "Mukena Anak Rayon", 95_000, 1),
    ])
    .expect("summary");
    let message = format_order_message(&summary.items, summary.total_price);
    assert_eq!(
        message,
        "berikut pesanan saya :\n\n\
         Mukena Katun Jepang x3: Rp 300.000\n\
         Mukena Anak Rayon x1: Rp 95.000\n\
         \ndan total harga: Rp 395.000"
    );
}

#[test]
fn message_is_deterministic() {
    let lines = vec![
        line(7, "Mukena Silk Premium", 275_000, 2),
        line(8, "Mukena Travel Parasut", 150_000, 1),
    ];
    let first = format_order_message(&lines, 700_000);
    let second = format_order_message(&lines.clone(), 700_000);
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn blank_name_falls_back_to_product_id() {
    let lines = vec![line(12, "  ", 50_000, 1)];
    let message = format_order_message(&lines, 50_000);
    assert!(message.contains("Product #12 x1: Rp 50.000\n"));
}

#[test]
fn link_percent_encodes_message_and_keeps_digits_only() {
    let link = whatsapp_link("+62 857-9434-5930", "a b\nRp 1.000");
    assert_eq!(
        link,
        "https://wa.me/6285794345930?text=a%20b%0ARp%201.000"
    );
}
