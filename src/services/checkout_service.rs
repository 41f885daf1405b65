//! Checkout hand-off: the order of record is a pre-filled WhatsApp message.
//! Nothing is persisted and repeated checkouts are not deduplicated.

use crate::{
    config::AppConfig,
    db::DbPool,
    dto::cart::{CartLine, CheckoutLink},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::cart_service::load_cart,
};

const MESSAGE_HEADER: &str = "berikut pesanan saya :\n\n";

/// Group digits the way id-ID does: `1234567` -> `1.234.567`.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

fn display_name(line: &CartLine) -> String {
    let name = line.product.name.trim();
    if name.is_empty() {
        format!("Product #{}", line.product_id)
    } else {
        name.to_string()
    }
}

/// Render the order text. Same lines in the same order give the same bytes.
pub fn format_order_message(lines: &[CartLine], total_price: i64) -> String {
    let mut message = String::from(MESSAGE_HEADER);
    for line in lines {
        message.push_str(&format!(
            "{} x{}: Rp {}\n",
            display_name(line),
            line.quantity,
            format_rupiah(line.line_total)
        ));
    }
    message.push_str(&format!("\ndan total harga: Rp {}", format_rupiah(total_price)));
    message
}

/// `https://wa.me/<digits>?text=<percent-encoded message>`
pub fn whatsapp_link(number: &str, message: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!("https://wa.me/{digits}?text={}", urlencoding::encode(message))
}

pub async fn checkout(
    pool: &DbPool,
    config: &AppConfig,
    user: &AuthUser,
) -> AppResult<ApiResponse<CheckoutLink>> {
    let summary = load_cart(pool, user.account_id).await?;
    if summary.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let message = format_order_message(&summary.items, summary.total_price);
    let whatsapp_url = whatsapp_link(&config.whatsapp_number, &message);

    tracing::info!(
        account_id = user.account_id,
        lines = summary.items.len(),
        total = summary.total_price,
        "checkout link generated"
    );
    Ok(ApiResponse::success(
        "Checkout link ready",
        CheckoutLink {
            message,
            whatsapp_url,
            total_items: summary.total_items,
            total_price: summary.total_price,
        },
        Some(Meta::empty()),
    ))
}
