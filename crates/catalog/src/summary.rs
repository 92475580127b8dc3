//! Reduces raw catalog products to display-ready summaries.

use std::str::FromStr;

use rust_decimal::Decimal;

use clerky_core::ProductSummary;

use crate::Product;

pub const PRICE_UNAVAILABLE: &str = "Price not available";

const CURRENCY_SYMBOL: &str = "£";
const DESCRIPTION_SNIPPET_CHARS: usize = 220;

pub fn summarize(product: &Product) -> ProductSummary {
    let description = snippet(&strip_html(product.body_html.as_deref().unwrap_or_default()));
    ProductSummary { title: product.title.clone(), price: display_price(product), description }
}

/// Picks the first strictly positive, parseable price: variants in order
/// first, then the top-level price, then the placeholder. A price of
/// `0.00`, a negative price, or unparseable text never renders as a price.
pub fn display_price(product: &Product) -> String {
    for variant in &product.variants {
        if let Some(price) = variant.price.as_deref().and_then(parse_positive_price) {
            return format_price(price);
        }
    }

    if let Some(price) = product.price.as_deref().and_then(parse_positive_price) {
        return format_price(price);
    }

    PRICE_UNAVAILABLE.to_string()
}

fn parse_positive_price(raw: &str) -> Option<Decimal> {
    let value = Decimal::from_str(raw.trim()).ok()?;
    (value > Decimal::ZERO).then_some(value)
}

fn format_price(value: Decimal) -> String {
    format!("{CURRENCY_SYMBOL}{value:.2}")
}

/// Drops markup and decodes the handful of entities merchant descriptions
/// actually contain. Runs of whitespace collapse to single spaces.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    decode_entities(&collapsed)
}

fn decode_entities(text: &str) -> String {
    // `&amp;` decodes last so `&amp;lt;` does not double-decode into `<`.
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn snippet(text: &str) -> String {
    let mut count = 0;
    for (index, _) in text.char_indices() {
        if count == DESCRIPTION_SNIPPET_CHARS {
            let cut = text[..index].trim_end();
            return format!("{cut}...");
        }
        count += 1;
    }
    text.to_string()
}
