//! MegaMarket URL construction.

use crate::domain::value_objects::{PriceRange, SortMode};
use url::form_urlencoded::byte_serialize;

/// Default storefront origin.
pub const DEFAULT_ORIGIN: &str = "https://megamarket.ru";

/// Catalog filter id of the price facet.
const PRICE_FILTER_KEY: &str = "88C83F68482F447C9F4E401955196697";

/// Maps a sort mode to MegaMarket's numeric code.
#[must_use]
pub fn sort_code(sort: SortMode) -> &'static str {
    match sort {
        SortMode::PriceUp => "1",
        SortMode::PriceDown => "2",
        SortMode::Newly => "5",
        SortMode::Popular | SortMode::Rate => "0",
    }
}

/// Human-facing catalog URL, e.g.
/// `https://megamarket.ru/catalog/page-1/?q=Test+query#?sort=0`.
#[must_use]
pub fn catalog_url(
    origin: &str,
    query: &str,
    sample: u32,
    sort: SortMode,
    range: Option<PriceRange>,
) -> String {
    let escaped: String = byte_serialize(query.as_bytes()).collect();
    let mut url = format!(
        "{}/catalog/page-{}/?q={}#?sort={}",
        origin.trim_end_matches('/'),
        sample,
        escaped,
        sort_code(sort)
    );
    if let Some(range) = range {
        url.push_str("&filters=");
        url.push_str(&price_filter(range));
    }
    url
}

/// Price facet as the catalog page reads it from the fragment. Only the
/// JSON structural characters are percent-encoded.
fn price_filter(range: PriceRange) -> String {
    let raw = format!(
        "{{\"{}\":{{\"min\":{},\"max\":{}}}}}",
        PRICE_FILTER_KEY,
        range.down(),
        range.up()
    );
    let mut encoded = String::with_capacity(raw.len() + 16);
    for ch in raw.chars() {
        match ch {
            '{' => encoded.push_str("%7B"),
            '}' => encoded.push_str("%7D"),
            ':' => encoded.push_str("%3A"),
            ',' => encoded.push_str("%2C"),
            other => encoded.push(other),
        }
    }
    encoded
}
