//! Wire types exchanged with the MegaMarket helper service.

use crate::domain::value_objects::PriceRange;
use serde::{Deserialize, Serialize};

/// Request body of `POST /mmarket`.
///
/// Serialized in declaration order, which is the layout the helper expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelperRequest {
    /// Free-text query.
    pub query: String,
    /// Page number as a decimal string.
    pub sample: String,
    /// MegaMarket sort code.
    pub sort: String,
    /// Always false: only products in stock are wanted.
    pub show_not_available: bool,
    /// Whether `price_filter` carries a range.
    pub is_price_filter_set: bool,
    /// Price bounds as decimal strings, empty when unset.
    pub price_filter: HelperPriceFilter,
}

/// Price bounds of a [`HelperRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HelperPriceFilter {
    /// Lower bound.
    pub price_down: String,
    /// Upper bound.
    pub price_up: String,
}

impl HelperRequest {
    /// Builds a request body.
    #[must_use]
    pub fn new(query: &str, sample: u32, sort_code: &str, range: Option<PriceRange>) -> Self {
        let price_filter = range
            .map(|r| HelperPriceFilter {
                price_down: r.down().to_string(),
                price_up: r.up().to_string(),
            })
            .unwrap_or_default();

        Self {
            query: query.to_string(),
            sample: sample.to_string(),
            sort: sort_code.to_string(),
            show_not_available: false,
            is_price_filter_set: range.is_some(),
            price_filter,
        }
    }
}

/// Response body of `POST /mmarket`.
#[derive(Debug, Default, Deserialize)]
pub struct HelperResponse {
    /// Listed items.
    #[serde(default)]
    pub items: Vec<HelperItem>,
}

/// One listed item.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperItem {
    /// Product description.
    #[serde(default)]
    pub goods: HelperGoods,
    /// Listed price.
    #[serde(default)]
    pub price: i64,
    /// Price after discounts; zero for unavailable items.
    #[serde(default)]
    pub final_price: i64,
    /// The offer shown by default.
    #[serde(default)]
    pub favorite_offer: HelperOffer,
}

/// Product description of a [`HelperItem`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperGoods {
    /// Product title.
    #[serde(default)]
    pub title: String,
    /// Thumbnail URL.
    #[serde(default)]
    pub title_image: String,
    /// Product page URL.
    #[serde(default)]
    pub web_url: String,
    /// Brand.
    #[serde(default)]
    pub brand: String,
}

/// Merchant offer of a [`HelperItem`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperOffer {
    /// Merchant name.
    #[serde(default)]
    pub merchant_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn body_without_range() {
        let body = HelperRequest::new("iphone 15", 2, "0", None);
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"query":"iphone 15","sample":"2","sort":"0","show_not_available":false,"is_price_filter_set":false,"price_filter":{"price_down":"","price_up":""}}"#
        );
    }

    #[test]
    fn body_with_range() {
        let range = PriceRange::new(2000, 10000).unwrap();
        let body = HelperRequest::new("q", 1, "1", Some(range));
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"query":"q","sample":"1","sort":"1","show_not_available":false,"is_price_filter_set":true,"price_filter":{"price_down":"2000","price_up":"10000"}}"#
        );
    }

    #[test]
    fn response_field_names() {
        let json = r#"{"items":[{"goods":{"title":"T","titleImage":"I","webUrl":"U","brand":"B"},
            "price":100,"finalPrice":90,"favoriteOffer":{"merchantName":"M"}}]}"#;
        let response: HelperResponse = serde_json::from_str(json).unwrap();
        let item = &response.items[0];
        assert_eq!(item.goods.title_image, "I");
        assert_eq!(item.goods.web_url, "U");
        assert_eq!(item.final_price, 90);
        assert_eq!(item.favorite_offer.merchant_name, "M");
    }
}
