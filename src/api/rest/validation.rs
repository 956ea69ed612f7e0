//! # Query Validation
//!
//! Turns raw query parameters into a canonical [`ProductRequest`].
//!
//! Only `query` and `markets` can reject a request; the remaining common
//! parameters fall back to their defaults when missing or malformed.

use crate::application::dto::AsyncRequestBody;
use crate::domain::entities::ProductRequest;
use crate::domain::value_objects::{AmountMode, Market, PriceRange, PriceRangeError, SortMode};
use crate::infrastructure::messaging::{MessageHeaders, validate_headers};
use serde::Deserialize;
use thiserror::Error;

/// Raw query parameters shared by the product endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Free-text search query.
    pub query: Option<String>,
    /// Space-separated market names.
    pub markets: Option<String>,
    /// Page number.
    pub sample: Option<String>,
    /// Sort mode.
    pub sort: Option<String>,
    /// Amount mode.
    pub amount: Option<String>,
    /// `0` requests image links.
    #[serde(rename = "no-image")]
    pub no_image: Option<String>,
    /// Lower price bound.
    pub price_down: Option<String>,
    /// Upper price bound.
    pub price_up: Option<String>,
    /// Exact price.
    pub price: Option<String>,
}

/// Rejected request data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `query` is missing or empty.
    #[error("the query parameter is required")]
    MissingQuery,

    /// `query` carries an injection signature.
    #[error("the query parameter contains forbidden content")]
    UnsafeQuery,

    /// `markets` names no known market.
    #[error("at least one known market is required")]
    NoMarkets,

    /// A price bound is negative.
    #[error("prices must not be negative")]
    NegativePrice,

    /// The price bounds do not form a range.
    #[error("invalid price range: {0}")]
    PriceRange(#[from] PriceRangeError),

    /// The exact price is not positive.
    #[error("the price must be positive")]
    NonPositivePrice,

    /// The query string could not be decoded.
    #[error("malformed query string: {0}")]
    MalformedQuery(String),

    /// The request body is not valid JSON.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// A correlation header cannot be forwarded.
    #[error("{0}")]
    InvalidHeader(String),
}

/// Returns false if `data` looks like an injection attempt.
#[must_use]
pub fn is_data_safe(data: &str) -> bool {
    let data = data.to_lowercase();
    if data.contains('=') || data.contains("--") || data.contains("drop ") {
        return false;
    }
    !(data.contains("union ") && data.contains("select"))
}

/// Parses the market list, keeping known names in order of first mention.
#[must_use]
pub fn parse_markets(raw: &str) -> Vec<Market> {
    raw.split(' ')
        .filter_map(|token| Market::ALL.iter().copied().find(|m| m.wire_name() == token))
        .collect()
}

fn parse_sample(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(1)
}

fn parse_int(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// Parses the body of an async search into its correlation headers.
///
/// An empty or whitespace-only body carries no headers.
///
/// # Errors
///
/// Returns `ValidationError::MalformedBody` if the body is not JSON of the
/// expected shape, and `ValidationError::InvalidHeader` if a header could
/// not be written into a broker message.
pub fn async_headers(body: &[u8]) -> Result<MessageHeaders, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(MessageHeaders::new());
    }
    let body: AsyncRequestBody = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;
    validate_headers(&body.headers).map_err(|e| ValidationError::InvalidHeader(e.to_string()))?;
    Ok(body.headers)
}

impl ProductQuery {
    /// Validates the common parameters.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `query` is empty or unsafe, or if no
    /// known market is named.
    pub fn product_request(&self) -> Result<ProductRequest, ValidationError> {
        let query = self.query.as_deref().unwrap_or_default();
        if query.is_empty() {
            return Err(ValidationError::MissingQuery);
        }
        if !is_data_safe(query) {
            return Err(ValidationError::UnsafeQuery);
        }

        let markets = parse_markets(self.markets.as_deref().unwrap_or_default());
        if markets.is_empty() {
            return Err(ValidationError::NoMarkets);
        }

        Ok(ProductRequest::builder(query)
            .markets(markets)
            .sample(parse_sample(self.sample.as_deref()))
            .sort(SortMode::parse_or_default(
                self.sort.as_deref().unwrap_or_default(),
            ))
            .amount(AmountMode::parse_or_default(
                self.amount.as_deref().unwrap_or_default(),
            ))
            .no_image(self.no_image.as_deref() != Some("0"))
            .build())
    }

    /// Validates `price_down` and `price_up`.
    ///
    /// Missing or unparsable bounds count as zero.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` unless `0 <= price_down <= price_up` and
    /// `price_up > 0`.
    pub fn price_range(&self) -> Result<PriceRange, ValidationError> {
        let down = u64::try_from(parse_int(self.price_down.as_deref()))
            .map_err(|_| ValidationError::NegativePrice)?;
        let up = u64::try_from(parse_int(self.price_up.as_deref()))
            .map_err(|_| ValidationError::NegativePrice)?;
        Ok(PriceRange::new(down, up)?)
    }

    /// Validates `price`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NonPositivePrice` unless `price > 0`.
    pub fn exact_price(&self) -> Result<u64, ValidationError> {
        u64::try_from(parse_int(self.price.as_deref()))
            .ok()
            .filter(|p| *p > 0)
            .ok_or(ValidationError::NonPositivePrice)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(query: &str, markets: &str) -> ProductQuery {
        ProductQuery {
            query: Some(query.to_string()),
            markets: Some(markets.to_string()),
            ..ProductQuery::default()
        }
    }

    mod safety {
        use super::*;

        #[test]
        fn plain_queries_pass() {
            assert!(is_data_safe("iphone 15 pro"));
            assert!(is_data_safe("select chair"));
            assert!(is_data_safe("union jack flag"));
        }

        #[test]
        fn injection_signatures_fail() {
            assert!(!is_data_safe("a=b"));
            assert!(!is_data_safe("phone -- comment"));
            assert!(!is_data_safe("DROP table"));
            assert!(!is_data_safe("x UNION all SELECT y"));
        }
    }

    mod common {
        use super::*;

        #[test]
        fn defaults() {
            let request = query("phone", "wildberries").product_request().unwrap();
            assert_eq!(request.query(), "phone");
            assert_eq!(request.sample(), 1);
            assert_eq!(request.sort(), SortMode::Popular);
            assert_eq!(request.amount(), AmountMode::Min);
            assert!(request.no_image());
            assert_eq!(request.markets(), &[Market::Wildberries]);
        }

        #[test]
        fn explicit_values() {
            let raw = ProductQuery {
                sample: Some("3".to_string()),
                sort: Some("pricedown".to_string()),
                amount: Some("max".to_string()),
                no_image: Some("0".to_string()),
                ..query("phone", "megamarket wildberries")
            };
            let request = raw.product_request().unwrap();
            assert_eq!(request.sample(), 3);
            assert_eq!(request.sort(), SortMode::PriceDown);
            assert_eq!(request.amount(), AmountMode::Max);
            assert!(!request.no_image());
            assert_eq!(
                request.markets(),
                &[Market::MegaMarket, Market::Wildberries]
            );
        }

        #[test]
        fn bad_optional_values_fall_back() {
            let raw = ProductQuery {
                sample: Some("-4".to_string()),
                sort: Some("cheapest".to_string()),
                amount: Some("all".to_string()),
                no_image: Some("yes".to_string()),
                ..query("phone", "wildberries")
            };
            let request = raw.product_request().unwrap();
            assert_eq!(request.sample(), 1);
            assert_eq!(request.sort(), SortMode::Popular);
            assert_eq!(request.amount(), AmountMode::Min);
            assert!(request.no_image());
        }

        #[test]
        fn markets_are_deduplicated_and_filtered() {
            assert_eq!(
                parse_markets("ozon wildberries wildberries megamarket"),
                vec![Market::Wildberries, Market::Wildberries, Market::MegaMarket]
            );
            let request = query("phone", "ozon wildberries wildberries")
                .product_request()
                .unwrap();
            assert_eq!(request.markets(), &[Market::Wildberries]);
        }

        #[test]
        fn rejections() {
            assert_eq!(
                ProductQuery::default().product_request().unwrap_err(),
                ValidationError::MissingQuery
            );
            assert_eq!(
                query("a=1", "wildberries").product_request().unwrap_err(),
                ValidationError::UnsafeQuery
            );
            assert_eq!(
                query("phone", "ozon").product_request().unwrap_err(),
                ValidationError::NoMarkets
            );
            assert_eq!(
                query("phone", "Wildberries").product_request().unwrap_err(),
                ValidationError::NoMarkets
            );
        }
    }

    mod async_body {
        use super::*;

        #[test]
        fn blank_body_has_no_headers() {
            assert!(async_headers(b"").unwrap().is_empty());
            assert!(async_headers(b"  \n").unwrap().is_empty());
        }

        #[test]
        fn forwards_headers() {
            let headers = async_headers(br#"{"headers":{"chat-id":"42"}}"#).unwrap();
            assert_eq!(headers.get("chat-id").map(String::as_str), Some("42"));
        }

        #[test]
        fn malformed_json() {
            assert!(matches!(
                async_headers(b"{not json"),
                Err(ValidationError::MalformedBody(_))
            ));
        }

        #[test]
        fn line_breaks_are_rejected() {
            assert!(matches!(
                async_headers(br#"{"headers":{"X":"a\r\nInjected: evil"}}"#),
                Err(ValidationError::InvalidHeader(_))
            ));
            assert!(matches!(
                async_headers(br#"{"headers":{"X-Bad\r\nName":"v"}}"#),
                Err(ValidationError::InvalidHeader(_))
            ));
        }
    }

    mod prices {
        use super::*;

        fn range(down: Option<&str>, up: Option<&str>) -> Result<PriceRange, ValidationError> {
            ProductQuery {
                price_down: down.map(str::to_string),
                price_up: up.map(str::to_string),
                ..ProductQuery::default()
            }
            .price_range()
        }

        #[test]
        fn valid_ranges() {
            assert_eq!(
                range(Some("100"), Some("500")).unwrap(),
                PriceRange::new(100, 500).unwrap()
            );
            assert_eq!(
                range(None, Some("500")).unwrap(),
                PriceRange::new(0, 500).unwrap()
            );
            assert_eq!(
                range(Some("500"), Some("500")).unwrap(),
                PriceRange::new(500, 500).unwrap()
            );
        }

        #[test]
        fn invalid_ranges() {
            assert_eq!(
                range(Some("-1"), Some("500")).unwrap_err(),
                ValidationError::NegativePrice
            );
            assert!(matches!(
                range(Some("100"), None).unwrap_err(),
                ValidationError::PriceRange(_)
            ));
            assert!(matches!(
                range(Some("600"), Some("500")).unwrap_err(),
                ValidationError::PriceRange(_)
            ));
        }

        #[test]
        fn exact_price() {
            let with = |p: &str| ProductQuery {
                price: Some(p.to_string()),
                ..ProductQuery::default()
            };
            assert_eq!(with("1000").exact_price().unwrap(), 1000);
            assert_eq!(
                with("0").exact_price().unwrap_err(),
                ValidationError::NonPositivePrice
            );
            assert_eq!(
                with("abc").exact_price().unwrap_err(),
                ValidationError::NonPositivePrice
            );
            assert_eq!(
                ProductQuery::default().exact_price().unwrap_err(),
                ValidationError::NonPositivePrice
            );
        }
    }
}
