//! # Product DTOs
//!
//! Wire shapes shared by the synchronous responses, the asynchronous
//! messages and the market listing endpoint.

use crate::domain::entities::ProductSample;
use crate::domain::value_objects::Market;
use crate::infrastructure::messaging::MessageHeaders;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

/// Aggregated result keyed by market.
///
/// Serializes as `{"samples": {"<market>": sample, ...}}` with keys in the
/// order the samples were aggregated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductResponse {
    samples: Vec<ProductSample>,
}

impl ProductResponse {
    /// Wraps an aggregated result.
    #[must_use]
    pub fn new(samples: Vec<ProductSample>) -> Self {
        Self { samples }
    }

    /// Returns the samples in aggregation order.
    #[inline]
    #[must_use]
    pub fn samples(&self) -> &[ProductSample] {
        &self.samples
    }

    /// Serializes the response to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; the shapes involved never produce one in
    /// practice.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn sample_key(sample: &ProductSample) -> String {
    sample.market().map_or_else(
        || sample.market_name().to_lowercase(),
        |m| m.wire_name().to_string(),
    )
}

struct KeyedSamples<'a>(&'a [ProductSample]);

impl Serialize for KeyedSamples<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for sample in self.0 {
            map.serialize_entry(&sample_key(sample), sample)?;
        }
        map.end()
    }
}

impl Serialize for ProductResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProductResponse", 1)?;
        state.serialize_field("samples", &KeyedSamples(&self.samples))?;
        state.end()
    }
}

impl From<Vec<ProductSample>> for ProductResponse {
    fn from(samples: Vec<ProductSample>) -> Self {
        Self::new(samples)
    }
}

/// One entry of the supported markets listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketView {
    /// Display name.
    pub name: String,
    /// Emoji shown next to the name.
    pub emoji: String,
}

impl From<Market> for MarketView {
    fn from(market: Market) -> Self {
        Self {
            name: market.display_name().to_string(),
            emoji: market.designation().to_string(),
        }
    }
}

/// Body of `GET /api/markets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedMarkets {
    /// Markets in declaration order.
    pub markets: Vec<MarketView>,
}

impl SupportedMarkets {
    /// Lists every market the service knows.
    #[must_use]
    pub fn all() -> Self {
        Self {
            markets: Market::ALL.iter().copied().map(MarketView::from).collect(),
        }
    }
}

/// Body of `POST /products/filter/price/best-price/async`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AsyncRequestBody {
    /// Correlation headers copied onto the published message.
    #[serde(default, alias = "extraHeaders")]
    pub headers: MessageHeaders,
}
