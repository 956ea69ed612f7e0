//! Wildberries URL construction.

use crate::domain::entities::ProductRequest;
use crate::domain::value_objects::{PriceRange, SortMode};
use url::form_urlencoded::byte_serialize;

/// Default search API endpoint.
pub const DEFAULT_SEARCH_API: &str = "https://search.wb.ru/exactmatch/ru/common/v9/search";
/// Default human-facing catalog search page.
pub const DEFAULT_CATALOG: &str = "https://www.wildberries.ru/catalog/0/search.aspx";
/// Default prefix of product detail pages.
pub const DEFAULT_PRODUCT_BASE: &str = "https://www.wildberries.ru/catalog";

/// Fixed region and app parameters the search API expects (Moscow).
const GEO_PARAMS: &str = "appType=1&curr=rub&dest=-1257786&hide_dtype=10&lang=ru";

/// Builds the URLs the Wildberries adapter needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildberriesUrls {
    search_api: String,
    catalog: String,
    product_base: String,
}

impl Default for WildberriesUrls {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_API, DEFAULT_CATALOG, DEFAULT_PRODUCT_BASE)
    }
}

impl WildberriesUrls {
    /// Creates a URL builder over custom endpoints.
    #[must_use]
    pub fn new(
        search_api: impl Into<String>,
        catalog: impl Into<String>,
        product_base: impl Into<String>,
    ) -> Self {
        Self {
            search_api: search_api.into(),
            catalog: catalog.into(),
            product_base: product_base.into(),
        }
    }

    /// Machine-facing search URL returning JSON.
    #[must_use]
    pub fn search_url(
        &self,
        request: &ProductRequest,
        range: Option<PriceRange>,
        sort: SortMode,
    ) -> String {
        format!(
            "{}?ab_testing=false&{}&{}",
            self.search_api,
            GEO_PARAMS,
            search_query(request, range, sort)
        )
    }

    /// Human-facing catalog URL reproducing the query.
    #[must_use]
    pub fn catalog_url(
        &self,
        request: &ProductRequest,
        range: Option<PriceRange>,
        sort: SortMode,
    ) -> String {
        format!("{}?{}", self.catalog, catalog_query(request, range, sort))
    }

    /// Product detail page.
    #[must_use]
    pub fn product_url(&self, id: u64) -> String {
        format!("{}/{}/detail.aspx", self.product_base.trim_end_matches('/'), id)
    }
}

/// Price filter in kopecks, e.g. `100000;500000`.
fn price_param(range: PriceRange) -> String {
    format!("{}00;{}00", range.down(), range.up())
}

fn search_query(request: &ProductRequest, range: Option<PriceRange>, sort: SortMode) -> String {
    let mut query = format!("page={}", request.sample());
    if let Some(range) = range {
        query.push_str(&format!("&priceU={}", price_param(range)));
    }
    let escaped: String = byte_serialize(request.query().as_bytes()).collect();
    query.push_str(&format!(
        "&query={escaped}&resultset=catalog&sort={sort}&spp=30&suppressSpellcheck=false"
    ));
    query
}

fn catalog_query(request: &ProductRequest, range: Option<PriceRange>, sort: SortMode) -> String {
    let mut query = format!("page={}&sort={}", request.sample(), sort);
    if let Some(range) = range {
        query.push_str(&format!("&priceU={}", price_param(range)));
    }
    // Words are joined raw, not percent-encoded.
    query.push_str("&search=");
    query.push_str(&request.query().replace(' ', "+"));
    query
}
