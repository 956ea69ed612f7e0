//! Thumbnail extraction from the rendered Wildberries product grid.

use scraper::{Html, Selector};
use tracing::warn;

const CARD_TAG: &str = "article";
const THUMBNAIL: &str = "img.j-thumbnail";

/// Returns the thumbnail `src` of every product card, in page order.
///
/// Cards without a thumbnail are skipped. Markup with no cards at all is
/// logged and yields no links.
#[must_use]
pub fn extract_image_links(html: &str) -> Vec<String> {
    if !html.contains(CARD_TAG) {
        warn!("product grid has no cards, images could not be loaded");
        return Vec::new();
    }

    let (Ok(card_selector), Ok(image_selector)) =
        (Selector::parse(CARD_TAG), Selector::parse(THUMBNAIL))
    else {
        return Vec::new();
    };

    let fragment = Html::parse_fragment(html);
    fragment
        .select(&card_selector)
        .filter_map(|card| {
            card.select(&image_selector)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(str::to_string)
        })
        .collect()
}
