//! # Market Registry
//!
//! Lookup table from [`Market`] to its adapter.
//!
//! The registry is assembled once at startup and read concurrently by every
//! request afterwards, so it needs no interior locking. Share it with
//! `Arc<MarketRegistry>`.

use crate::domain::value_objects::Market;
use crate::infrastructure::markets::traits::MarketAdapter;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of configured market adapters.
#[derive(Default)]
pub struct MarketRegistry {
    adapters: HashMap<Market, Arc<dyn MarketAdapter>>,
}

impl MarketRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under the market it reports.
    ///
    /// An adapter already registered for that market is replaced.
    pub fn register(&mut self, adapter: Arc<dyn MarketAdapter>) {
        self.adapters.insert(adapter.market(), adapter);
    }

    /// Builder-style [`register`](Self::register).
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with(mut self, adapter: Arc<dyn MarketAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Returns the adapter for `market`, if configured.
    #[must_use]
    pub fn get(&self, market: Market) -> Option<Arc<dyn MarketAdapter>> {
        self.adapters.get(&market).map(Arc::clone)
    }

    /// Configured markets in declaration order.
    #[must_use]
    pub fn markets(&self) -> Vec<Market> {
        Market::ALL
            .iter()
            .copied()
            .filter(|m| self.adapters.contains_key(m))
            .collect()
    }

    /// Returns the number of configured markets.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no market is configured.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for MarketRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketRegistry")
            .field("markets", &self.markets())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::infrastructure::markets::testing::StubAdapter;

    #[test]
    fn empty_registry() {
        let registry = MarketRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(Market::Wildberries).is_none());
        assert!(registry.markets().is_empty());
    }

    #[test]
    fn markets_follow_declaration_order() {
        let registry = MarketRegistry::new()
            .with(Arc::new(StubAdapter::new(Market::MegaMarket)))
            .with(Arc::new(StubAdapter::new(Market::Wildberries)));

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.markets(),
            vec![Market::Wildberries, Market::MegaMarket]
        );
        assert!(registry.get(Market::MegaMarket).is_some());
    }

    #[test]
    fn register_replaces_same_market() {
        let mut registry = MarketRegistry::new();
        registry.register(Arc::new(StubAdapter::new(Market::Wildberries)));
        registry.register(Arc::new(StubAdapter::new(Market::Wildberries)));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(Market::Wildberries).map(|a| a.market()),
            Some(Market::Wildberries)
        );
    }
}
