pub mod yahoo;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::ProviderError;
use crate::model::{Bar, BarInterval, LookbackPeriod};

/// Abstraction over a remote market-data source.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn MarketData`).
pub trait MarketData: Send + Sync {
    /// Human-readable provider name, used in log and error context.
    fn name(&self) -> &'static str;

    /// Fetch daily history for a ticker symbol.
    ///
    /// An unknown symbol or a symbol with no listed history resolves to an
    /// empty Vec; transport and decode failures are errors.
    fn fetch_daily(
        &self,
        symbol: &str,
        period: LookbackPeriod,
        interval: BarInterval,
    ) -> BoxFuture<'_, Result<Vec<Bar>, Report<ProviderError>>>;
}
