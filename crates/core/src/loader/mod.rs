//! Fetch orchestration for the stock detail tabs.
//!
//! Loaders never fail: every error becomes an inline, localized message on the view they
//! return, with the affected data cleared.

pub mod detail;
pub mod financial;
pub mod generation;
pub mod messages;
pub mod technical;

#[cfg(test)]
pub(crate) mod fake;

pub use detail::{load_news, load_overview, load_setting, NewsView, OverviewView, SettingView};
pub use financial::{FinancialLoader, FinancialView, Section};
pub use technical::{TechnicalLoader, TechnicalView};

pub(crate) fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}
