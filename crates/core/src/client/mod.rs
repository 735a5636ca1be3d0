//! Typed client for the stockdesk REST surface.

pub mod error;
pub mod http;

use crate::domain::content::PostSummary;
use crate::domain::records::{EpsRecord, FinancialRatioRecord, Page, PeRecord, RoaRoeRecord};
use crate::domain::setting::Setting;
use crate::domain::stock::{QIndexSortField, SortDir, Stock, StockQIndex};
use crate::time::window::DateWindow;
use anyhow::Result;

pub use error::ServiceError;
pub use http::HttpStockService;

/// Every query shape the presentation layer issues. Implemented over HTTP in production and by
/// in-memory fakes in tests.
#[async_trait::async_trait]
pub trait StockService: Send + Sync {
    async fn fetch_stock_by_symbol(&self, symbol: &str) -> Result<Stock>;

    async fn fetch_q_indices_by_stock_id(
        &self,
        stock_id: i32,
        sort_field: QIndexSortField,
        sort_dir: SortDir,
        window: &DateWindow,
    ) -> Result<Vec<StockQIndex>>;

    async fn fetch_eps_by_symbol(&self, symbol: &str, page: i64, page_size: i64)
        -> Result<Page<EpsRecord>>;

    async fn fetch_pe_by_symbol(&self, symbol: &str, page: i64, page_size: i64)
        -> Result<Page<PeRecord>>;

    async fn fetch_roa_roe_by_symbol(
        &self,
        symbol: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<RoaRoeRecord>>;

    async fn fetch_financial_ratios_by_symbol(
        &self,
        symbol: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<FinancialRatioRecord>>;

    async fn fetch_posts_by_symbol(
        &self,
        symbol: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<PostSummary>>;

    async fn fetch_setting(&self, key: &str) -> Result<Setting>;
}
