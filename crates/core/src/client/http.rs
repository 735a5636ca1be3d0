use crate::client::error::ServiceError;
use crate::client::StockService;
use crate::config::Settings;
use crate::domain::content::PostSummary;
use crate::domain::records::{EpsRecord, FinancialRatioRecord, Page, PeRecord, RoaRoeRecord};
use crate::domain::setting::Setting;
use crate::domain::stock::{QIndexList, QIndexSortField, SortDir, Stock, StockQIndex};
use crate::time::window::DateWindow;
use anyhow::{Context, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
// Interactive callers surface failures inline and let the user reload.
const DEFAULT_RETRIES: u32 = 1;

#[derive(Debug, Clone)]
pub struct HttpStockService {
    http: reqwest::Client,
    base_url: Url,
    retries: u32,
}

impl HttpStockService {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_api_base_url()?;

        let timeout_secs = std::env::var("STOCKDESK_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("STOCKDESK_API_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        Self::new(base_url, Duration::from_secs(timeout_secs), retries)
    }

    pub fn new(base_url: &str, timeout: Duration, retries: u32) -> Result<Self> {
        anyhow::ensure!(retries >= 1, "STOCKDESK_API_RETRIES must be >= 1");

        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid stockdesk API base url: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "stockdesk API base url cannot carry paths: {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build stockdesk API http client")?;

        Ok(Self {
            http,
            base_url,
            retries,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("base url cannot carry paths: {}", self.base_url))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url, query: &[(&str, String)]) -> Result<T> {
        let res = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .with_context(|| format!("stockdesk API request failed: {}", url.path()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read stockdesk API response")?;

        if !status.is_success() {
            return Err(ServiceError {
                status,
                path: url.path().to_string(),
                body: text,
            }
            .into());
        }

        serde_json::from_str::<T>(&text)
            .with_context(|| format!("unexpected response shape from {}: {text}", url.path()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(segments)?;
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.get_once(&url, query).await {
                Ok(v) => return Ok(v),
                Err(err) => {
                    let retryable = err
                        .downcast_ref::<ServiceError>()
                        .map_or(true, ServiceError::is_retryable);
                    if !retryable || attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_millis(250 << (attempt - 1).min(6));
                    tracing::warn!(
                        attempt,
                        ?backoff,
                        path = url.path(),
                        error = %err,
                        "stockdesk API fetch failed; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        resource: &str,
        symbol: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<T>> {
        self.get_json(
            &[resource, "symbol", symbol],
            &[("page", page.to_string()), ("pageSize", page_size.to_string())],
        )
        .await
    }
}

#[async_trait::async_trait]
impl StockService for HttpStockService {
    async fn fetch_stock_by_symbol(&self, symbol: &str) -> Result<Stock> {
        self.get_json(&["stocks", "symbol", symbol], &[]).await
    }

    async fn fetch_q_indices_by_stock_id(
        &self,
        stock_id: i32,
        sort_field: QIndexSortField,
        sort_dir: SortDir,
        window: &DateWindow,
    ) -> Result<Vec<StockQIndex>> {
        let mut query = vec![
            ("sortField", sort_field.as_str().to_string()),
            ("sortDir", sort_dir.as_str().to_string()),
        ];
        query.extend(window.query_params());

        let id = stock_id.to_string();
        let list: QIndexList = self
            .get_json(&["stock-q-indices", "stock", id.as_str()], &query)
            .await?;
        Ok(list.data)
    }

    async fn fetch_eps_by_symbol(
        &self,
        symbol: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<EpsRecord>> {
        self.get_page("eps-records", symbol, page, page_size).await
    }

    async fn fetch_pe_by_symbol(
        &self,
        symbol: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<PeRecord>> {
        self.get_page("pe-records", symbol, page, page_size).await
    }

    async fn fetch_roa_roe_by_symbol(
        &self,
        symbol: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<RoaRoeRecord>> {
        self.get_page("roa-roe-records", symbol, page, page_size).await
    }

    async fn fetch_financial_ratios_by_symbol(
        &self,
        symbol: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<FinancialRatioRecord>> {
        self.get_page("financial-ratio-records", symbol, page, page_size)
            .await
    }

    async fn fetch_posts_by_symbol(
        &self,
        symbol: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<PostSummary>> {
        self.get_json(
            &["posts", "stock", symbol],
            &[("page", page.to_string()), ("pageSize", page_size.to_string())],
        )
        .await
    }

    async fn fetch_setting(&self, key: &str) -> Result<Setting> {
        self.get_json(&["settings", key], &[]).await
    }
}
