use crate::aggregate::{aggregate, ViewMode};
use crate::chart::{build_chart, ChartData, ChartSeries};
use crate::client::StockService;
use crate::domain::records::{
    EpsRecord, FinancialRatioRecord, Page, PeRecord, ReportDated, RoaRoeRecord,
};
use crate::loader::generation::RequestGeneration;
use crate::loader::messages::{self, DataKind, Locale};
use crate::loader::normalize_symbol;
use crate::time::window::FundamentalPeriod;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_RECORD_PAGE_SIZE: i64 = 200;

/// One chart region of the Financial tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section<T> {
    pub records: Vec<T>,
    pub chart: ChartData,
    pub error: Option<String>,
}

impl<T> Section<T> {
    fn failed(message: String) -> Self {
        Self {
            records: Vec::new(),
            chart: ChartData::default(),
            error: Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialView {
    pub symbol: String,
    pub period: FundamentalPeriod,
    pub view: ViewMode,
    pub eps: Section<EpsRecord>,
    pub pe: Section<PeRecord>,
    pub roa_roe: Section<RoaRoeRecord>,
    pub financial_ratios: Section<FinancialRatioRecord>,
}

pub struct FinancialLoader<S> {
    service: Arc<S>,
    locale: Locale,
    page_size: i64,
    generation: RequestGeneration,
    latest: Mutex<Option<FinancialView>>,
}

impl<S: StockService> FinancialLoader<S> {
    pub fn new(service: Arc<S>, locale: Locale) -> Self {
        Self {
            service,
            locale,
            page_size: DEFAULT_RECORD_PAGE_SIZE,
            generation: RequestGeneration::default(),
            latest: Mutex::new(None),
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetches the four record families concurrently and aggregates each independently.
    ///
    /// Returns the latest applied view: if a newer load was issued while this one was in
    /// flight, this result is dropped and the newer view (if it has landed) is returned.
    pub async fn load(
        &self,
        symbol: &str,
        period: FundamentalPeriod,
        view: ViewMode,
        today: NaiveDate,
    ) -> Option<FinancialView> {
        let symbol = normalize_symbol(symbol);
        let ticket = self.generation.issue();
        let svc = &self.service;
        let size = self.page_size;

        let (eps, pe, roa_roe, ratios) = tokio::join!(
            svc.fetch_eps_by_symbol(&symbol, 1, size),
            svc.fetch_pe_by_symbol(&symbol, 1, size),
            svc.fetch_roa_roe_by_symbol(&symbol, 1, size),
            svc.fetch_financial_ratios_by_symbol(&symbol, 1, size),
        );

        let result = FinancialView {
            eps: self.section(eps, DataKind::Eps, &symbol, period, view, today),
            pe: self.section(pe, DataKind::Pe, &symbol, period, view, today),
            roa_roe: self.section(roa_roe, DataKind::RoaRoe, &symbol, period, view, today),
            financial_ratios: self.section(
                ratios,
                DataKind::FinancialRatios,
                &symbol,
                period,
                view,
                today,
            ),
            symbol,
            period,
            view,
        };

        let mut latest = self.latest.lock().await;
        if ticket.is_current() {
            *latest = Some(result);
        } else {
            tracing::debug!(ticket = ticket.id(), "discarding stale financial response");
        }
        latest.clone()
    }

    fn section<T: ChartSeries>(
        &self,
        fetched: anyhow::Result<Page<T>>,
        kind: DataKind,
        symbol: &str,
        period: FundamentalPeriod,
        view: ViewMode,
        today: NaiveDate,
    ) -> Section<T> {
        let page = match fetched {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(%symbol, ?kind, error = %err, "record fetch failed");
                return Section::failed(messages::for_error(self.locale, kind, symbol, &err));
            }
        };

        if page.total > page.data.len() as i64 {
            tracing::debug!(
                %symbol,
                ?kind,
                total = page.total,
                fetched = page.data.len(),
                "record history truncated to first page"
            );
        }

        let mut records = page.data;
        records.sort_by_key(|r| r.report_date());

        match aggregate(records, period, view, today) {
            Ok(records) => Section {
                chart: build_chart(&records, view),
                records,
                error: None,
            },
            Err(err) => {
                tracing::warn!(%symbol, ?kind, error = %err, "record aggregation failed");
                Section::failed(messages::load_failed(self.locale, kind))
            }
        }
    }
}
