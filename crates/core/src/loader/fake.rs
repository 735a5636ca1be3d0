use crate::client::{ServiceError, StockService};
use crate::domain::content::{PostSummary, Role};
use crate::domain::records::{EpsRecord, FinancialRatioRecord, Page, PeRecord, RoaRoeRecord};
use crate::domain::setting::Setting;
use crate::domain::stock::{QIndexSortField, SortDir, Stock, StockQIndex};
use crate::time::window::DateWindow;
use anyhow::Result;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn not_found(path: String) -> anyhow::Error {
    ServiceError {
        status: reqwest::StatusCode::NOT_FOUND,
        path,
        body: "{\"error\":\"not found\"}".to_string(),
    }
    .into()
}

fn page<T: Clone>(all: &[T], page: i64, page_size: i64) -> Page<T> {
    let start = ((page - 1) * page_size).max(0) as usize;
    let data = all.iter().skip(start).take(page_size as usize).cloned().collect();
    Page::new(data, page, page_size, all.len() as i64)
}

/// In-memory `StockService` with call recording, failure switches and per-window gates.
#[derive(Default)]
pub struct FakeService {
    pub stocks: HashMap<String, Stock>,
    pub q_indices: Vec<StockQIndex>,
    pub eps: Vec<EpsRecord>,
    pub pe: Vec<PeRecord>,
    pub roa_roe: Vec<RoaRoeRecord>,
    pub ratios: Vec<FinancialRatioRecord>,
    pub posts: Vec<PostSummary>,
    pub settings: Vec<Setting>,
    pub fail_roa_roe: bool,
    fail_q_indices: AtomicBool,
    stock_calls: AtomicUsize,
    q_index_calls: Mutex<Vec<(i32, DateWindow)>>,
    gates: Mutex<HashMap<NaiveDate, Arc<Notify>>>,
    eps_calls: AtomicUsize,
    eps_gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeService {
    /// FPT (id 1) with weekly Q-index rows since 2018 and quarterly reports for 2019..=2022,
    /// returned newest first like the API does.
    pub fn with_fpt() -> Self {
        let mut svc = Self::default();
        svc.stocks.insert(
            "FPT".to_string(),
            Stock {
                id: 1,
                symbol: "FPT".to_string(),
                name: "FPT Corporation".to_string(),
                exchange: Some("HOSE".to_string()),
                industry: Some("Technology".to_string()),
                created_at: Utc.with_ymd_and_hms(2006, 12, 13, 0, 0, 0).unwrap(),
                updated_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            },
        );

        let mut date = d(2018, 1, 1);
        let mut id = 0;
        while date <= d(2023, 7, 15) {
            id += 1;
            svc.q_indices.push(StockQIndex {
                id,
                stock_id: 1,
                date,
                open: Some(80.0),
                low: Some(79.0),
                high: Some(82.0),
                close: Some(81.0),
                trend_q: Some(0.5),
                fq: None,
                qv1: Some(1000),
                band_down: Some(75.0),
                band_up: Some(85.0),
            });
            date += Duration::days(7);
        }

        let quarter_ends = [(3, 31), (6, 30), (9, 30), (12, 31)];
        let mut n = 0;
        for year in (2019..=2022).rev() {
            for &(m, day) in quarter_ends.iter().rev() {
                n += 1;
                let report_date = d(year, m, day);
                svc.eps.push(EpsRecord {
                    id: n,
                    symbol: "FPT".to_string(),
                    report_date,
                    eps: Some(1000.0 + n as f64),
                    industry_eps: Some(900.0),
                    eps_growth: None,
                    industry_eps_growth: Some(5.0),
                });
                svc.pe.push(PeRecord {
                    id: n,
                    symbol: "FPT".to_string(),
                    report_date,
                    pe: Some(18.0),
                    industry_pe: Some(15.0),
                });
                svc.roa_roe.push(RoaRoeRecord {
                    id: n,
                    symbol: "FPT".to_string(),
                    report_date,
                    roa: Some(10.0),
                    industry_roa: Some(7.0),
                    roe: Some(25.0),
                    industry_roe: None,
                });
                svc.ratios.push(FinancialRatioRecord {
                    id: n,
                    symbol: "FPT".to_string(),
                    report_date,
                    debt_to_equity: Some(0.9),
                    industry_debt_to_equity: Some(1.1),
                    debt_to_assets: Some(45.0),
                    industry_debt_to_assets: Some(50.0),
                });
            }
        }

        svc.posts.push(PostSummary {
            id: 1,
            title: "FPT Q2 earnings".to_string(),
            slug: "fpt-q2-earnings".to_string(),
            category_name: "Earnings".to_string(),
            author_name: "Desk".to_string(),
            author_role: Role::Editor,
            created_at: Utc.with_ymd_and_hms(2023, 7, 10, 2, 0, 0).unwrap(),
        });

        svc.settings.push(Setting {
            id: 1,
            key: "default_period".to_string(),
            value: "3y".to_string(),
            description: None,
            kind: "string".to_string(),
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        });
        svc
    }

    /// Blocks q-index fetches whose window starts at `start` until the returned handle is
    /// notified.
    pub fn gate(&self, start: NaiveDate) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(start, Arc::clone(&notify));
        notify
    }

    /// Blocks EPS fetches for `symbol` until the returned handle is notified.
    pub fn gate_eps(&self, symbol: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.eps_gates
            .lock()
            .unwrap()
            .insert(symbol.to_string(), Arc::clone(&notify));
        notify
    }

    pub fn eps_calls(&self) -> usize {
        self.eps_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_q_indices(&self, fail: bool) {
        self.fail_q_indices.store(fail, Ordering::SeqCst);
    }

    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    pub fn q_index_calls(&self) -> Vec<(i32, DateWindow)> {
        self.q_index_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StockService for FakeService {
    async fn fetch_stock_by_symbol(&self, symbol: &str) -> Result<Stock> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        self.stocks
            .get(symbol)
            .cloned()
            .ok_or_else(|| not_found(format!("/stocks/symbol/{symbol}")))
    }

    async fn fetch_q_indices_by_stock_id(
        &self,
        stock_id: i32,
        _sort_field: QIndexSortField,
        _sort_dir: SortDir,
        window: &DateWindow,
    ) -> Result<Vec<StockQIndex>> {
        self.q_index_calls.lock().unwrap().push((stock_id, *window));

        let gate = window
            .start
            .and_then(|s| self.gates.lock().unwrap().get(&s).cloned());
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_q_indices.load(Ordering::SeqCst) {
            anyhow::bail!("q-index backend unavailable");
        }
        Ok(self
            .q_indices
            .iter()
            .filter(|r| r.stock_id == stock_id && window.contains(r.date))
            .cloned()
            .collect())
    }

    async fn fetch_eps_by_symbol(&self, symbol: &str, p: i64, size: i64) -> Result<Page<EpsRecord>> {
        self.eps_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.eps_gates.lock().unwrap().get(symbol).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(page(&self.eps, p, size))
    }

    async fn fetch_pe_by_symbol(&self, _symbol: &str, p: i64, size: i64) -> Result<Page<PeRecord>> {
        Ok(page(&self.pe, p, size))
    }

    async fn fetch_roa_roe_by_symbol(
        &self,
        _symbol: &str,
        p: i64,
        size: i64,
    ) -> Result<Page<RoaRoeRecord>> {
        if self.fail_roa_roe {
            anyhow::bail!("roa-roe backend unavailable");
        }
        Ok(page(&self.roa_roe, p, size))
    }

    async fn fetch_financial_ratios_by_symbol(
        &self,
        _symbol: &str,
        p: i64,
        size: i64,
    ) -> Result<Page<FinancialRatioRecord>> {
        Ok(page(&self.ratios, p, size))
    }

    async fn fetch_posts_by_symbol(
        &self,
        symbol: &str,
        p: i64,
        size: i64,
    ) -> Result<Page<PostSummary>> {
        if !self.stocks.contains_key(symbol) {
            return Err(not_found(format!("/posts/stock/{symbol}")));
        }
        Ok(page(&self.posts, p, size))
    }

    async fn fetch_setting(&self, key: &str) -> Result<Setting> {
        self.settings
            .iter()
            .find(|s| s.key == key)
            .cloned()
            .ok_or_else(|| not_found(format!("/settings/{key}")))
    }
}
