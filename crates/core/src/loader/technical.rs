use crate::client::StockService;
use crate::domain::stock::{QIndexSortField, SortDir, Stock, StockQIndex};
use crate::loader::generation::{RequestGeneration, Ticket};
use crate::loader::messages::{self, DataKind, Locale};
use crate::loader::normalize_symbol;
use crate::time::window::{DateWindow, TechnicalPeriod};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalView {
    pub symbol: String,
    pub period: Option<TechnicalPeriod>,
    pub stock: Option<Stock>,
    pub window: Option<DateWindow>,
    pub rows: Vec<StockQIndex>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FetchKey {
    symbol: String,
    period: TechnicalPeriod,
    stock_id: i32,
}

/// A row fetch that has been issued but not yet applied. Later loads for the same key wait
/// on `done` instead of fetching again, and take over `owner` so the shared result is applied
/// on their behalf.
#[derive(Debug)]
struct InFlight {
    key: FetchKey,
    started_by: u64,
    owner: Ticket,
    done: watch::Receiver<bool>,
}

#[derive(Debug, Default)]
struct TechnicalState {
    stock: Option<Stock>,
    loaded: Option<FetchKey>,
    in_flight: Option<InFlight>,
    view: TechnicalView,
}

/// Technical tab: resolves `symbol -> stock id` (cached), then fetches Q-index rows for the
/// selected period.
///
/// Rows are fetched at most once per `(symbol, period, stock id)` while the last attempt
/// succeeded, including when loads for that key overlap. The state lock is never held across a fetch, so loads may overlap; only the
/// most recently issued load writes its result.
pub struct TechnicalLoader<S> {
    service: Arc<S>,
    locale: Locale,
    generation: RequestGeneration,
    state: Mutex<TechnicalState>,
}

impl<S: StockService> TechnicalLoader<S> {
    pub fn new(service: Arc<S>, locale: Locale) -> Self {
        Self {
            service,
            locale,
            generation: RequestGeneration::default(),
            state: Mutex::new(TechnicalState::default()),
        }
    }

    pub async fn view(&self) -> TechnicalView {
        self.state.lock().await.view.clone()
    }

    pub async fn load(&self, symbol: &str, period: TechnicalPeriod, today: NaiveDate) -> TechnicalView {
        let symbol = normalize_symbol(symbol);
        let ticket = self.generation.issue();

        let cached = {
            let st = self.state.lock().await;
            st.stock
                .clone()
                .filter(|s| s.symbol.eq_ignore_ascii_case(&symbol))
        };

        let stock = match cached {
            Some(stock) => stock,
            None => match self.service.fetch_stock_by_symbol(&symbol).await {
                Ok(stock) => stock,
                Err(err) => {
                    tracing::warn!(%symbol, error = %err, "stock lookup failed");
                    let message = messages::for_error(self.locale, DataKind::Stock, &symbol, &err);
                    return self
                        .apply(&ticket, |st| {
                            st.stock = None;
                            st.loaded = None;
                            st.view = TechnicalView {
                                symbol: symbol.clone(),
                                period: Some(period),
                                error: Some(message),
                                ..TechnicalView::default()
                            };
                        })
                        .await;
                }
            },
        };

        let key = FetchKey {
            symbol: symbol.clone(),
            period,
            stock_id: stock.id,
        };

        let done = {
            let mut st = self.state.lock().await;
            if !ticket.is_current() {
                return st.view.clone();
            }
            st.stock = Some(stock.clone());
            if st.loaded.as_ref() == Some(&key) && st.view.error.is_none() {
                tracing::debug!(%symbol, %period, stock_id = stock.id, "q-index rows already loaded");
                return st.view.clone();
            }

            // A dropped sender means the fetching task was cancelled; fetch again in that case.
            let joined = st
                .in_flight
                .as_mut()
                .filter(|f| f.key == key && f.done.has_changed().is_ok())
                .map(|f| {
                    f.owner = ticket.clone();
                    f.done.clone()
                });
            if let Some(mut waiting) = joined {
                drop(st);
                tracing::debug!(%symbol, %period, stock_id = stock.id, "joining in-flight q-index fetch");
                let _ = waiting.wait_for(|finished| *finished).await;
                return self.view().await;
            }

            let (done, rx) = watch::channel(false);
            st.in_flight = Some(InFlight {
                key: key.clone(),
                started_by: ticket.id(),
                owner: ticket.clone(),
                done: rx,
            });
            done
        };

        let fetched = match DateWindow::for_technical(period, today) {
            Ok(window) => self
                .service
                .fetch_q_indices_by_stock_id(stock.id, QIndexSortField::Date, SortDir::Asc, &window)
                .await
                .map(|rows| (window, rows)),
            Err(err) => Err(err),
        };

        if let Err(err) = &fetched {
            tracing::warn!(%symbol, %period, stock_id = stock.id, error = %err, "q-index fetch failed");
        }

        let view = {
            let mut guard = self.state.lock().await;
            let st = &mut *guard;
            let ours = st
                .in_flight
                .as_ref()
                .is_some_and(|f| f.started_by == ticket.id());
            let current = if ours {
                st.in_flight.take().is_some_and(|f| f.owner.is_current())
            } else {
                ticket.is_current()
            };

            if current {
                st.view = match fetched {
                    Ok((window, rows)) => {
                        tracing::debug!(%symbol, %period, rows = rows.len(), "q-index rows loaded");
                        st.loaded = Some(key);
                        TechnicalView {
                            symbol,
                            period: Some(period),
                            stock: Some(stock),
                            window: Some(window),
                            rows,
                            error: None,
                        }
                    }
                    Err(err) => {
                        st.loaded = None;
                        TechnicalView {
                            error: Some(messages::for_error(self.locale, DataKind::QIndices, &symbol, &err)),
                            symbol,
                            period: Some(period),
                            stock: Some(stock),
                            window: None,
                            rows: Vec::new(),
                        }
                    }
                };
            } else {
                tracing::debug!(ticket = ticket.id(), "discarding stale technical response");
            }
            st.view.clone()
        };
        done.send_replace(true);
        view
    }

    async fn apply(&self, ticket: &Ticket, update: impl FnOnce(&mut TechnicalState)) -> TechnicalView {
        let mut st = self.state.lock().await;
        if ticket.is_current() {
            update(&mut st);
        } else {
            tracing::debug!(ticket = ticket.id(), "discarding stale technical response");
        }
        st.view.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fake::{d, FakeService};

    const TODAY: (i32, u32, u32) = (2023, 7, 15);

    fn today() -> NaiveDate {
        d(TODAY.0, TODAY.1, TODAY.2)
    }

    #[tokio::test]
    async fn resolves_stock_then_fetches_window() {
        let svc = Arc::new(FakeService::with_fpt());
        let loader = TechnicalLoader::new(svc.clone(), Locale::En);

        let view = loader.load("fpt", TechnicalPeriod::ThreeMonths, today()).await;

        assert_eq!(view.error, None);
        assert_eq!(view.stock.as_ref().map(|s| s.id), Some(1));
        let window = view.window.unwrap();
        assert_eq!(window.start, Some(d(2023, 4, 15)));
        assert_eq!(window.end, today());
        assert!(!view.rows.is_empty());
        assert!(view.rows.iter().all(|r| window.contains(r.date)));
        assert_eq!(svc.q_index_calls(), vec![(1, window)]);
    }

    #[tokio::test]
    async fn one_fetch_per_distinct_key_and_stock_is_cached() {
        let svc = Arc::new(FakeService::with_fpt());
        let loader = TechnicalLoader::new(svc.clone(), Locale::En);

        loader.load("FPT", TechnicalPeriod::SixMonths, today()).await;
        loader.load("FPT", TechnicalPeriod::SixMonths, today()).await;
        assert_eq!(svc.q_index_calls().len(), 1);

        loader.load("FPT", TechnicalPeriod::OneYear, today()).await;
        assert_eq!(svc.q_index_calls().len(), 2);
        assert_eq!(svc.stock_calls(), 1);
    }

    #[tokio::test]
    async fn overlapping_loads_for_one_key_share_a_fetch() {
        let svc = Arc::new(FakeService::with_fpt());
        let gate = svc.gate(d(2023, 4, 15));
        let loader = Arc::new(TechnicalLoader::new(svc.clone(), Locale::En));

        let first = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move { loader.load("FPT", TechnicalPeriod::ThreeMonths, today()).await })
        };
        while svc.q_index_calls().is_empty() {
            tokio::task::yield_now().await;
        }
        let second = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move { loader.load("fpt", TechnicalPeriod::ThreeMonths, today()).await })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        gate.notify_one();
        let first = first.await.unwrap();
        let second = second.await.unwrap();

        assert_eq!(svc.q_index_calls().len(), 1);
        assert_eq!(first.error, None);
        assert!(!first.rows.is_empty());
        assert_eq!(first, second);
        assert_eq!(loader.view().await, second);
    }

    #[tokio::test]
    async fn failed_stock_lookup_never_fetches_rows_and_clears_previous() {
        let svc = Arc::new(FakeService::with_fpt());
        let loader = TechnicalLoader::new(svc.clone(), Locale::En);

        let ok = loader.load("FPT", TechnicalPeriod::OneYear, today()).await;
        assert!(!ok.rows.is_empty());

        let view = loader.load("NOPE", TechnicalPeriod::OneYear, today()).await;
        assert_eq!(view.error.as_deref(), Some("Stock NOPE was not found."));
        assert!(view.rows.is_empty());
        assert!(view.stock.is_none());
        assert_eq!(svc.q_index_calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_row_fetch_clears_rows_and_retries_next_time() {
        let svc = Arc::new(FakeService::with_fpt());
        let loader = TechnicalLoader::new(svc.clone(), Locale::Vi);

        loader.load("FPT", TechnicalPeriod::FiveYears, today()).await;
        svc.set_fail_q_indices(true);
        let view = loader.load("FPT", TechnicalPeriod::OneYear, today()).await;
        assert!(view.rows.is_empty());
        assert_eq!(
            view.error.as_deref(),
            Some("Không thể tải chỉ báo kỹ thuật. Vui lòng tải lại trang.")
        );

        svc.set_fail_q_indices(false);
        let view = loader.load("FPT", TechnicalPeriod::OneYear, today()).await;
        assert_eq!(view.error, None);
        assert!(!view.rows.is_empty());
        assert_eq!(svc.q_index_calls().len(), 3);
    }

    #[tokio::test]
    async fn late_response_from_older_request_is_discarded() {
        let svc = Arc::new(FakeService::with_fpt());
        let slow_start = d(2023, 4, 15);
        let gate = svc.gate(slow_start);
        let loader = Arc::new(TechnicalLoader::new(svc.clone(), Locale::En));

        let slow = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move { loader.load("FPT", TechnicalPeriod::ThreeMonths, today()).await })
        };
        while svc.q_index_calls().is_empty() {
            tokio::task::yield_now().await;
        }

        let fresh = loader.load("FPT", TechnicalPeriod::OneYear, today()).await;
        assert_eq!(fresh.period, Some(TechnicalPeriod::OneYear));

        gate.notify_one();
        let after_slow = slow.await.unwrap();

        assert_eq!(after_slow, fresh);
        assert_eq!(loader.view().await.period, Some(TechnicalPeriod::OneYear));
        assert_eq!(svc.q_index_calls().len(), 2);
    }
}
