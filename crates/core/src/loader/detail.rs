use crate::client::StockService;
use crate::domain::content::PostSummary;
use crate::domain::records::Page;
use crate::domain::setting::Setting;
use crate::domain::stock::Stock;
use crate::loader::messages::{self, DataKind, Locale};
use crate::loader::normalize_symbol;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewView {
    pub symbol: String,
    pub stock: Option<Stock>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsView {
    pub symbol: String,
    pub posts: Option<Page<PostSummary>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingView {
    pub key: String,
    pub setting: Option<Setting>,
    pub error: Option<String>,
}

pub async fn load_overview<S: StockService + ?Sized>(
    service: &S,
    symbol: &str,
    locale: Locale,
) -> OverviewView {
    let symbol = normalize_symbol(symbol);
    match service.fetch_stock_by_symbol(&symbol).await {
        Ok(stock) => OverviewView {
            symbol,
            stock: Some(stock),
            error: None,
        },
        Err(err) => {
            tracing::warn!(%symbol, error = %err, "stock lookup failed");
            OverviewView {
                error: Some(messages::for_error(locale, DataKind::Stock, &symbol, &err)),
                symbol,
                stock: None,
            }
        }
    }
}

pub async fn load_news<S: StockService + ?Sized>(
    service: &S,
    symbol: &str,
    page: i64,
    page_size: i64,
    locale: Locale,
) -> NewsView {
    let symbol = normalize_symbol(symbol);
    match service.fetch_posts_by_symbol(&symbol, page, page_size).await {
        Ok(posts) => NewsView {
            symbol,
            posts: Some(posts),
            error: None,
        },
        Err(err) => {
            tracing::warn!(%symbol, page, error = %err, "news fetch failed");
            NewsView {
                error: Some(messages::for_error(locale, DataKind::Posts, &symbol, &err)),
                symbol,
                posts: None,
            }
        }
    }
}

pub async fn load_setting<S: StockService + ?Sized>(
    service: &S,
    key: &str,
    locale: Locale,
) -> SettingView {
    let key = key.trim().to_string();
    match service.fetch_setting(&key).await {
        Ok(setting) => SettingView {
            key,
            setting: Some(setting),
            error: None,
        },
        Err(err) => {
            tracing::warn!(%key, error = %err, "setting lookup failed");
            SettingView {
                key,
                setting: None,
                error: Some(messages::load_failed(locale, DataKind::Setting)),
            }
        }
    }
}
