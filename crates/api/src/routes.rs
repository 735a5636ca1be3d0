use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use stockdesk_core::domain::category::{Category, NewCategory};
use stockdesk_core::domain::content::PostSummary;
use stockdesk_core::domain::dates::parse_date;
use stockdesk_core::domain::records::{EpsRecord, FinancialRatioRecord, Page, PeRecord, RoaRoeRecord};
use stockdesk_core::domain::setting::Setting;
use stockdesk_core::domain::stock::{QIndexList, QIndexSortField, SortDir, Stock};
use stockdesk_core::storage::{self, records::RecordTable};

const DEFAULT_PAGE_SIZE: i64 = 20;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/stocks/symbol/:symbol", get(get_stock_by_symbol))
        .route("/stock-q-indices/stock/:stock_id", get(get_q_indices))
        .route("/eps-records/symbol/:symbol", get(get_records::<EpsRecord>))
        .route("/pe-records/symbol/:symbol", get(get_records::<PeRecord>))
        .route("/roa-roe-records/symbol/:symbol", get(get_records::<RoaRoeRecord>))
        .route(
            "/financial-ratio-records/symbol/:symbol",
            get(get_records::<FinancialRatioRecord>),
        )
        .route("/posts/stock/:symbol", get(get_posts_by_symbol))
        .route("/settings/:key", get(get_setting))
        .route("/categories", post(create_category))
        .route("/categories/:id", patch(update_category_parent))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn pool(state: &AppState) -> Result<&PgPool, ApiError> {
    state.pool.as_ref().ok_or(ApiError::Unavailable)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    page: Option<i64>,
    page_size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QIndexQuery {
    sort_field: Option<String>,
    sort_dir: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct QIndexFilter {
    sort_field: QIndexSortField,
    sort_dir: SortDir,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl QIndexQuery {
    fn parse(self) -> Result<QIndexFilter, ApiError> {
        let bad = |e: anyhow::Error| ApiError::BadRequest(format!("{e:#}"));
        let date = |s: Option<String>| {
            s.filter(|s| !s.trim().is_empty())
                .map(|s| parse_date(&s))
                .transpose()
        };

        let filter = QIndexFilter {
            sort_field: self
                .sort_field
                .map(|s| s.parse::<QIndexSortField>())
                .transpose()
                .map_err(bad)?
                .unwrap_or_default(),
            sort_dir: self
                .sort_dir
                .map(|s| s.parse::<SortDir>())
                .transpose()
                .map_err(bad)?
                .unwrap_or_default(),
            start: date(self.start_date).map_err(bad)?,
            end: date(self.end_date).map_err(bad)?,
        };

        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if start > end {
                return Err(ApiError::BadRequest(format!(
                    "startDate {start} is after endDate {end}"
                )));
            }
        }
        Ok(filter)
    }
}

async fn get_stock_by_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Stock>, ApiError> {
    let pool = pool(&state)?;
    let stock = storage::stocks::find_stock_by_symbol(pool, &symbol)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(stock))
}

async fn get_q_indices(
    State(state): State<AppState>,
    Path(stock_id): Path<i32>,
    Query(query): Query<QIndexQuery>,
) -> Result<Json<QIndexList>, ApiError> {
    let pool = pool(&state)?;
    let filter = query.parse()?;
    let data = storage::q_indices::find_by_stock_id(
        pool,
        stock_id,
        filter.sort_field,
        filter.sort_dir,
        filter.start,
        filter.end,
    )
    .await?;
    Ok(Json(QIndexList { data }))
}

async fn get_records<T>(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<T>>, ApiError>
where
    T: RecordTable + serde::Serialize + Send + 'static,
{
    let pool = pool(&state)?;
    let page = storage::records::find_by_symbol::<T>(
        pool,
        &symbol,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .await?;
    Ok(Json(page))
}

async fn get_posts_by_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<PostSummary>>, ApiError> {
    let pool = pool(&state)?;
    let page = storage::posts::list_for_symbol(
        pool,
        &symbol,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(page))
}

async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Setting>, ApiError> {
    let pool = pool(&state)?;
    let setting = storage::settings::find_by_key(pool, &key)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(setting))
}

async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let pool = pool(&state)?;
    if payload.name.trim().is_empty() || payload.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("name and slug must be non-empty".to_string()));
    }
    let created = storage::categories::create(pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReparentCategory {
    parent_id: Option<i32>,
}

async fn update_category_parent(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ReparentCategory>,
) -> Result<Json<Category>, ApiError> {
    let pool = pool(&state)?;
    let updated = storage::categories::set_parent(pool, id, payload.parent_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}
