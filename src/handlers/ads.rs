use axum::extract::{Json, Path, Query, State};
use axum::Extension;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::auth::authorize_owner;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::store::ads::Ad;
use crate::store::posts::PageWindow;
use crate::store::Id;

#[derive(Debug, Deserialize)]
pub struct ListAdsQuery {
    /// 0/1: restrict to ads whose validity window covers today.
    pub active: Option<u8>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// GET /api/ads
pub async fn get_all_ads(
    State(state): State<AppState>,
    Query(query): Query<ListAdsQuery>,
) -> Result<ApiResponse, ApiError> {
    let active_on = match query.active {
        Some(flag) if flag != 0 => Some(Utc::now().date_naive()),
        _ => None,
    };
    let window = PageWindow::from_query(query.limit, query.page);

    let count = state.store.count_ads(active_on).await?;
    let ads = state.store.list_ads(active_on, window).await?;
    let ads = state.store.enrich_ads(ads).await?;

    Ok(ApiResponse::ok()
        .message("All advertisements were successfully retrieved.")
        .data(json!({ "ads": ads, "count": count })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAdInput {
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub price: i64,
    pub duration: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// POST /api/ads
///
/// A conflict on (title, caller) means no insert happens.
pub async fn add_ad(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(input): Json<AddAdInput>,
) -> Result<ApiResponse, ApiError> {
    if input.title.trim().is_empty() || input.body.trim().is_empty() {
        return Err(ApiError::invalid_data("Title and body are required."));
    }
    if input.end_date < input.start_date {
        return Err(ApiError::invalid_data(
            "End date must not precede start date.",
        ));
    }

    if state
        .store
        .ad_by_title_for_user(input.title.trim(), &caller.id)
        .await?
        .is_some()
    {
        return Err(ApiError::already_exists(
            "An advertisement with this title already exists for this user.",
        ));
    }

    let ad = Ad {
        id: Id::new(),
        user_id: caller.id,
        title: input.title.trim().to_string(),
        body: input.body,
        image: input.image,
        price: input.price,
        duration: input.duration,
        start_date: input.start_date,
        end_date: input.end_date,
        created_at: Utc::now(),
    };
    state.store.insert_ad(&ad).await?;

    Ok(ApiResponse::ok()
        .message("Advertisement added successfully.")
        .data(json!({ "ad": ad })))
}

#[derive(Debug, Deserialize)]
pub struct PaymentInitInput {
    pub price: i64,
    pub currency: String,
}

/// POST /api/ads/paymentInit
pub async fn payment_init(
    State(state): State<AppState>,
    Extension(_caller): Extension<AuthUser>,
    Json(input): Json<PaymentInitInput>,
) -> Result<ApiResponse, ApiError> {
    if input.price <= 0 || input.currency.trim().is_empty() {
        return Err(ApiError::invalid_data(
            "A positive price and a currency are required.",
        ));
    }

    let gateway = state
        .payments
        .as_ref()
        .ok_or_else(|| ApiError::service_error("Payment provider is not configured."))?;

    let intent = gateway
        .create_payment_intent(input.price, input.currency.trim())
        .await?;

    Ok(ApiResponse::ok()
        .message("Payment confirmed and ready for processing")
        .data(json!({ "clientSecret": intent.client_secret })))
}

/// DELETE /api/ads/:id
pub async fn delete_ad(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let ad = state
        .store
        .ad_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Advertisement not found."))?;

    authorize_owner(&caller, &ad.user_id)?;

    state.store.delete_ad(&ad.id).await?;

    Ok(ApiResponse::ok().message("Advertisement deleted successfully."))
}
