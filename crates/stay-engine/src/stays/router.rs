use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::availability::{AvailabilityResolver, AvailabilityWindow, AvailableDate};
use super::domain::{
    parse_date, parse_optional_date, FeeSchedule, RatePeriod, RatePeriodRecord, ReservedStay,
    ReservedStayRecord, StayError,
};
use super::pricing::{PriceMarkupPolicy, PriceQuote, StayPriceCalculator, StayRequest};
use crate::config::PricingConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    #[serde(default)]
    pub reserved_stays: Vec<ReservedStayRecord>,
    #[serde(default)]
    pub rate_periods: Vec<RatePeriodRecord>,
    #[serde(default)]
    pub window_start: Option<String>,
    #[serde(default)]
    pub window_end: Option<String>,
    #[serde(default)]
    pub today: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub available_dates: Vec<AvailableDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub rate_periods: Vec<RatePeriodRecord>,
    #[serde(default)]
    pub fees: FeeSchedule,
    pub check_in: String,
    pub check_out: String,
    pub guests: u32,
    #[serde(default)]
    pub free_guests: Option<u32>,
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    /// Guest-facing figures after markup.
    pub quote: PriceQuote,
    /// Calculator output before markup.
    pub listed_quote: PriceQuote,
    pub markup_percent: Decimal,
    pub priced: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesRequest {
    #[serde(default)]
    pub rate_periods: Vec<RatePeriodRecord>,
}

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    pub rate_periods: Vec<RatePeriod>,
    pub markup_percent: Decimal,
}

/// Router exposing availability, quoting and rate endpoints to the storefront.
pub fn storefront_router(pricing: PricingConfig) -> Router {
    Router::new()
        .route("/api/v1/stays/availability", post(availability_handler))
        .route("/api/v1/stays/quote", post(quote_handler))
        .route("/api/v1/stays/rates", post(rates_handler))
        .with_state(Arc::new(pricing))
}

pub(crate) async fn availability_handler(
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let stays = convert_all::<ReservedStay, _>(request.reserved_stays)?;
    let rate_periods = convert_all::<RatePeriod, _>(request.rate_periods)?;
    let window_start = parse_optional_date("window_start", request.window_start.as_deref())?;
    let window_end = parse_optional_date("window_end", request.window_end.as_deref())?;
    let today = parse_optional_date("today", request.today.as_deref())?
        .unwrap_or_else(|| Local::now().date_naive());

    let window = AvailabilityWindow::resolve(window_start, window_end, today, !stays.is_empty())?;
    let available_dates =
        AvailabilityResolver::default().available_dates(&stays, &rate_periods, window);

    Ok(Json(AvailabilityResponse {
        window_start: window.start,
        window_end: window.end,
        available_dates,
    }))
}

pub(crate) async fn quote_handler(
    State(pricing): State<Arc<PricingConfig>>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let rate_periods = convert_all::<RatePeriod, _>(request.rate_periods)?;
    let stay = StayRequest::new(
        parse_date("check_in", &request.check_in)?,
        parse_date("check_out", &request.check_out)?,
        request.guests,
    )
    .with_free_guests(request.free_guests.unwrap_or(pricing.free_guests));

    let calculator = if request.strict {
        StayPriceCalculator::strict()
    } else {
        StayPriceCalculator::default()
    };
    let listed_quote = calculator.quote(&rate_periods, &request.fees, &stay)?;
    let quote =
        PriceMarkupPolicy::new(pricing.markup_percent).apply_to_quote(&listed_quote)?;

    Ok(Json(QuoteResponse {
        priced: listed_quote.is_priced(),
        quote,
        listed_quote,
        markup_percent: pricing.markup_percent,
    }))
}

pub(crate) async fn rates_handler(
    State(pricing): State<Arc<PricingConfig>>,
    Json(request): Json<RatesRequest>,
) -> Result<Json<RatesResponse>, AppError> {
    let rate_periods = convert_all::<RatePeriod, _>(request.rate_periods)?;
    let policy = PriceMarkupPolicy::new(pricing.markup_percent);

    Ok(Json(RatesResponse {
        rate_periods: policy.apply_to_rates(&rate_periods)?,
        markup_percent: pricing.markup_percent,
    }))
}

fn convert_all<T, R>(records: Vec<R>) -> Result<Vec<T>, StayError>
where
    T: TryFrom<R, Error = StayError>,
{
    records.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router(markup_percent: Decimal) -> Router {
        storefront_router(PricingConfig {
            markup_percent,
            ..PricingConfig::default()
        })
    }

    async fn post_json(router: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&payload).expect("serialize payload"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");

        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    fn amount(value: &Value) -> Decimal {
        serde_json::from_value(value.clone()).expect("decimal amount")
    }

    #[tokio::test]
    async fn availability_route_lists_free_nights() {
        let (status, payload) = post_json(
            router(Decimal::ZERO),
            "/api/v1/stays/availability",
            json!({
                "reserved_stays": [{
                    "confirmation_code": "HM-1",
                    "status": "Confirmed",
                    "arrival_date": "2025-07-10",
                    "departure_date": "2025-07-15"
                }],
                "window_start": "2025-07-08",
                "window_end": "2025-07-17"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let days: Vec<&str> = payload["available_dates"]
            .as_array()
            .expect("dates array")
            .iter()
            .filter_map(|day| day["start_date"].as_str())
            .collect();
        assert_eq!(
            days,
            vec![
                "2025-07-08",
                "2025-07-09",
                "2025-07-15",
                "2025-07-16",
                "2025-07-17"
            ]
        );
        assert_eq!(payload["window_end"], json!("2025-07-17"));
    }

    #[tokio::test]
    async fn availability_route_rejects_malformed_dates() {
        let (status, payload) = post_json(
            router(Decimal::ZERO),
            "/api/v1/stays/availability",
            json!({
                "reserved_stays": [{
                    "confirmation_code": "HM-1",
                    "status": "Confirmed",
                    "arrival_date": "10/07/2025",
                    "departure_date": "2025-07-15"
                }],
                "today": "2025-07-01"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"]
            .as_str()
            .unwrap_or_default()
            .contains("arrival_date"));
    }

    #[tokio::test]
    async fn quote_route_applies_configured_markup() {
        let (status, payload) = post_json(
            router(dec!(25)),
            "/api/v1/stays/quote",
            json!({
                "rate_periods": [{
                    "season_label": "Summer",
                    "start_date": "2025-06-01",
                    "end_date": "2025-08-31",
                    "nightly_rate": 100,
                    "weekend_rate": 120,
                    "weekend_nights": ["Fri", "Sat"]
                }],
                "fees": {
                    "cleaning_fee": 50,
                    "additional_guest_fee_per_night": 10,
                    "tax_rate_percent": 10
                },
                "check_in": "2025-07-10",
                "check_out": "2025-07-13",
                "guests": 4
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["priced"], json!(true));
        assert_eq!(amount(&payload["listed_quote"]["estimated_total"]), dec!(558.9));
        assert_eq!(amount(&payload["quote"]["base_price"]), dec!(425));
        assert_eq!(amount(&payload["quote"]["estimated_total"]), dec!(694.69));
        assert_eq!(amount(&payload["markup_percent"]), dec!(25));
    }

    #[tokio::test]
    async fn strict_quote_without_rates_is_rejected() {
        let (status, payload) = post_json(
            router(Decimal::ZERO),
            "/api/v1/stays/quote",
            json!({
                "check_in": "2025-07-10",
                "check_out": "2025-07-13",
                "guests": 2,
                "strict": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"]
            .as_str()
            .unwrap_or_default()
            .contains("no rate period"));
    }

    #[tokio::test]
    async fn availability_route_caps_window_length() {
        let (status, payload) = post_json(
            router(Decimal::ZERO),
            "/api/v1/stays/availability",
            json!({
                "window_start": "0001-01-01",
                "window_end": "9999-12-31"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"]
            .as_str()
            .unwrap_or_default()
            .contains("spans more than"));
    }

    #[tokio::test]
    async fn oversized_amounts_are_rejected_not_panicked() {
        let huge = Decimal::MAX.to_string();

        let (status, payload) = post_json(
            router(dec!(25)),
            "/api/v1/stays/rates",
            json!({
                "rate_periods": [{
                    "start_date": "2025-06-01",
                    "end_date": "2025-08-31",
                    "nightly_rate": huge
                }]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"]
            .as_str()
            .unwrap_or_default()
            .contains("decimal range"));

        let (status, _) = post_json(
            router(Decimal::ZERO),
            "/api/v1/stays/quote",
            json!({
                "rate_periods": [{
                    "start_date": "2025-06-01",
                    "end_date": "2025-08-31",
                    "nightly_rate": huge,
                    "weekend_rate": huge
                }],
                "check_in": "2025-07-10",
                "check_out": "2025-07-13",
                "guests": 2
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rates_route_marks_up_each_period() {
        let (status, payload) = post_json(
            router(dec!(10)),
            "/api/v1/stays/rates",
            json!({
                "rate_periods": [{
                    "season_label": "Shoulder",
                    "start_date": "2025-09-01",
                    "end_date": "2025-10-31",
                    "nightly_rate": "90",
                    "monthly_rate": 0
                }]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let period = &payload["rate_periods"][0];
        assert_eq!(amount(&period["nightly_rate"]), dec!(99));
        assert_eq!(amount(&period["monthly_rate"]), Decimal::ZERO);
        assert_eq!(period["weekend_nights"], json!(["Fri", "Sat"]));
    }
}
