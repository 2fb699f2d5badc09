use std::net::IpAddr;

use actix_web::{HttpResponse, delete, get, web};
use chrono::{DateTime, Utc};
use latmon::records::aggregate;
use latmon::storage::SampleFilter;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    gt: String,
    lt: String,
}

#[derive(Debug, Deserialize)]
pub struct CutoffQuery {
    before: String,
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, AppError> {
    raw.parse::<DateTime<Utc>>()
        .map_err(|_| AppError::BadRequest(format!("malformed datetime: {raw}")))
}

fn parse_ip(raw: &str) -> Result<IpAddr, AppError> {
    raw.parse::<IpAddr>().map_err(|_| AppError::BadRequest(format!("malformed ip: {raw}")))
}

impl WindowQuery {
    fn to_filter(&self) -> Result<SampleFilter, AppError> {
        Ok(SampleFilter {
            after: Some(parse_datetime(&self.gt)?),
            before: Some(parse_datetime(&self.lt)?),
            address: None,
        })
    }
}

/// Aggregated per-address statistics over the requested time window.
#[get("/records")]
pub async fn list_records(
    state: web::Data<AppState>,
    query: web::Query<WindowQuery>,
) -> Result<HttpResponse, AppError> {
    let samples = state.storage.query_samples(&query.to_filter()?).await?;
    Ok(HttpResponse::Ok().json(aggregate(&samples)))
}

/// Raw samples for one IP over the requested time window, most recent first.
#[get("/records/{ip}")]
pub async fn records_for_ip(
    state: web::Data<AppState>,
    ip: web::Path<String>,
    query: web::Query<WindowQuery>,
) -> Result<HttpResponse, AppError> {
    let ip = parse_ip(&ip)?;

    let mut filter = query.to_filter()?;
    filter.address = Some(ip.to_string());

    let samples = state.storage.query_samples(&filter).await?;
    Ok(HttpResponse::Ok().json(samples))
}

/// Bulk-delete samples created at or before the cutoff; returns the count.
#[delete("/records")]
pub async fn delete_records(
    state: web::Data<AppState>,
    query: web::Query<CutoffQuery>,
) -> Result<HttpResponse, AppError> {
    let before = parse_datetime(&query.before)?;
    let deleted = state.storage.delete_samples(before).await?;
    Ok(HttpResponse::Ok().json(deleted))
}
