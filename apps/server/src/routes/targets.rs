use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewTarget {
    address: String,
}

#[get("/targets")]
pub async fn list_targets(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let targets = state.storage.list_targets().await?;
    Ok(HttpResponse::Ok().json(targets))
}

/// Register an IP address for probing. Idempotent per address.
#[post("/targets")]
pub async fn create_target(
    state: web::Data<AppState>,
    body: web::Json<NewTarget>,
) -> Result<HttpResponse, AppError> {
    let address: std::net::IpAddr = body
        .address
        .parse()
        .map_err(|_| AppError::BadRequest(format!("malformed ip: {}", body.address)))?;

    let target = state.storage.insert_target(&address.to_string()).await?;
    Ok(HttpResponse::Created().json(target))
}
