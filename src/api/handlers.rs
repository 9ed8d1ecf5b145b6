// src/api/handlers.rs
//! Capa HTTP delgada sobre `AirGateway`
//!
//! Los faults AIR se devuelven con 200 y su `responseCode`; los errores del
//! gateway se traducen con `ResponseError`.

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::error::GatewayError;
use crate::gateway::AirGateway;
use crate::models::{
    GetAccountDetailsParams, GetBalanceParams, HealthResponse, RefillParams, ReloadResponse,
    Routed, UpdateBalanceParams,
};

type Gateway = web::Data<Arc<AirGateway>>;

pub async fn health_check(gateway: Gateway) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "apolo-air-gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ready: gateway.is_ready().await,
    })
}

pub async fn get_balance(
    req: web::Json<Routed<GetBalanceParams>>,
    gateway: Gateway,
) -> Result<HttpResponse, GatewayError> {
    let response = gateway.get_balance(&req.params, &req.route).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn refill(
    req: web::Json<Routed<RefillParams>>,
    gateway: Gateway,
) -> Result<HttpResponse, GatewayError> {
    let response = gateway.refill(&req.params, &req.route).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn update_balance(
    req: web::Json<Routed<UpdateBalanceParams>>,
    gateway: Gateway,
) -> Result<HttpResponse, GatewayError> {
    let response = gateway.update_balance(&req.params, &req.route).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn get_account_details(
    req: web::Json<Routed<GetAccountDetailsParams>>,
    gateway: Gateway,
) -> Result<HttpResponse, GatewayError> {
    let response = gateway.get_account_details(&req.params, &req.route).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn get_stats(gateway: Gateway) -> HttpResponse {
    HttpResponse::Ok().json(gateway.get_stats().await)
}

pub async fn reset_stats(gateway: Gateway) -> HttpResponse {
    gateway.reset_stats().await;
    HttpResponse::Ok().json(gateway.get_stats().await)
}

/// Recarga los nodos; si el gateway no llegó a inicializarse, lo inicializa
pub async fn reload(gateway: Gateway) -> Result<HttpResponse, GatewayError> {
    let node_ids = if gateway.is_ready().await {
        gateway.reload().await?
    } else {
        gateway.initialize().await?;
        gateway.node_ids().await
    };
    Ok(HttpResponse::Ok().json(ReloadResponse {
        reloaded: true,
        node_ids,
    }))
}
