// src/models/mod.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Routing ====================

/// Destino explícito o clave de enrutamiento (tipo de AF)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteHint {
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub routing_key: Option<String>,
}

impl RouteHint {
    pub fn node(node_id: &str) -> Self {
        Self {
            node_id: Some(node_id.to_string()),
            routing_key: None,
        }
    }

    pub fn key(routing_key: &str) -> Self {
        Self {
            node_id: None,
            routing_key: Some(routing_key.to_string()),
        }
    }
}

/// Cuerpo HTTP: parámetros de la operación más la pista de enrutamiento
#[derive(Debug, Deserialize)]
pub struct Routed<P> {
    #[serde(flatten)]
    pub params: P,
    #[serde(flatten)]
    pub route: RouteHint,
}

// ==================== UCIP operations ====================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBalanceParams {
    pub subscriber_number: String,
    #[serde(default)]
    pub requested_information_flags: Option<u32>,
    #[serde(default)]
    pub subscriber_number_nai: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefillParams {
    pub subscriber_number: String,
    /// Importe en unidades mínimas de la moneda
    pub transaction_amount: String,
    #[serde(default)]
    pub transaction_currency: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub external_data1: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBalanceParams {
    pub subscriber_number: String,
    #[serde(default)]
    pub adjustment_amount: Option<String>,
    #[serde(default)]
    pub transaction_currency: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub transaction_code: Option<String>,
    #[serde(default)]
    pub dedicated_accounts: Vec<DedicatedAccountAdjustment>,
    #[serde(default)]
    pub supervision_expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub service_fee_expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedicatedAccountAdjustment {
    pub dedicated_account_id: i32,
    pub adjustment_amount: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAccountDetailsParams {
    pub subscriber_number: String,
    #[serde(default)]
    pub requested_information_flags: Option<u32>,
}

// ==================== API DTOs ====================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub ready: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub reloaded: bool,
    pub node_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routed_flattens_route_hint() {
        let body = r#"{
            "subscriberNumber": "1234567890",
            "transactionAmount": "500",
            "nodeId": "air02"
        }"#;

        let routed: Routed<RefillParams> = serde_json::from_str(body).unwrap();
        assert_eq!(routed.params.subscriber_number, "1234567890");
        assert_eq!(routed.params.transaction_amount, "500");
        assert_eq!(routed.route.node_id.as_deref(), Some("air02"));
        assert!(routed.route.routing_key.is_none());
    }

    #[test]
    fn test_update_balance_dedicated_accounts() {
        let body = r#"{
            "subscriberNumber": "1234567890",
            "routingKey": "AF2",
            "dedicatedAccounts": [{ "dedicatedAccountId": 3, "adjustmentAmount": "-100" }]
        }"#;

        let routed: Routed<UpdateBalanceParams> = serde_json::from_str(body).unwrap();
        assert_eq!(routed.params.dedicated_accounts.len(), 1);
        assert_eq!(routed.params.dedicated_accounts[0].dedicated_account_id, 3);
        assert_eq!(routed.route.routing_key.as_deref(), Some("AF2"));
    }
}
