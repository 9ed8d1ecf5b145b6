//! Construcción de requests UCIP
//!
//! Cada operación envía un único struct con los campos `origin*` seguidos
//! de los miembros propios de la operación. Los valores por defecto se
//! aplican aquí y no en la capa HTTP.

use chrono::{SubsecRound, Utc};
use rand::Rng;

use crate::models::{GetAccountDetailsParams, GetBalanceParams, RefillParams, UpdateBalanceParams};
use crate::xmlrpc::{Members, Request, Value};

pub const GET_BALANCE_AND_DATE: &str = "GetBalanceAndDate";
pub const REFILL: &str = "Refill";
pub const UPDATE_BALANCE_AND_DATE: &str = "UpdateBalanceAndDate";
pub const GET_ACCOUNT_DETAILS: &str = "GetAccountDetails";

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_TRANSACTION_TYPE: &str = "ADJUSTMENT";
/// Todos los bits de 32 bits: pedir toda la información disponible
pub const ALL_INFORMATION_FLAGS: u32 = u32::MAX;

/// Identidad de origen que se estampa en cada request
#[derive(Debug, Clone)]
pub struct Origin {
    pub node_type: String,
    pub host_name: String,
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            node_type: "EXT".to_string(),
            host_name: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "apolo-air-gateway".to_string()),
        }
    }
}

impl Origin {
    fn members(&self, transaction_id: &str) -> Members {
        Members::new()
            .with("originNodeType", self.node_type.as_str())
            .with("originHostName", self.host_name.as_str())
            .with("originTransactionID", transaction_id)
            .with("originTimeStamp", Utc::now().trunc_subsecs(0))
    }
}

/// `"TXN" + epoch en milisegundos + 4 dígitos aleatorios`
///
/// Unicidad best-effort. Quien necesite unicidad estricta debe enviar su id.
pub fn generate_transaction_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("TXN{}{:04}", Utc::now().timestamp_millis(), suffix)
}

pub fn get_balance(params: &GetBalanceParams, origin: &Origin) -> Request {
    let members = origin
        .members(&generate_transaction_id())
        .with("subscriberNumber", params.subscriber_number.as_str())
        .with_opt("subscriberNumberNAI", params.subscriber_number_nai)
        .with(
            "requestedInformationFlags",
            params.requested_information_flags.unwrap_or(0),
        );

    Request::new(GET_BALANCE_AND_DATE, vec![Value::Struct(members)])
}

pub fn refill(params: &RefillParams, origin: &Origin) -> Request {
    let transaction_id = params
        .transaction_id
        .clone()
        .unwrap_or_else(generate_transaction_id);

    let members = origin
        .members(&transaction_id)
        .with("subscriberNumber", params.subscriber_number.as_str())
        .with("transactionAmount", params.transaction_amount.as_str())
        .with(
            "transactionCurrency",
            params
                .transaction_currency
                .as_deref()
                .unwrap_or(DEFAULT_CURRENCY),
        )
        .with("refillProfileID", params.profile_id.as_deref().unwrap_or(""))
        .with_opt("externalData1", params.external_data1.as_deref());

    Request::new(REFILL, vec![Value::Struct(members)])
}

pub fn update_balance(params: &UpdateBalanceParams, origin: &Origin) -> Request {
    let transaction_id = params
        .transaction_id
        .clone()
        .unwrap_or_else(generate_transaction_id);

    let mut members = origin
        .members(&transaction_id)
        .with("subscriberNumber", params.subscriber_number.as_str())
        .with_opt("transactionCurrency", params.transaction_currency.as_deref())
        .with_opt("adjustmentAmountRelative", params.adjustment_amount.as_deref())
        .with(
            "transactionType",
            params
                .transaction_type
                .as_deref()
                .unwrap_or(DEFAULT_TRANSACTION_TYPE),
        )
        .with_opt("transactionCode", params.transaction_code.as_deref());

    if !params.dedicated_accounts.is_empty() {
        let updates: Vec<Value> = params
            .dedicated_accounts
            .iter()
            .map(|da| {
                Value::Struct(
                    Members::new()
                        .with("dedicatedAccountID", da.dedicated_account_id)
                        .with("adjustmentAmountRelative", da.adjustment_amount.as_str()),
                )
            })
            .collect();
        members.insert("dedicatedAccountUpdateInformation", updates);
    }

    let members = members
        .with_opt("supervisionExpiryDate", params.supervision_expiry_date)
        .with_opt("serviceFeeExpiryDate", params.service_fee_expiry_date);

    Request::new(UPDATE_BALANCE_AND_DATE, vec![Value::Struct(members)])
}

pub fn get_account_details(params: &GetAccountDetailsParams, origin: &Origin) -> Request {
    let members = origin
        .members(&generate_transaction_id())
        .with("subscriberNumber", params.subscriber_number.as_str())
        .with(
            "requestedInformationFlags",
            params
                .requested_information_flags
                .unwrap_or(ALL_INFORMATION_FLAGS),
        );

    Request::new(GET_ACCOUNT_DETAILS, vec![Value::Struct(members)])
}
