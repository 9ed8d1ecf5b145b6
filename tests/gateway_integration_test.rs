// tests/gateway_integration_test.rs
//! End-to-end tests: gateway -> router -> XML-RPC transport -> simulated AIR node
//!
//! Run with: cargo test --test gateway_integration_test -- --nocapture


use air_simulator::{gateway_for, Behavior, SimulatedNode};
use apolo_air_gateway::models::{
    GetAccountDetailsParams, GetBalanceParams, RefillParams, RouteHint, UpdateBalanceParams,
};
use apolo_air_gateway::xmlrpc::{Members, Request, Response, Value};
use apolo_air_gateway::GatewayError;
use std::time::Duration;

fn balance(subscriber: &str) -> GetBalanceParams {
    GetBalanceParams {
        subscriber_number: subscriber.to_string(),
        ..Default::default()
    }
}

fn details(subscriber: &str) -> GetAccountDetailsParams {
    GetAccountDetailsParams {
        subscriber_number: subscriber.to_string(),
        requested_information_flags: None,
    }
}

fn node_of(response: &Response) -> String {
    response
        .data()
        .and_then(|d| d.get("node"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn test_get_balance_end_to_end() {
    let node = SimulatedNode::start("air01", Behavior::Normal).await;
    let gateway = gateway_for(vec![node.descriptor(None)], 5_000);
    gateway.initialize().await.unwrap();

    let response = gateway
        .get_balance(&balance("1234567890"), &RouteHint::default())
        .await
        .unwrap();

    let expected = Value::Struct(
        Members::new()
            .with("subscriberNumber", "1234567890")
            .with("balance", 10000i64),
    );
    assert_eq!(response, Response::Success(expected));
    assert_eq!(response.response_code(), 0);

    let stats = gateway.get_stats().await;
    assert_eq!((stats.total, stats.succeeded, stats.failed), (1, 1, 0));
    assert!(stats.average_response_time_ms > 0.0);

    // Lo que llegó al nodo
    let received = node.last_request().unwrap();
    assert_eq!(received.method_name, "GetBalanceAndDate");
    let param = &received.params[0];
    assert_eq!(param.get("originNodeType"), Some(&Value::from("EXT")));
    assert_eq!(param.get("originHostName"), Some(&Value::from("gw-test")));
    assert_eq!(param.get("requestedInformationFlags"), Some(&Value::Integer(0)));
    assert!(matches!(param.get("originTimeStamp"), Some(Value::DateTime(_))));

    node.stop().await;
}

#[actix_web::test]
async fn test_refill_defaults_reach_node() {
    let node = SimulatedNode::start("air01", Behavior::Normal).await;
    let gateway = gateway_for(vec![node.descriptor(None)], 5_000);
    gateway.initialize().await.unwrap();

    let response = gateway
        .refill(
            &RefillParams {
                subscriber_number: "1234567890".to_string(),
                transaction_amount: "1000".to_string(),
                ..Default::default()
            },
            &RouteHint::default(),
        )
        .await
        .unwrap();
    assert!(!response.is_fault());

    let param = node.last_request().unwrap().params[0].clone();
    assert_eq!(param.get("transactionCurrency"), Some(&Value::from("USD")));
    assert_eq!(param.get("refillProfileID"), Some(&Value::from("")));
    assert!(param
        .get("originTransactionID")
        .and_then(Value::as_str)
        .unwrap()
        .starts_with("TXN"));

    node.stop().await;
}

#[actix_web::test]
async fn test_fault_is_returned_as_data() {
    let node = SimulatedNode::start("air01", Behavior::Normal).await;
    let gateway = gateway_for(vec![node.descriptor(None)], 5_000);
    gateway.initialize().await.unwrap();

    let response = gateway
        .update_balance(
            &UpdateBalanceParams {
                subscriber_number: "1234567890".to_string(),
                adjustment_amount: Some("-999999".to_string()),
                ..Default::default()
            },
            &RouteHint::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        response,
        Response::Fault {
            code: 102,
            message: "INSUFFICIENT_BALANCE".to_string()
        }
    );

    let stats = gateway.get_stats().await;
    assert_eq!((stats.total, stats.succeeded, stats.failed), (1, 1, 0));

    node.stop().await;
}

#[actix_web::test]
async fn test_non_2xx_is_transport_error() {
    let node = SimulatedNode::start("air01", Behavior::ServerError).await;
    let gateway = gateway_for(vec![node.descriptor(None)], 5_000);
    gateway.initialize().await.unwrap();

    let err = gateway
        .get_balance(&balance("1234567890"), &RouteHint::default())
        .await
        .unwrap_err();

    match err {
        GatewayError::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let stats = gateway.get_stats().await;
    assert_eq!((stats.total, stats.succeeded, stats.failed), (1, 0, 1));
    // Sin reintentos
    assert_eq!(node.calls(), 1);

    node.stop().await;
}

#[actix_web::test]
async fn test_redirect_is_not_followed() {
    let node = SimulatedNode::start("air01", Behavior::Redirect).await;
    let gateway = gateway_for(vec![node.descriptor(None)], 5_000);
    gateway.initialize().await.unwrap();

    let err = gateway
        .get_balance(&balance("1234567890"), &RouteHint::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::HttpStatus { status: 302, .. }));

    node.stop().await;
}

#[actix_web::test]
async fn test_malformed_body_is_protocol_error() {
    let node = SimulatedNode::start("air01", Behavior::Garbage).await;
    let gateway = gateway_for(vec![node.descriptor(None)], 5_000);
    gateway.initialize().await.unwrap();

    let err = gateway
        .get_balance(&balance("1234567890"), &RouteHint::default())
        .await
        .unwrap_err();

    match err {
        GatewayError::ProtocolDecode(e) => assert!(e.fragment.contains("not xml-rpc")),
        other => panic!("unexpected error: {:?}", other),
    }

    node.stop().await;
}

#[actix_web::test]
async fn test_timeout() {
    let node = SimulatedNode::start("air01", Behavior::Slow(Duration::from_secs(2))).await;
    let gateway = gateway_for(vec![node.descriptor(None)], 100);
    gateway.initialize().await.unwrap();

    let err = gateway
        .get_balance(&balance("1234567890"), &RouteHint::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Timeout(100)));
    assert_eq!(gateway.get_stats().await.failed, 1);

    node.stop().await;
}

#[actix_web::test]
async fn test_round_robin_across_nodes() {
    let a = SimulatedNode::start("A", Behavior::Normal).await;
    let b = SimulatedNode::start("B", Behavior::Normal).await;
    let c = SimulatedNode::start("C", Behavior::Normal).await;
    let gateway = gateway_for(
        vec![a.descriptor(Some("k")), b.descriptor(Some("k")), c.descriptor(Some("k"))],
        5_000,
    );
    gateway.initialize().await.unwrap();

    let mut chosen = Vec::new();
    for _ in 0..7 {
        let response = gateway
            .get_account_details(&details("1234567890"), &RouteHint::key("k"))
            .await
            .unwrap();
        chosen.push(node_of(&response));
    }

    assert_eq!(chosen, vec!["A", "B", "C", "A", "B", "C", "A"]);

    a.stop().await;
    b.stop().await;
    c.stop().await;
}

#[actix_web::test]
async fn test_node_id_overrides_routing_key() {
    let a = SimulatedNode::start("A", Behavior::Normal).await;
    let x = SimulatedNode::start("X", Behavior::Normal).await;
    let gateway = gateway_for(vec![a.descriptor(Some("k")), x.descriptor(None)], 5_000);
    gateway.initialize().await.unwrap();

    let route = RouteHint {
        node_id: Some("X".to_string()),
        routing_key: Some("k".to_string()),
    };
    let response = gateway
        .get_account_details(&details("1234567890"), &route)
        .await
        .unwrap();

    assert_eq!(node_of(&response), "X");
    assert_eq!(a.calls(), 0);

    a.stop().await;
    x.stop().await;
}

#[actix_web::test]
async fn test_concurrent_requests_spread_evenly() {
    let a = SimulatedNode::start("A", Behavior::Normal).await;
    let b = SimulatedNode::start("B", Behavior::Normal).await;
    let c = SimulatedNode::start("C", Behavior::Normal).await;
    let gateway = gateway_for(
        vec![a.descriptor(Some("k")), b.descriptor(Some("k")), c.descriptor(Some("k"))],
        5_000,
    );
    gateway.initialize().await.unwrap();

    let calls = (0..30).map(|i| {
        let gateway = gateway.clone();
        async move {
            gateway
                .get_account_details(&details(&format!("55500{:05}", i)), &RouteHint::key("k"))
                .await
        }
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!((a.calls(), b.calls(), c.calls()), (10, 10, 10));

    let stats = gateway.get_stats().await;
    assert_eq!((stats.total, stats.succeeded, stats.failed), (30, 30, 0));

    a.stop().await;
    b.stop().await;
    c.stop().await;
}

#[actix_web::test]
async fn test_generic_execute_request() {
    let node = SimulatedNode::start("air01", Behavior::Normal).await;
    let gateway = gateway_for(vec![node.descriptor(None)], 5_000);
    gateway.initialize().await.unwrap();

    let request = Request::new("DeleteSubscriber", vec![Value::from("1234567890")]);
    let response = gateway
        .execute_request(request, Some("air01"), None)
        .await
        .unwrap();

    assert_eq!(response.response_code(), -32601);

    node.stop().await;
}
