//! Request executor tests: header shape, the expiry guard, and the
//! single 401 retry.

mod common;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    mount_cognito_untouched, mount_refresh_ok, seed_expired, seed_fresh, test_client, NEW_BEARER,
    SEED_BEARER,
};
use emporia_gateway::Error;

#[tokio::test]
async fn request_carries_token_in_both_headers() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_cognito_untouched(&cognito).await;

    Mock::given(method("GET"))
        .and(path("/customers/devices"))
        .and(header("authtoken", SEED_BEARER))
        .and(header("authorization", format!("Bearer {}", SEED_BEARER).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"devices": []})))
        .expect(1)
        .mount(&api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    let devices = client.devices().await.unwrap();
    assert!(devices.devices.is_empty());
}

#[tokio::test]
async fn expired_credentials_refresh_before_the_request() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_refresh_ok(&cognito, 1).await;

    // The request must go out with the refreshed token, not the stale one.
    Mock::given(method("GET"))
        .and(path("/customers/devices"))
        .and(header("authtoken", NEW_BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"devices": []})))
        .expect(1)
        .mount(&api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_expired(&client).await;

    client.devices().await.unwrap();
}

#[tokio::test]
async fn unauthorized_response_triggers_one_reauth_and_retry() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_refresh_ok(&cognito, 1).await;

    // First attempt is rejected despite locally-fresh credentials.
    Mock::given(method("GET"))
        .and(path("/customers/devices"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&api)
        .await;

    Mock::given(method("GET"))
        .and(path("/customers/devices"))
        .and(header("authtoken", NEW_BEARER))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"devices": [{"deviceGid": 42}]})),
        )
        .expect(1)
        .mount(&api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    let devices = client.devices().await.unwrap();
    assert_eq!(devices.devices[0].device_gid, 42);
}

#[tokio::test]
async fn persistent_unauthorized_is_terminal_and_keeps_credentials() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_refresh_ok(&cognito, 1).await;

    Mock::given(method("GET"))
        .and(path("/customers/devices"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token rejected"))
        .expect(2)
        .mount(&api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    let err = client.devices().await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized { .. }));

    // Re-auth succeeded, so the refreshed credentials stay usable.
    let creds = client.auth().credentials().await.unwrap();
    assert_eq!(creds.bearer_token, NEW_BEARER);
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_cognito_untouched(&cognito).await;

    Mock::given(method("GET"))
        .and(path("/customers/devices/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    let err = client.devices_status().await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn transport_failure_surfaces_as_network_error() {
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_cognito_untouched(&cognito).await;

    // Grab a port that nothing is listening on.
    let dead_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = emporia_gateway::EmporiaClient::builder()
        .username("user@example.com")
        .password("hunter2")
        .client_id("test-client-id")
        .user_pool_id("us-east-2_TestPool1")
        .api_host(format!("http://127.0.0.1:{}", dead_port))
        .c_api_host(c_api.uri())
        .cognito_url(cognito.uri())
        .build()
        .unwrap();
    seed_fresh(&client).await;

    let err = client.devices().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn chart_usage_sends_instants_and_decodes_samples() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_cognito_untouched(&cognito).await;

    Mock::given(method("GET"))
        .and(path("/v1/migrated/app-api/chart-usage"))
        .and(query_param("deviceGid", "292237"))
        .and(query_param("channel", "1,2,3"))
        .and(query_param("scale", "1S"))
        .and(query_param("energyUnit", "KilowattHours"))
        .and(query_param("start", "2026-01-25T17:20:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firstUsageInstant": "2026-01-25T17:20:00.000Z",
            "usageList": [0.5, null, 0.7]
        })))
        .expect(1)
        .mount(&c_api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    use chrono::TimeZone;
    let start = chrono::Utc.with_ymd_and_hms(2026, 1, 25, 17, 20, 0).unwrap();
    let end = start + chrono::Duration::seconds(5);

    let usage = client
        .chart_usage(292237, "1,2,3", start, end, "1S", "KilowattHours")
        .await
        .unwrap();
    assert_eq!(usage.usage_list, vec![Some(0.5), None, Some(0.7)]);
}

#[tokio::test]
async fn set_charger_skips_write_when_state_matches() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_cognito_untouched(&cognito).await;

    Mock::given(method("GET"))
        .and(path("/customers/devices/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "evChargers": [{"deviceGid": 7, "chargerOn": true, "maxChargingRate": 40}]
        })))
        .expect(1)
        .mount(&api)
        .await;

    Mock::given(method("PUT"))
        .and(path("/devices/evcharger"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    let charger = client.set_ev_charger(7, true).await.unwrap();
    assert!(charger.charger_on);
}

#[tokio::test]
async fn set_charger_sends_full_object_with_state_flipped() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_cognito_untouched(&cognito).await;

    Mock::given(method("GET"))
        .and(path("/customers/devices/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "evChargers": [{"deviceGid": 7, "chargerOn": false, "maxChargingRate": 40}]
        })))
        .expect(1)
        .mount(&api)
        .await;

    Mock::given(method("PUT"))
        .and(path("/devices/evcharger"))
        .and(wiremock::matchers::body_partial_json(json!({
            "deviceGid": 7,
            "chargerOn": true,
            "maxChargingRate": 40
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deviceGid": 7, "chargerOn": true, "maxChargingRate": 40
        })))
        .expect(1)
        .mount(&api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    let charger = client.set_ev_charger(7, true).await.unwrap();
    assert!(charger.charger_on);
}

#[tokio::test]
async fn set_usage_rate_patches_only_stale_devices() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_cognito_untouched(&cognito).await;

    Mock::given(method("GET"))
        .and(path("/customers/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                {"deviceGid": 1, "locationProperties": {"deviceGid": 1, "usageCentPerKwHour": 9.5}},
                {"deviceGid": 2, "locationProperties": {"deviceGid": 2, "usageCentPerKwHour": 12.0}}
            ]
        })))
        .expect(1)
        .mount(&api)
        .await;

    // Only device 1 is stale; device 2 already has the target rate.
    Mock::given(method("PATCH"))
        .and(path("/devices/1/locationProperties"))
        .and(wiremock::matchers::body_partial_json(json!({
            "deviceGid": 1,
            "usageCentPerKwHour": 12.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&api)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/devices/2/locationProperties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    let updated = client.set_usage_rate(12.0).await.unwrap();
    assert_eq!(updated, 1);
}

#[tokio::test]
async fn app_preferences_decodes_base64_wrapper() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_cognito_untouched(&cognito).await;

    // base64 of {"theme":"dark"}
    Mock::given(method("GET"))
        .and(path("/v1/customers/app-preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "preferences": "eyJ0aGVtZSI6ImRhcmsifQ=="
        })))
        .expect(1)
        .mount(&c_api)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    let prefs = client.app_preferences().await.unwrap();
    assert_eq!(prefs, json!({"theme": "dark"}));
}
