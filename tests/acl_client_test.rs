use httpmock::prelude::*;
use rpaas_api::app::acl::{add_acl, list_acl, remove_acl, InstanceRef};
use rpaas_api::domain::model::AllowedUpstream;
use rpaas_api::{AccessControlList, AclClient, RpaasError};
use std::time::Duration;

fn client(server: &MockServer) -> AclClient {
    AclClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
}

fn target(service: Option<&str>, instance: &str) -> InstanceRef {
    InstanceRef {
        service: service.map(str::to_string),
        instance: instance.to_string(),
    }
}

#[tokio::test]
async fn test_add_posts_host_and_port() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/resources/my-instance/acl")
                .json_body(serde_json::json!({"host": "my-app.example.com", "port": 443}));
            then.status(201);
        })
        .await;

    let mut out = Vec::new();
    add_acl(
        &client(&server),
        &target(Some("rpaasv2"), "my-instance"),
        "my-app.example.com",
        443,
        &mut out,
    )
    .await
    .unwrap();

    api_mock.assert_async().await;
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Successfully added my-app.example.com:443 to rpaasv2/my-instance ACL.\n"
    );
}

#[tokio::test]
async fn test_list_parses_entries() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/resources/my-instance/acl");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"host": "10.0.0.1", "port": 80},
                    {"host": "internal.example.com"}
                ]));
        })
        .await;

    let acls = client(&server).list("my-instance").await.unwrap();

    api_mock.assert_async().await;
    assert_eq!(
        acls,
        vec![
            AllowedUpstream {
                host: "10.0.0.1".to_string(),
                port: 80,
            },
            AllowedUpstream {
                host: "internal.example.com".to_string(),
                port: 0,
            },
        ]
    );
}

#[tokio::test]
async fn test_list_renders_table() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/resources/my-instance/acl");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([{"host": "10.0.0.1", "port": 80}]));
        })
        .await;

    let mut out = Vec::new();
    list_acl(&client(&server), &target(None, "my-instance"), &mut out)
        .await
        .unwrap();

    let expected = "\
+----------+------+
| Host     | Port |
+----------+------+
| 10.0.0.1 | 80   |
+----------+------+
";
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[tokio::test]
async fn test_list_empty_or_null_prints_nothing() {
    for body in ["[]", "null"] {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/resources/my-instance/acl");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .body(body);
            })
            .await;

        let mut out = Vec::new();
        list_acl(&client(&server), &target(None, "my-instance"), &mut out)
            .await
            .unwrap();
        assert!(out.is_empty(), "when body == {:?}", body);
    }
}

#[tokio::test]
async fn test_remove_sends_delete_with_body() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/resources/my-instance/acl")
                .json_body(serde_json::json!({"host": "10.0.0.1", "port": 8080}));
            then.status(200);
        })
        .await;

    let mut out = Vec::new();
    remove_acl(
        &client(&server),
        &target(None, "my-instance"),
        "10.0.0.1",
        8080,
        &mut out,
    )
    .await
    .unwrap();

    api_mock.assert_async().await;
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Successfully removed 10.0.0.1:8080 from my-instance ACL.\n"
    );
}

#[tokio::test]
async fn test_error_status_carries_server_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/resources/unknown/acl");
            then.status(404).body("instance not found\n");
        })
        .await;

    let mut out = Vec::new();
    let err = add_acl(
        &client(&server),
        &target(None, "unknown"),
        "10.0.0.1",
        80,
        &mut out,
    )
    .await
    .unwrap_err();

    match &err {
        RpaasError::ApiStatusError { status, message } => {
            assert_eq!(*status, 404);
            assert_eq!(message, "instance not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.exit_code(), 1);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_server_error_is_retryable_severity() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/resources/my-instance/acl");
            then.status(503);
        })
        .await;

    let err = client(&server).list("my-instance").await.unwrap_err();
    assert!(matches!(err, RpaasError::ApiStatusError { status: 503, .. }));
    assert_eq!(err.exit_code(), 2);
}
