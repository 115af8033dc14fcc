use httpmock::prelude::*;
use serde_json::json;
use smartdata::{
    BlockingSmartDataClient, ClientConfig, ClientError, Credentials, Pagination, ValuesQuery,
};

fn client_for(server: &MockServer) -> BlockingSmartDataClient {
    let config = ClientConfig::new(Credentials::new("bob", "pw"))
        .with_in_api(server.url("/in"))
        .with_out_api(server.url("/out"));
    BlockingSmartDataClient::from_config(config).expect("valid config")
}

#[test]
fn sources_are_listed_in_server_order() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/in/source/")
            .query_param("from", "10")
            .query_param("size", "3")
            .header("login", "bob")
            .header("password", "pw");
        then.status(200).json_body(json!({
            "results": [{"_id": "c"}, {"_id": "a"}, {"_id": "b"}],
        }));
    });

    let sources = client_for(&server)
        .sources(Some(Pagination::new(10, 3).into()))
        .expect("listing");

    let ids: Vec<_> = sources.iter().map(|source| source.id().to_owned()).collect();
    assert_eq!(ids, ["c", "a", "b"]);
    mock.assert();
}

#[test]
fn stream_operations_target_out_api() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/in/stream/s1");
        then.status(200).json_body(json!({"_id": "s1"}));
    });
    let fields = server.mock(|when, then| {
        when.method(GET).path("/out/s1/fields");
        then.status(200)
            .json_body(json!({"fields": {"content": ["a"]}}));
    });
    let values = server.mock(|when, then| {
        when.method(GET)
            .path("/out/s1/values")
            .query_param("field", "a");
        then.status(200).json_body(json!({"content": [1, 2]}));
    });

    let stream = client_for(&server).stream("s1").expect("stream");

    assert_eq!(stream.fields().expect("fields"), json!(["a"]));
    assert_eq!(
        stream
            .values(Some(ValuesQuery::new("a").into()))
            .expect("values"),
        json!([1, 2])
    );
    fields.assert();
    values.assert();
}

#[test]
fn update_and_delete_use_source_identifier() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/in/source/abc123");
        then.status(200)
            .json_body(json!({"_id": "abc123", "name": "old"}));
    });
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path("/in/source/abc123")
            .json_body(json!({"name": "x"}));
        then.status(200)
            .json_body(json!({"_id": "abc123", "name": "x"}));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/in/source/abc123");
        then.status(204);
    });

    let source = client_for(&server).source("abc123").expect("source");
    let updated = source.update(json!({"name": "x"})).expect("update");
    updated.delete().expect("delete");

    assert_eq!(updated.get("name"), Some(&json!("x")));
    assert_eq!(source.get("name"), Some(&json!("old")));
    update.assert();
    delete.assert();
}

#[test]
fn error_status_is_not_decoded() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/in/stream/");
        then.status(500).body("{\"error\":\"boom\"}");
    });

    let error = client_for(&server).streams(None).expect_err("server error");

    assert!(matches!(
        error,
        ClientError::HttpStatus { status, .. } if status.as_u16() == 500
    ));
}

#[test]
fn proxy_receives_requests_for_unresolvable_roots() {
    let proxy = MockServer::start();
    let mock = proxy.mock(|when, then| {
        when.method(GET).path("/source/abc123");
        then.status(200).json_body(json!({"_id": "abc123"}));
    });
    let config = ClientConfig::new(Credentials::new("bob", "pw"))
        .with_in_api("http://in.api.invalid")
        .with_proxy(proxy.base_url());
    let client = BlockingSmartDataClient::from_config(config).expect("valid config");

    let source = client.source("abc123").expect("source via proxy");

    assert_eq!(source.id(), "abc123");
    mock.assert();
}
