//! Integration tests for the newline-delimited JSON transport

#[path = "support.rs"]
mod support;

use deploywatch_api::{serve, ToolResponse};
use serde_json::json;
use support::handler_with_env;
use tokio::io::BufReader;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse_lines(output: &[u8]) -> Vec<ToolResponse> {
    std::str::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_serves_one_response_per_request_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v6/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deployments": [{"uid": "dpl_1", "state": "READY", "url": "web.vercel.app"}]
        })))
        .mount(&server)
        .await;

    let handler = handler_with_env(&server.uri(), &[("VERCEL_TOKEN", "vc")]);
    let input = concat!(
        r#"{"id": 1, "method": "tools/list"}"#,
        "\n\n",
        r#"{"id": 2, "method": "tools/call", "params": {"name": "check_deployment_status", "arguments": {"platform": "vercel", "project": "web"}}}"#,
        "\n",
        r#"{"id": "three", "method": "ping"}"#,
        "\n",
    );

    let mut output = Vec::new();
    let handled = serve(&handler, BufReader::new(input.as_bytes()), &mut output).await.unwrap();
    assert_eq!(handled, 3);

    let responses = parse_lines(&output);
    assert_eq!(responses.len(), 3);

    assert_eq!(responses[0].id, Some(json!(1)));
    assert_eq!(responses[0].result.as_ref().unwrap()["tools"].as_array().unwrap().len(), 5);

    let status = responses[1].result.as_ref().unwrap();
    assert_eq!(status["tool"], "check_deployment_status");
    assert_eq!(status["data"]["status"], "success");
    assert_eq!(status["data"]["url"], "https://web.vercel.app");

    assert_eq!(responses[2].id, Some(json!("three")));
    assert_eq!(responses[2].error.as_ref().unwrap().message(), "Unknown method: ping");
}

#[tokio::test]
async fn test_malformed_line_gets_error_response() {
    let server = MockServer::start().await;
    let handler = handler_with_env(&server.uri(), &[]);

    let mut output = Vec::new();
    serve(&handler, BufReader::new(&b"{not json\n"[..]), &mut output).await.unwrap();

    let responses = parse_lines(&output);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].id.is_none());
    assert!(responses[0].error.as_ref().unwrap().message().starts_with("Malformed request"));
}
