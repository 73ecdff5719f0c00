mod common;

use common::{canned_label_result, fda_tool_list, FakeTransport};
use drugscout::error::ScoutError;
use drugscout::mcp::types::Outcome;
use drugscout::runner::{derive_arguments, DemoRunner, DemoStep, RunState};
use serde_json::{from_value, json};

fn never() -> std::future::Pending<()> {
    std::future::pending()
}

#[tokio::test]
async fn test_one_failing_step_never_stops_the_rest() {
    let fake = FakeTransport::new()
        .with_handshake()
        .reply("tools/list", fda_tool_list())
        .reply("tools/call", canned_label_result("first result"))
        .reply("tools/call", canned_label_result("third result"));
    let log = fake.log_handle();

    let steps = vec![
        DemoStep::named("first", "search_drug_labels", json!({ "search": "aspirin" })),
        // missing the required drug_name, fails validation locally
        DemoStep::named("second", "get_drug_warnings", json!({})),
        DemoStep::named("third", "get_drug_warnings", json!({ "drug_name": "aspirin" })),
    ];
    let mut runner = DemoRunner::new(steps, false);
    let report = runner.run_with_transport(Box::new(fake), never()).await;

    assert_eq!(runner.state(), RunState::Done);
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results[0].label, "first");
    assert!(report.results[0].invocation.outcome.is_success());
    match &report.results[1].invocation.outcome {
        Outcome::Failure(message) => assert!(message.contains("drug_name")),
        Outcome::Success(_) => panic!("second step should fail validation"),
    }
    assert!(report.results[2].invocation.outcome.is_success());

    let log = log.lock().unwrap();
    assert_eq!(log.requests.iter().filter(|m| *m == "tools/call").count(), 2);
    assert_eq!(log.closes, 1);
}

#[tokio::test]
async fn test_rejected_handshake_yields_failed_run_with_no_results() {
    let fake = FakeTransport::new().fail(
        "initialize",
        ScoutError::Auth("server answered HTTP 401".to_string()),
    );
    let log = fake.log_handle();

    let mut runner = DemoRunner::new(
        vec![DemoStep::named(
            "never runs",
            "search_drug_labels",
            json!({ "search": "aspirin", "limit": 1 }),
        )],
        false,
    );
    let report = runner.run_with_transport(Box::new(fake), never()).await;

    assert_eq!(runner.state(), RunState::Failed);
    assert!(matches!(report.fatal, Some(ScoutError::Auth(_))));
    assert!(report.results.is_empty());

    // The transport was opened once and released once despite the failure.
    let log = log.lock().unwrap();
    assert_eq!(log.opens, 1);
    assert_eq!(log.closes, 1);
}

#[tokio::test]
async fn test_failed_connection_open_yields_failed_run() {
    let fake = FakeTransport::new()
        .fail_open(ScoutError::Connection("connection refused".to_string()));
    let log = fake.log_handle();

    let mut runner = DemoRunner::new(Vec::new(), false);
    let report = runner.run_with_transport(Box::new(fake), never()).await;

    assert_eq!(runner.state(), RunState::Failed);
    assert!(matches!(report.fatal, Some(ScoutError::Connection(_))));

    // Nothing was successfully opened, so there is nothing to close.
    let log = log.lock().unwrap();
    assert_eq!(log.closes, 0);
}

#[tokio::test]
async fn test_shutdown_mid_run_still_closes_the_session() {
    let fake = FakeTransport::new().with_handshake().hang_on("tools/list");
    let log = fake.log_handle();

    let mut runner = DemoRunner::new(
        vec![DemoStep::named(
            "never reached",
            "search_drug_labels",
            json!({ "search": "aspirin" }),
        )],
        false,
    );
    let report = runner
        .run_with_transport(Box::new(fake), async {})
        .await;

    assert!(report.interrupted);
    assert_eq!(runner.state(), RunState::Failed);
    assert!(report.results.is_empty());

    let log = log.lock().unwrap();
    assert_eq!(log.opens, 1);
    assert_eq!(log.closes, 1);
}

#[tokio::test]
async fn test_shutdown_during_handshake_drops_the_transport() {
    let fake = FakeTransport::new().hang_on("initialize");
    let log = fake.log_handle();

    let mut runner = DemoRunner::new(Vec::new(), false);
    let report = runner.run_with_transport(Box::new(fake), async {}).await;

    assert!(report.interrupted);
    assert!(report.server.is_none());

    // The session never finished opening, so release happens by drop; close()
    // is reserved for completed opens.
    let log = log.lock().unwrap();
    assert_eq!(log.opens, 1);
    assert_eq!(log.closes, 0);
}

#[tokio::test]
async fn test_one_failing_listing_does_not_block_the_others() {
    let fake = FakeTransport::new()
        .with_handshake()
        .reply("tools/list", fda_tool_list())
        .fail(
            "resources/list",
            ScoutError::Connection("stream interrupted".to_string()),
        )
        .reply("prompts/list", json!({ "prompts": [ { "name": "drug_summary" } ] }));
    let log = fake.log_handle();

    let mut runner = DemoRunner::new(Vec::new(), false);
    let report = runner.run_with_transport(Box::new(fake), never()).await;

    assert_eq!(runner.state(), RunState::Done);
    assert_eq!(report.catalog.tools.len(), 2);
    assert!(report.catalog.resources.is_empty());
    assert_eq!(report.catalog.prompts.len(), 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("resources"));

    let log = log.lock().unwrap();
    for method in ["tools/list", "resources/list", "prompts/list"] {
        assert!(log.requests.iter().any(|m| m == method), "missing {}", method);
    }
}

#[tokio::test]
async fn test_end_to_end_canned_search_succeeds() {
    let canned = json!({ "results": [ { "id": "label-1" } ] });
    let fake = FakeTransport::new()
        .with_handshake()
        .reply("tools/list", fda_tool_list())
        .reply("tools/call", canned_label_result(&canned.to_string()));

    let mut runner = DemoRunner::new(
        vec![DemoStep::named(
            "canned search",
            "search_drug_labels",
            json!({ "search": "aspirin", "limit": 1 }),
        )],
        false,
    );
    let report = runner.run_with_transport(Box::new(fake), never()).await;

    assert!(report.fatal.is_none());
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.succeeded(), 1);
    match &report.results[0].invocation.outcome {
        Outcome::Success(payload) => {
            let value: serde_json::Value = serde_json::from_str(&payload.render()).unwrap();
            assert_eq!(value, canned);
        }
        Outcome::Failure(message) => panic!("expected success, got: {}", message),
    }

    let summary = report.server.expect("server summary");
    assert_eq!(summary.name, "fake-fda");
    assert!(summary.supports_tools);
}

#[tokio::test]
async fn test_first_listed_step_with_no_tools_is_a_recorded_failure() {
    let fake = FakeTransport::new()
        .with_handshake()
        .reply("tools/list", json!({ "tools": [] }));

    let mut runner = DemoRunner::new(
        vec![DemoStep::first_listed("probe the first tool")],
        false,
    );
    let report = runner.run_with_transport(Box::new(fake), never()).await;

    assert_eq!(report.results.len(), 1);
    match &report.results[0].invocation.outcome {
        Outcome::Failure(message) => assert!(message.contains("no tools advertised")),
        Outcome::Success(_) => panic!("expected a recorded failure"),
    }
}

#[tokio::test]
async fn test_first_listed_step_derives_required_arguments() {
    let fake = FakeTransport::new()
        .with_handshake()
        .reply("tools/list", fda_tool_list())
        .reply("tools/call", canned_label_result("ok"));

    let mut runner = DemoRunner::new(
        vec![DemoStep::first_listed("probe the first tool")],
        false,
    );
    let report = runner.run_with_transport(Box::new(fake), never()).await;

    assert_eq!(report.results.len(), 1);
    let invocation = &report.results[0].invocation;
    assert_eq!(invocation.tool_name, "search_drug_labels");
    assert_eq!(invocation.arguments, json!({ "search": "aspirin" }));
    assert!(invocation.outcome.is_success());
}

#[test]
fn test_derive_arguments_prefers_hints_then_type_defaults() {
    let tool = from_value(json!({
        "name": "generic_tool",
        "description": null,
        "inputSchema": {
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "limit": { "type": "integer" },
                "count": { "type": "integer" },
                "strict": { "type": "boolean" },
                "note": { "type": "string" },
            },
            "required": ["query", "limit", "count", "strict", "note"],
        },
    }))
    .unwrap();

    let arguments = derive_arguments(Some(&tool));
    assert_eq!(
        arguments,
        json!({
            "query": "aspirin",
            "limit": 3,
            "count": 1,
            "strict": true,
            "note": "example text",
        })
    );
}

#[test]
fn test_derive_arguments_without_a_descriptor_is_empty() {
    assert_eq!(derive_arguments(None), json!({}));
}
