//! Behavioral properties of the dispatch chain, checked through the public
//! engine API with the shared doubles.

use std::time::Duration;

use cmdshim_dispatch::{
    CancellationToken, ContextBuilder, DispatchError, Engine, Invocation, Projection,
    RequestMapper, Select,
};
use cmdshim_test::{fixtures, CountingProvider, RecordingClient, ScriptedConfirmer, SlowClient};
use proptest::prelude::*;
use serde_json::{json, Value};

// =============================================================================
// Required fields are reported, not enforced
// =============================================================================

#[tokio::test]
async fn test_missing_required_field_is_left_to_the_service() {
    let client = RecordingClient::responding(json!({"Arn": "arn:env/demo"}));
    let engine = Engine::builder(client.provider()).build();

    let outcome = engine
        .invoke(
            &fixtures::create_environment(),
            Invocation::new().bind("Name", "demo").force(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.into_value(), json!("arn:env/demo"));
    let sent = &client.requests()[0];
    assert_eq!(sent.body, json!({"Name": "demo"}));
    assert!(sent.get_path("ExecutionRoleArn").is_none());
}

#[test]
fn test_missing_required_field_produces_warning() {
    let op = fixtures::create_environment();
    let ctx = ContextBuilder::new(&op)
        .build(&vec![("Name".into(), json!("demo"))], Projection::Identity)
        .unwrap();

    assert_eq!(ctx.warnings().len(), 1);
    assert_eq!(RequestMapper::map(&ctx).body, json!({"Name": "demo"}));
}

// =============================================================================
// Composite pruning
// =============================================================================

#[test]
fn test_untouched_composites_are_absent() {
    let op = fixtures::create_environment();
    let ctx = ContextBuilder::new(&op)
        .build(
            &vec![
                ("Name".into(), json!("demo")),
                ("DagProcessingLogsLevel".into(), json!("INFO")),
            ],
            Projection::Identity,
        )
        .unwrap();

    let body = RequestMapper::map(&ctx).body;
    assert!(body.get("NetworkConfiguration").is_none());
    assert_eq!(
        body["LoggingConfiguration"],
        json!({"DagProcessingLogs": {"LogLevel": "INFO"}})
    );
}

// =============================================================================
// Projection
// =============================================================================

#[tokio::test]
async fn test_projection_modes() {
    let response = json!({"ApiId": "server-id", "Name": "server-name", "Tags": {}});
    let client = RecordingClient::responding(response.clone());
    let engine = Engine::builder(client.provider()).build();
    let op = fixtures::get_api();
    let token = CancellationToken::new();

    let run = |select: &str| {
        Invocation::new()
            .bind("ApiId", "bound-id")
            .select(select.parse().unwrap())
    };

    let all = engine.invoke(&op, run("*"), &token).await.unwrap();
    assert_eq!(all.into_value(), response);

    let field = engine.invoke(&op, run("Name"), &token).await.unwrap();
    assert_eq!(field.into_value(), json!("server-name"));

    let echo = engine.invoke(&op, run("^ApiId"), &token).await.unwrap();
    assert_eq!(echo.into_value(), json!("bound-id"));
}

// =============================================================================
// Confirmation short-circuit
// =============================================================================

#[tokio::test]
async fn test_declined_confirmation_touches_nothing() {
    let client = RecordingClient::echo();
    let provider = CountingProvider::new(client.clone());
    let confirmer = ScriptedConfirmer::no();
    let engine = Engine::builder(provider.clone())
        .confirmer(confirmer.clone())
        .build();

    let err = engine
        .invoke(
            &fixtures::delete_api(),
            Invocation::new().bind("ApiId", "abc"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Declined { .. }));
    assert_eq!(confirmer.asked(), 1);
    assert!(confirmer.prompts()[0].contains("ApiId=abc"));
    assert_eq!(provider.created(), 0);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_force_skips_the_prompt() {
    let client = RecordingClient::echo();
    let confirmer = ScriptedConfirmer::no();
    let engine = Engine::builder(client.provider())
        .confirmer(confirmer.clone())
        .build();

    engine
        .invoke(
            &fixtures::delete_api(),
            Invocation::new().bind("ApiId", "abc").force(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(confirmer.asked(), 0);
    assert_eq!(client.calls(), 1);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_during_call_is_cancellation() {
    let slow = SlowClient::new(Duration::from_secs(5), json!({}));
    let engine = Engine::builder(CountingProvider::new(slow.clone())).build();
    let token = CancellationToken::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        })
    };

    let err = engine
        .invoke(&fixtures::get_api(), Invocation::new().bind("ApiId", "abc"), &token)
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(err.is_cancelled());
    assert!(slow.started());
    assert!(!slow.finished());
}

// =============================================================================
// Mapping determinism
// =============================================================================

fn environment_bindings() -> impl Strategy<Value = Vec<(String, Value)>> {
    (
        "[a-z]{1,12}",
        proptest::option::of("arn:[a-z]{1,8}"),
        proptest::option::of(prop::collection::vec("subnet-[0-9a-f]{4}", 0..4)),
        proptest::option::of(any::<bool>()),
        proptest::option::of(prop_oneof!["INFO", "WARNING", "ERROR"]),
        proptest::option::of(1i64..50),
    )
        .prop_map(|(name, role, subnets, logs, level, workers)| {
            let mut bindings = vec![("Name".to_string(), json!(name))];
            let optional = [
                ("ExecutionRoleArn", role.map(Value::from)),
                ("SubnetIds", subnets.map(Value::from)),
                ("DagProcessingLogsEnabled", logs.map(Value::from)),
                ("DagProcessingLogsLevel", level.map(Value::from)),
                ("MaxWorkers", workers.map(Value::from)),
            ];
            for (key, value) in optional {
                if let Some(value) = value {
                    bindings.push((key.to_string(), value));
                }
            }
            bindings
        })
}

proptest! {
    #[test]
    fn prop_mapping_is_deterministic(bindings in environment_bindings()) {
        let op = fixtures::create_environment();
        let ctx = ContextBuilder::new(&op)
            .build_selected(&bindings, Some(&Select::All))
            .unwrap();

        prop_assert_eq!(RequestMapper::map(&ctx), RequestMapper::map(&ctx));

        let rebuilt = ContextBuilder::new(&op)
            .build_selected(&bindings, Some(&Select::All))
            .unwrap();
        prop_assert_eq!(RequestMapper::map(&ctx), RequestMapper::map(&rebuilt));
    }

    #[test]
    fn prop_composites_exist_only_when_a_leaf_is_bound(bindings in environment_bindings()) {
        let op = fixtures::create_environment();
        let ctx = ContextBuilder::new(&op)
            .build_selected(&bindings, Some(&Select::All))
            .unwrap();
        let body = RequestMapper::map(&ctx).body;

        let bound = |name: &str| bindings.iter().any(|(k, _)| k == name);

        prop_assert_eq!(body.get("NetworkConfiguration").is_some(), bound("SubnetIds"));
        prop_assert_eq!(
            body.get("LoggingConfiguration").is_some(),
            bound("DagProcessingLogsEnabled") || bound("DagProcessingLogsLevel")
        );
    }
}
