use anyhow::{anyhow, Result};
use fluo::flow::{
    Answers, FlowClient, FlowError, FlowExecutor, FlowOutcome, FlowPhase, Navigation,
    RecordingNavigator, RetryPolicy, ScriptedInteractor, StageKind,
};
use serde_json::json;
use std::net::TcpListener;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXECUTOR_PATH: &str = "/api/v3/flows/executor/test-flow/";

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn executor_for(server: &MockServer) -> FlowExecutor {
    let client = FlowClient::new(server.uri()).expect("client builds against mock server");
    FlowExecutor::new(client, "test-flow")
}

#[tokio::test]
async fn full_login_flow_reaches_redirect() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "ak-stage-identification",
            "flow_info": {"title": "Welcome", "background": "/static/bg.jpg", "layout": "stacked"},
            "user_fields": ["username", "email"],
            "password_fields": false,
            "primary_action": "Log in"
        })))
        .mount(&server)
        .await;

    // The submission carries exactly what the stage built, nothing extra
    Mock::given(method("POST"))
        .and(path(EXECUTOR_PATH))
        .and(body_json(json!({"uid_field": "akadmin"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "ak-stage-password",
            "flow_info": {"title": "Welcome"},
            "pending_user": "akadmin"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(EXECUTOR_PATH))
        .and(body_json(json!({"password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "xak-flow-redirect",
            "to": "/if/user/"
        })))
        .mount(&server)
        .await;

    let mut executor = executor_for(&server);
    let mut interactor = ScriptedInteractor::new()
        .answer("uid_field", "akadmin")
        .answer("password", "hunter2");
    let mut navigator = RecordingNavigator::new();

    let outcome = executor.run(&mut interactor, &mut navigator).await?;

    assert_eq!(
        outcome,
        FlowOutcome::Redirected(Navigation::Visit("/if/user/".to_string()))
    );
    assert_eq!(navigator.count(), 1);
    assert_eq!(
        navigator.last(),
        Some(&Navigation::Visit("/if/user/".to_string()))
    );
    assert_eq!(*executor.phase(), FlowPhase::Redirecting);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);

    Ok(())
}

#[tokio::test]
async fn validation_errors_rerender_the_stage() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "ak-stage-identification",
            "flow_info": {"title": "Welcome"},
            "user_fields": ["email"],
            "password_fields": false
        })))
        .mount(&server)
        .await;

    // First attempt is rejected with field errors, still a challenge
    Mock::given(method("POST"))
        .and(path(EXECUTOR_PATH))
        .and(body_json(json!({"uid_field": "not-an-email"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "component": "ak-stage-identification",
            "flow_info": {"title": "Welcome"},
            "user_fields": ["email"],
            "password_fields": false,
            "response_errors": {
                "uid_field": [{"string": "Enter a valid email address.", "code": "invalid"}],
                "non_field_errors": [{"string": "Failed to authenticate.", "code": "invalid"}]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(EXECUTOR_PATH))
        .and(body_json(json!({"uid_field": "ken@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "xak-flow-redirect",
            "to": "/if/user/"
        })))
        .mount(&server)
        .await;

    let mut executor = executor_for(&server);

    executor.start().await?;

    let rejected = executor
        .submit(&Answers::new().with("uid_field", "not-an-email"))
        .await?;

    assert_eq!(rejected.component, "ak-stage-identification");
    assert_eq!(
        rejected.form.field("uid_field").unwrap().errors,
        vec!["Enter a valid email address.".to_string()]
    );
    assert_eq!(
        rejected.form.non_field_errors,
        vec!["Failed to authenticate.".to_string()]
    );
    assert_eq!(
        *executor.phase(),
        FlowPhase::Rendering {
            component: "ak-stage-identification".to_string()
        }
    );

    // The stage stayed submittable
    let accepted = executor
        .submit(&Answers::new().with("uid_field", "ken@example.com"))
        .await?;

    assert_eq!(accepted.kind, StageKind::Terminal);

    Ok(())
}

#[tokio::test]
async fn unknown_component_is_terminal_and_sends_nothing() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "ak-stage-webhook",
            "flow_info": {"title": "Welcome"}
        })))
        .mount(&server)
        .await;

    let mut executor = executor_for(&server);
    let mut interactor = ScriptedInteractor::new();
    let mut navigator = RecordingNavigator::new();

    let outcome = executor.run(&mut interactor, &mut navigator).await?;

    assert_eq!(
        outcome,
        FlowOutcome::Unsupported {
            component: "ak-stage-webhook".to_string()
        }
    );
    assert_eq!(navigator.count(), 0);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method.as_str(), "GET");

    Ok(())
}

#[tokio::test]
async fn no_request_goes_out_after_the_redirect() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "xak-flow-redirect",
            "to": "https://app.tld/welcome"
        })))
        .mount(&server)
        .await;

    let mut executor = executor_for(&server);
    let mut interactor = ScriptedInteractor::new();
    let mut navigator = RecordingNavigator::new();

    let outcome = executor.run(&mut interactor, &mut navigator).await?;

    assert_eq!(
        outcome,
        FlowOutcome::Redirected(Navigation::Visit("https://app.tld/welcome".to_string()))
    );

    let error = executor
        .submit(&Answers::new())
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;

    assert!(matches!(error, FlowError::AlreadyRedirected));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);

    Ok(())
}

#[tokio::test]
async fn autosubmit_hands_off_via_post_form() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "ak-stage-autosubmit",
            "url": "https://sp.tld/saml/acs",
            "attrs": {
                "RelayState": "token123",
                "SAMLResponse": "PHNhbWw+"
            }
        })))
        .mount(&server)
        .await;

    let mut executor = executor_for(&server);
    let mut interactor = ScriptedInteractor::new();
    let mut navigator = RecordingNavigator::new();

    let outcome = executor.run(&mut interactor, &mut navigator).await?;

    assert_eq!(
        outcome,
        FlowOutcome::Redirected(Navigation::PostForm {
            url: "https://sp.tld/saml/acs".to_string(),
            fields: vec![
                ("RelayState".to_string(), "token123".to_string()),
                ("SAMLResponse".to_string(), "PHNhbWw+".to_string()),
            ],
        })
    );

    Ok(())
}

#[tokio::test]
async fn access_denied_maps_to_denied_outcome() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "ak-stage-access-denied",
            "flow_info": {"title": "Welcome"},
            "error_message": "not in group admins"
        })))
        .mount(&server)
        .await;

    let mut executor = executor_for(&server);
    let mut interactor = ScriptedInteractor::new();
    let mut navigator = RecordingNavigator::new();

    let outcome = executor.run(&mut interactor, &mut navigator).await?;

    assert_eq!(
        outcome,
        FlowOutcome::Denied {
            message: Some("not in group admins".to_string())
        }
    );
    assert_eq!(navigator.count(), 0);

    Ok(())
}

#[tokio::test]
async fn endpoint_error_carries_url_status_and_body() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let mut executor = executor_for(&server);

    let error = executor
        .start()
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;

    let message = error.to_string();
    assert!(message.contains(EXECUTOR_PATH));
    assert!(message.contains("500"));
    assert!(message.contains("upstream exploded"));

    Ok(())
}

#[tokio::test]
async fn original_query_is_forwarded() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .and(query_param("query", "next=/apps/test/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "xak-flow-redirect",
            "to": "/apps/test/"
        })))
        .mount(&server)
        .await;

    let client = FlowClient::new(server.uri())?;
    let mut executor =
        FlowExecutor::new(client, "test-flow").with_query("next=/apps/test/");

    let view = executor.start().await?;

    assert_eq!(view.component, "xak-flow-redirect");

    Ok(())
}

#[tokio::test]
async fn session_cookie_rides_along() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "authentik_session=abc123; Path=/")
                .set_body_json(json!({
                    "component": "ak-stage-password",
                    "pending_user": "akadmin"
                })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(EXECUTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "component": "xak-flow-redirect",
            "to": "/if/user/"
        })))
        .mount(&server)
        .await;

    let mut executor = executor_for(&server);

    executor.start().await?;
    executor
        .submit(&Answers::new().with("password", "hunter2"))
        .await?;

    let received = server.received_requests().await.unwrap();
    let post = received
        .iter()
        .find(|request| request.method.as_str() == "POST")
        .ok_or_else(|| anyhow!("expected a POST"))?;
    let cookie = post
        .headers
        .get("cookie")
        .ok_or_else(|| anyhow!("expected a cookie header"))?;

    assert!(cookie.to_str()?.contains("authentik_session=abc123"));

    Ok(())
}

#[tokio::test]
async fn transport_errors_are_retried_until_give_up() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }

    // Grab a free port and release it so nothing is listening there
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);

    let client = FlowClient::new(format!("http://127.0.0.1:{port}"))?;
    let mut executor = FlowExecutor::new(client, "test-flow").with_retry(RetryPolicy {
        max_retries: 2,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        multiplier: 1.0,
        jitter: 0.0,
    });

    let error = executor
        .start()
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;

    assert!(matches!(error, FlowError::Transport(_)));

    Ok(())
}

#[tokio::test]
async fn endpoint_errors_are_not_retried() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EXECUTOR_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let mut executor = executor_for(&server).with_retry(RetryPolicy::new(3));

    let error = executor
        .start()
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;

    assert!(matches!(error, FlowError::Endpoint { .. }));

    Ok(())
}
