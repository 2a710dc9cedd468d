//! Client integration tests.
//!
//! These run a real hyper server standing in for the monitoring agent and
//! verify:
//! - method calls and typed replies over HTTP
//! - fault extraction (`"<code> <message>"` formatting)
//! - marshal failures before any network I/O
//! - existence reverification on mutating dataview operations
//! - the idempotent headline upsert sequence
//! - stream-scoped method naming for messages and registration

use std::sync::{Arc, Mutex};
use std::time::Duration;

use gridview_client::{Connection, Dataview, Session, Stream};
use gridview_common::{CallParam, GridviewError, MethodCall, MethodReply, ReplyValue};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpListener;

type Handler = dyn Fn(&MethodCall) -> MethodReply + Send + Sync;

/// Mock monitoring agent: records every method call and answers each one
/// through the supplied handler.
struct MockAgent {
    addr: String,
    calls: Arc<Mutex<Vec<MethodCall>>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockAgent {
    async fn start<F>(handler: F) -> Self
    where
        F: Fn(&MethodCall) -> MethodReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let calls: Arc<Mutex<Vec<MethodCall>>> = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
        let server_calls = Arc::clone(&calls);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        let Ok((stream, _)) = result else { break };
                        let io = TokioIo::new(stream);
                        let handler = Arc::clone(&handler);
                        let calls = Arc::clone(&server_calls);

                        tokio::spawn(async move {
                            let service = service_fn(move |req: Request<Incoming>| {
                                let handler = Arc::clone(&handler);
                                let calls = Arc::clone(&calls);
                                async move {
                                    let body = req.into_body().collect().await.unwrap().to_bytes();
                                    let call: MethodCall = serde_json::from_slice(&body).unwrap();
                                    let reply = handler(&call);
                                    calls.lock().unwrap().push(call);

                                    Ok::<_, hyper::Error>(
                                        Response::builder()
                                            .status(StatusCode::OK)
                                            .header("Content-Type", "application/json")
                                            .body(Full::new(Bytes::from(
                                                serde_json::to_vec(&reply).unwrap(),
                                            )))
                                            .unwrap(),
                                    )
                                }
                            });

                            let _ = http1::Builder::new().serve_connection(io, service).await;
                        });
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Self {
            addr,
            calls,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn recorded_methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.method.clone())
            .collect()
    }
}

impl Drop for MockAgent {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn session(agent: &MockAgent) -> Session {
    let connection = Arc::new(Connection::new(agent.endpoint()).unwrap());
    Session::new(connection, "probe", "cpu")
}

#[tokio::test]
async fn call_returns_typed_string_reply() {
    let agent = MockAgent::start(|call| {
        assert_eq!(call.method, "probe.cpu.getParameter");
        MethodReply::success(ReplyValue::Str("250".into()))
    })
    .await;

    let connection = Connection::new(agent.endpoint()).unwrap();
    let reply = connection
        .call("probe.cpu.getParameter", &[json!("maxRows")])
        .await
        .unwrap();
    assert_eq!(reply, Some(ReplyValue::Str("250".into())));
}

#[tokio::test]
async fn fault_reply_becomes_formatted_error() {
    let agent = MockAgent::start(|_| MethodReply::fault(401, "access denied")).await;

    let connection = Connection::new(agent.endpoint()).unwrap();
    let err = connection.call("probe.cpu.signOff", &[]).await.unwrap_err();
    assert!(matches!(err, GridviewError::Fault { code: 401, .. }));
    assert_eq!(err.to_string(), "401 access denied");
}

#[tokio::test]
async fn marshal_error_issues_zero_requests() {
    let agent = MockAgent::start(|_| MethodReply::empty()).await;

    let connection = Connection::new(agent.endpoint()).unwrap();
    let err = connection
        .call("probe.cpu.signOn", &[json!(1.5)])
        .await
        .unwrap_err();
    assert!(matches!(err, GridviewError::Marshal(_)));
    assert!(agent.recorded_methods().is_empty());
}

#[tokio::test]
async fn update_table_on_gone_view_stops_at_existence_probe() {
    let agent = MockAgent::start(|call| {
        if call.method.ends_with("viewExists") {
            MethodReply::success(ReplyValue::Bool(false))
        } else {
            MethodReply::empty()
        }
    })
    .await;

    let view = Dataview::new(session(&agent), "SYSTEM", "load");
    let err = view
        .update_table(&["Name".into()], &[vec!["x".into()]])
        .await
        .unwrap_err();
    assert!(matches!(err, GridviewError::ViewGone(_)));

    // Only the probe went out; the table update was never issued.
    assert_eq!(agent.recorded_methods(), vec!["probe.cpu.viewExists"]);
}

#[tokio::test]
async fn headline_upsert_creates_then_sets_value() {
    let agent = MockAgent::start(|call| {
        if call.method.ends_with("viewExists") {
            MethodReply::success(ReplyValue::Bool(true))
        } else if call.method.ends_with("getHeadlineNames") {
            MethodReply::success(ReplyValue::StringList(vec!["uptime".into()]))
        } else {
            MethodReply::empty()
        }
    })
    .await;

    let view = Dataview::new(session(&agent), "SYSTEM", "load");
    view.headline("lastSample", Some("12:00:01")).await.unwrap();

    assert_eq!(
        agent.recorded_methods(),
        vec![
            "probe.cpu.viewExists",
            "probe.cpu.SYSTEM-load.getHeadlineNames",
            "probe.cpu.SYSTEM-load.addHeadline",
            "probe.cpu.SYSTEM-load.updateHeadline",
        ]
    );

    // A headline that already exists is not re-created.
    view.headline("uptime", Some("3d")).await.unwrap();
    let methods = agent.recorded_methods();
    assert_eq!(methods[methods.len() - 1], "probe.cpu.SYSTEM-load.updateHeadline");
    assert_eq!(
        methods[methods.len() - 2],
        "probe.cpu.SYSTEM-load.getHeadlineNames"
    );
}

#[tokio::test]
async fn stream_operations_are_stream_scoped() {
    let agent = MockAgent::start(|_| MethodReply::empty()).await;

    let stream = Stream::new(session(&agent), "events");
    stream.write_message("disk filling on /var").await.unwrap();
    stream.sign_on(Duration::from_secs(30)).await.unwrap();
    stream.heartbeat().await.unwrap();
    stream.sign_off().await.unwrap();

    assert_eq!(
        agent.recorded_methods(),
        vec![
            "probe.cpu.events.addMessage",
            "probe.cpu.events.signOn",
            "probe.cpu.events.heartbeat",
            "probe.cpu.events.signOff",
        ]
    );

    let calls = agent.calls.lock().unwrap();
    assert_eq!(
        calls[0].params,
        vec![CallParam::String("disk filling on /var".into())]
    );
    assert_eq!(calls[1].params, vec![CallParam::Int(30)]);
    assert!(calls[2].params.is_empty());
}

#[tokio::test]
async fn exists_probe_swallows_transport_errors() {
    // Nothing is listening here.
    let connection = Arc::new(Connection::new("http://127.0.0.1:1").unwrap());
    let session = Session::new(connection, "probe", "cpu");
    assert!(!session.exists().await);
}

#[tokio::test]
async fn unknown_parameter_maps_to_not_found() {
    let agent = MockAgent::start(|call| {
        if call.method == "_agent.samplerExists" {
            MethodReply::success(ReplyValue::Bool(true))
        } else {
            MethodReply::fault(404, "no such parameter")
        }
    })
    .await;

    let err = session(&agent).parameter("missing").await.unwrap_err();
    assert!(matches!(err, GridviewError::NotFound(_)));
    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
async fn sign_on_zero_interval_travels_as_absent() {
    let agent = MockAgent::start(|call| {
        if call.method.ends_with("signOn") {
            assert!(call.params.is_empty());
        }
        MethodReply::empty()
    })
    .await;

    session(&agent).sign_on(Duration::ZERO).await.unwrap();
    assert_eq!(agent.recorded_methods(), vec!["probe.cpu.signOn"]);
}
