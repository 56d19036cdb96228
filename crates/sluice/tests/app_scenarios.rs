//! End-to-end behavior of built applications, driven in memory.

use serde_json::json;
use sluice::prelude::*;
use sluice_test::{TestClient, TestError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Trace = Arc<Mutex<Vec<String>>>;

fn record(trace: &Trace, label: &'static str) -> PlugSpec {
    let trace = Arc::clone(trace);
    PlugSpec::operation(move |conn: Conn| {
        trace.lock().unwrap().push(label.to_string());
        Ok(conn)
    })
}

struct Recorder {
    name: &'static str,
    trace: Trace,
}

impl Middleware for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            self.trace.lock().unwrap().push(format!("{} in", self.name));
            let response = next.run(request).await;
            self.trace.lock().unwrap().push(format!("{} out", self.name));
            response
        })
    }
}

#[tokio::test]
async fn status_and_body_render() {
    let app = PipelineBuilder::new()
        .plug("status", PlugSpec::operation(|conn: Conn| Ok(conn.set_status(200))))
        .plug("body", PlugSpec::operation(|conn: Conn| Ok(conn.set_response_body("foo"))))
        .build()
        .unwrap();

    let response = TestClient::new(app).get("/").send().await.unwrap();
    response.assert_status(200).assert_body_eq("foo");
    assert!(response.headers().is_empty());
}

#[tokio::test]
async fn halted_conn_still_renders() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let app = PipelineBuilder::new()
        .plug("status", PlugSpec::operation(|conn: Conn| Ok(conn.set_status(200))))
        .plug("body", PlugSpec::operation(|conn: Conn| Ok(conn.set_response_body("foo"))))
        .plug("halt", PlugSpec::operation(|conn: Conn| Ok(conn.halt())))
        .plug(
            "late",
            PlugSpec::operation(move |conn: Conn| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(conn.set_response_body("bar"))
            }),
        )
        .build()
        .unwrap();

    TestClient::new(app)
        .get("/")
        .send()
        .await
        .unwrap()
        .assert_status(200)
        .assert_body_eq("foo");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn owner_method_and_container_key() {
    let owner = MethodTable::new()
        .method("hello", |conn: Conn| Ok(conn.set_response_body("Hello, world!")));
    let registry = Registry::new().register_operation(
        "plug.text",
        Operation::infallible(|conn: Conn| ext::content_type(conn, "text/plain")),
    );

    let app = PipelineBuilder::new()
        .owner(owner)
        .container(registry)
        .plug_method("hello")
        .plug("text", PlugSpec::key("plug.text"))
        .build()
        .unwrap();

    TestClient::new(app)
        .get("/")
        .send()
        .await
        .unwrap()
        .assert_header("content-type", "text/plain")
        .assert_body_eq("Hello, world!");
}

#[tokio::test]
async fn composed_app_runs_in_place() {
    let trace = Trace::default();
    let p1 = PipelineBuilder::new()
        .plug("p1_a", record(&trace, "p1_a"))
        .plug("p1_b", record(&trace, "p1_b"))
        .build()
        .unwrap();

    let p2 = PipelineBuilder::new()
        .plug("before", record(&trace, "before"))
        .compose("p1", &p1)
        .plug("after", record(&trace, "after"))
        .build()
        .unwrap();

    assert_eq!(p2.plug_names(), ["before", "p1_a", "p1_b", "after"]);
    TestClient::new(p2).get("/").send().await.unwrap().assert_status(200);
    assert_eq!(*trace.lock().unwrap(), ["before", "p1_a", "p1_b", "after"]);
}

#[tokio::test]
async fn injection_replaces_only_the_named_plug() {
    let builder = PipelineBuilder::new()
        .plug("status", PlugSpec::operation(|conn: Conn| Ok(conn.set_status(201))))
        .plug("greet", PlugSpec::operation(|conn: Conn| Ok(conn.set_response_body("A"))));

    let injected = builder
        .build_with(
            &Injections::new()
                .plug("greet", PlugSpec::operation(|conn: Conn| Ok(conn.set_response_body("B"))))
                .plug("unknown", PlugSpec::operation(|conn: Conn| Ok(conn.halt()))),
        )
        .unwrap();

    TestClient::new(builder.build().unwrap())
        .get("/")
        .send()
        .await
        .unwrap()
        .assert_status(201)
        .assert_body_eq("A");
    TestClient::new(injected)
        .get("/")
        .send()
        .await
        .unwrap()
        .assert_status(201)
        .assert_body_eq("B");
}

#[tokio::test]
async fn middleware_wraps_the_pipeline() {
    let trace = Trace::default();
    let app = PipelineBuilder::new()
        .middleware(
            "outer",
            MiddlewareSpec::middleware(Recorder { name: "outer", trace: Arc::clone(&trace) }),
        )
        .middleware(
            "inner",
            MiddlewareSpec::middleware(Recorder { name: "inner", trace: Arc::clone(&trace) }),
        )
        .plug("app", record(&trace, "pipeline"))
        .build()
        .unwrap();

    assert_eq!(app.middleware_names(), ["outer", "inner"]);
    TestClient::new(app).get("/").send().await.unwrap();
    assert_eq!(
        *trace.lock().unwrap(),
        ["outer in", "inner in", "pipeline", "inner out", "outer out"]
    );
}

#[tokio::test]
async fn middleware_injection_and_nested_middleware() {
    let trace = Trace::default();
    let nested = PipelineBuilder::new()
        .middleware(
            "nested",
            MiddlewareSpec::middleware(Recorder { name: "nested", trace: Arc::clone(&trace) }),
        )
        .build()
        .unwrap();

    let app = PipelineBuilder::new()
        .middleware(
            "outer",
            MiddlewareSpec::middleware(Recorder { name: "outer", trace: Arc::clone(&trace) }),
        )
        .compose("sub", &nested)
        .build_with(&Injections::new().middleware(
            "outer",
            MiddlewareSpec::middleware(Recorder { name: "replaced", trace: Arc::clone(&trace) }),
        ))
        .unwrap();

    assert_eq!(app.middleware_names(), ["outer", "nested"]);
    TestClient::new(app).get("/").send().await.unwrap();
    assert_eq!(
        *trace.lock().unwrap(),
        ["replaced in", "nested in", "nested out", "replaced out"]
    );
}

#[test]
fn unresolvable_plug_fails_at_build() {
    let err = PipelineBuilder::new()
        .plug("hello", PlugSpec::key("plug.hello"))
        .build()
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidPlug { ref name, .. } if name == "hello"));
}

#[tokio::test]
async fn invalid_result_escapes_call_and_becomes_500_in_respond() {
    let app = PipelineBuilder::new()
        .plug(
            "broken",
            PlugSpec::operation(|_conn: Conn| Err(PipelineError::invalid_result(42))),
        )
        .plug("after", PlugSpec::operation(|conn: Conn| Ok(conn.set_status(200))))
        .build()
        .unwrap();

    let err = TestClient::new(app.clone()).get("/").send().await.unwrap_err();
    assert!(matches!(
        err,
        TestError::Pipeline(PipelineError::InvalidOperationResult { ref plug, ref returned })
            if plug == "broken" && returned == "42"
    ));

    let request = sluice_test::TestRequest::get("/").build().unwrap().into_http_request();
    let response = sluice_test::TestResponse::from_http(app.respond(request).await)
        .await
        .unwrap();
    response
        .assert_status(500)
        .assert_header("content-type", "application/json");
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["error"]["code"], "INVALID_OPERATION_RESULT");
}

#[tokio::test]
async fn fetch_without_default_is_an_error() {
    let app = PipelineBuilder::new()
        .plug(
            "lookup",
            PlugSpec::operation(|conn: Conn| {
                let user = conn.fetch::<String>("user")?.clone();
                Ok(conn.set_response_body(user))
            }),
        )
        .build()
        .unwrap();

    let err = TestClient::new(app).get("/").send().await.unwrap_err();
    assert!(matches!(
        err,
        TestError::Pipeline(PipelineError::KeyNotFound { ref key }) if key == "user"
    ));
}

#[tokio::test]
async fn params_merge_query_and_form() {
    let app = PipelineBuilder::new()
        .plug(
            "echo",
            PlugSpec::operation(|conn: Conn| {
                let params = conn.params()?;
                ext::json(conn, &params)
            }),
        )
        .build()
        .unwrap();

    let response = TestClient::new(app)
        .post("/search")
        .query("q", "rust")
        .query("page", "1")
        .form(&[("page", "2"), ("size", "10")])
        .send()
        .await
        .unwrap();

    response.assert_json_eq(&json!({"q": "rust", "page": "2", "size": "10"}));
}

#[tokio::test]
async fn request_id_and_boundary_defaults() {
    let config = BoundaryConfig {
        default_status: 204,
        script_name: "/api".to_string(),
        default_content_type: Some("text/plain".to_string()),
        ..BoundaryConfig::default()
    };

    let app = PipelineBuilder::new()
        .boundary(config)
        .middleware("request_id", MiddlewareSpec::middleware(RequestIdMiddleware::new()))
        .plug(
            "path",
            PlugSpec::operation(|conn: Conn| {
                let path = conn.path_info().to_string();
                Ok(conn.put("path", path))
            }),
        )
        .plug(
            "check",
            PlugSpec::operation(|conn: Conn| {
                let path = conn.fetch::<String>("path")?.clone();
                if path == "/users" {
                    Ok(conn)
                } else {
                    Ok(ext::not_found(conn))
                }
            }),
        )
        .build()
        .unwrap();

    let client = TestClient::new(app);

    let response = client.get("/api/users").send().await.unwrap();
    response
        .assert_status(204)
        .assert_header("content-type", "text/plain");
    assert!(response.header("x-request-id").is_some());

    client
        .get("/api/other")
        .send()
        .await
        .unwrap()
        .assert_status(404)
        .assert_body_eq("Not Found");
}

#[tokio::test]
async fn session_writes_reach_the_middleware() {
    let session = Session::new();
    let app = PipelineBuilder::new()
        .plug(
            "login",
            PlugSpec::operation(|conn: Conn| {
                let conn = ext::add_session(conn, "user_id", json!(7))?;
                Ok(ext::redirect(conn, "/home", 303))
            }),
        )
        .build()
        .unwrap();

    TestClient::new(app)
        .post("/login")
        .extension(session.clone())
        .send()
        .await
        .unwrap()
        .assert_status(303)
        .assert_header("location", "/home");
    assert_eq!(session.get("user_id"), Some(json!(7)));
}

#[tokio::test]
async fn session_without_middleware_fails() {
    let app = PipelineBuilder::new()
        .plug(
            "read",
            PlugSpec::operation(|conn: Conn| {
                ext::fetch_session(&conn, "user_id")?;
                Ok(conn)
            }),
        )
        .build()
        .unwrap();

    let err = TestClient::new(app).get("/").send().await.unwrap_err();
    assert!(matches!(err, TestError::Pipeline(PipelineError::MissingMiddleware { .. })));
}
