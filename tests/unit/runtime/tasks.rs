use super::*;
use crate::engine::fixture::SimApp;
use crate::engine::sim::{ButtonArg, EngineCall, SimEngine};

fn engine() -> SimEngine {
    SimEngine::new(SimApp::default())
}

#[test]
fn fetch_success_resumes_with_a_json_payload() {
    let mut q = TaskQueue::default();
    let mut engine = engine();
    let mut fetcher = StaticFetcher::default().with_route("/api", FetchResponse::ok("[1,2]"));

    q.submit_fetch(&mut fetcher, 4, FetchRequest::get("/api"));
    assert_eq!(q.in_flight(), 1);
    let stats = q.pump(&mut engine, 0).unwrap();
    assert_eq!(stats.resumed, 1);
    assert_eq!(q.in_flight(), 0);

    let Some(EngineCall::Resume { callback, payload }) = engine.calls().last() else {
        panic!("expected a resume call, got {:?}", engine.calls());
    };
    assert_eq!(*callback, 4);
    let v: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(v["code"], 200);
    assert_eq!(v["type"], "basic");
    assert_eq!(v["body"], "[1,2]");
}

#[test]
fn fetch_failure_resumes_through_the_failure_entry_point() {
    let mut q = TaskQueue::default();
    let mut engine = engine();
    let mut fetcher = StaticFetcher::default();
    q.submit_fetch(&mut fetcher, 9, FetchRequest::get("/missing"));
    let stats = q.pump(&mut engine, 0).unwrap();
    assert_eq!(stats.failed, 1);
    assert!(matches!(
        engine.calls().last(),
        Some(EngineCall::ResumeFailed { callback: 9, error }) if error.contains("/missing")
    ));
}

#[test]
fn cancelled_fetch_never_resumes() {
    let mut q = TaskQueue::default();
    let mut engine = engine();
    let mut fetcher = StaticFetcher::default().with_route("/api", FetchResponse::ok(""));
    let token = q.submit_fetch(&mut fetcher, 1, FetchRequest::get("/api"));
    token.cancel();
    let stats = q.pump(&mut engine, 0).unwrap();
    assert_eq!(stats.cancelled, 1);
    assert!(engine.calls().is_empty());
}

#[test]
fn completion_may_arrive_from_another_thread() {
    struct Threaded;
    impl Fetcher for Threaded {
        fn fetch(&mut self, request: FetchRequest, done: Completion) {
            std::thread::spawn(move || done.resolve(Ok(FetchResponse::ok(request.url))))
                .join()
                .unwrap();
        }
    }

    let mut q = TaskQueue::default();
    let mut engine = engine();
    q.submit_fetch(&mut Threaded, 2, FetchRequest::get("/x"));
    assert_eq!(q.pump(&mut engine, 0).unwrap().resumed, 1);
}

#[test]
fn request_options_parse_from_json() {
    let req = FetchRequest::with_options_json(
        "/api",
        r#"{"method":"POST","headers":{"content-type":"application/json"},"body":"{}"}"#,
    )
    .unwrap();
    assert_eq!(req.url, "/api");
    assert_eq!(req.method.as_deref(), Some("POST"));
    assert_eq!(req.headers["content-type"], "application/json");
    assert!(FetchRequest::with_options_json("/api", "not json").is_err());
}

#[test]
fn timeouts_fire_once_when_due() {
    let mut q = TaskQueue::default();
    let mut engine = engine();
    q.set_timeout(0, 100, TimerKind::Timeout { callback: 3 });
    q.set_timeout(0, 50, TimerKind::CtxTimeout { callback: 4 });

    assert_eq!(q.pump(&mut engine, 40).unwrap().fired, 0);
    assert_eq!(q.pump(&mut engine, 100).unwrap().fired, 2);
    assert_eq!(
        engine.calls(),
        [
            EngineCall::CtxButton(ButtonArg::Raw(4)),
            EngineCall::Button(ButtonArg::Raw(3)),
        ]
    );
    assert_eq!(q.pump(&mut engine, 500).unwrap().fired, 0);
    assert_eq!(q.pending_timers(), 0);
}

#[test]
fn intervals_repeat_until_their_route_is_cancelled() {
    let mut q = TaskQueue::default();
    let mut engine = engine();
    q.set_interval(0, "/dash", "poll", 10);
    q.set_interval(0, "/other", "tick", 10);

    q.pump(&mut engine, 10).unwrap();
    q.pump(&mut engine, 20).unwrap();
    assert_eq!(
        engine
            .calls()
            .iter()
            .filter(|c| **c == EngineCall::TimeoutCtx("poll".to_string()))
            .count(),
        2
    );

    assert_eq!(q.cancel_route("/dash"), 1);
    assert_eq!(q.cancel_route("/dash"), 0);
    engine.take_calls();
    let stats = q.pump(&mut engine, 30).unwrap();
    assert_eq!(stats.fired, 1);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(engine.calls(), [EngineCall::TimeoutCtx("tick".to_string())]);
}
