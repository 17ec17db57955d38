use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::engine::Engine;
use crate::foundation::error::BridgeResult;

/// Shared cancellation flag, checked before a completed task resumes the engine.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every holder of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once [`Self::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Request handed to a [`Fetcher`].
///
/// Mirrors the optional JSON request options the engine may pass with a fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FetchRequest {
    /// Target URL.
    #[serde(skip)]
    pub url: String,
    /// HTTP method; `None` means GET.
    pub method: Option<String>,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Request body.
    pub body: Option<String>,
}

impl FetchRequest {
    /// Plain GET of `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Request for `url` with options parsed from a JSON object.
    pub fn with_options_json(url: impl Into<String>, options: &str) -> BridgeResult<Self> {
        let mut req: Self = serde_json::from_str(options)?;
        req.url = url.into();
        Ok(req)
    }
}

/// Response of a completed fetch. Serialized as `{code, text, type, body}` when handed to the
/// engine.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FetchResponse {
    /// Status code.
    pub code: u16,
    /// Status text.
    pub text: String,
    /// Response type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Body text.
    pub body: String,
}

impl FetchResponse {
    /// `200 OK` with `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            code: 200,
            text: "OK".to_string(),
            kind: "basic".to_string(),
            body: body.into(),
        }
    }
}

/// One-shot completion handle of a submitted fetch. May be resolved from any thread.
#[derive(Debug)]
pub struct Completion {
    callback: u32,
    token: CancelToken,
    tx: Sender<Completed>,
}

impl Completion {
    /// Deliver the outcome. A dropped queue is ignored.
    pub fn resolve(self, result: Result<FetchResponse, String>) {
        let _ = self.tx.send(Completed {
            callback: self.callback,
            token: self.token,
            result,
        });
    }
}

#[derive(Debug)]
struct Completed {
    callback: u32,
    token: CancelToken,
    result: Result<FetchResponse, String>,
}

/// Network collaborator used for engine fetches.
pub trait Fetcher {
    /// Start `request`. The outcome must eventually be passed to `done`, possibly from
    /// another thread and possibly after several frames.
    fn fetch(&mut self, request: FetchRequest, done: Completion);
}

/// In-memory [`Fetcher`] answering from a fixed URL table. Unknown URLs fail.
#[derive(Clone, Debug, Default)]
pub struct StaticFetcher {
    routes: BTreeMap<String, FetchResponse>,
    requests: Vec<FetchRequest>,
}

impl StaticFetcher {
    /// Answer `url` with `response`.
    pub fn with_route(mut self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.routes.insert(url.into(), response);
        self
    }

    /// Requests seen so far.
    pub fn requests(&self) -> &[FetchRequest] {
        &self.requests
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&mut self, request: FetchRequest, done: Completion) {
        let result = self
            .routes
            .get(&request.url)
            .cloned()
            .ok_or_else(|| format!("no route for '{}'", request.url));
        self.requests.push(request);
        done.resolve(result);
    }
}

/// What a timer does when it fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Button callback with the id.
    Timeout { callback: u32 },
    /// Context button callback with the id.
    CtxTimeout { callback: u32 },
    /// Recurring interval tick with its name.
    Interval { name: String, period_ms: u64 },
}

#[derive(Clone, Debug)]
struct Timer {
    due_ms: u64,
    seq: u64,
    kind: TimerKind,
    token: CancelToken,
}

/// Counters of one [`TaskQueue::pump`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PumpStats {
    /// Fetch completions that resumed the engine.
    pub resumed: usize,
    /// Fetch failures reported through the failure entry point.
    pub failed: usize,
    /// Timers and interval ticks fired.
    pub fired: usize,
    /// Completions or timers dropped because they were cancelled.
    pub cancelled: usize,
}

/// Outstanding asynchronous work on behalf of the engine: fetches, timeouts and route-scoped
/// intervals. Time is the frame clock passed to [`Self::pump`].
#[derive(Debug)]
pub struct TaskQueue {
    tx: Sender<Completed>,
    rx: Receiver<Completed>,
    in_flight: usize,
    timers: Vec<Timer>,
    intervals: BTreeMap<String, Vec<CancelToken>>,
    next_seq: u64,
}

impl Default for TaskQueue {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            in_flight: 0,
            timers: Vec::new(),
            intervals: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl TaskQueue {
    /// Submit a fetch whose result resumes engine task `callback`.
    ///
    /// Navigation does not cancel fetches; the returned token is the only way to drop the result.
    pub fn submit_fetch(
        &mut self,
        fetcher: &mut dyn Fetcher,
        callback: u32,
        request: FetchRequest,
    ) -> CancelToken {
        let token = CancelToken::new();
        self.in_flight += 1;
        tracing::debug!(callback, url = %request.url, "fetch submitted");
        fetcher.fetch(
            request,
            Completion {
                callback,
                token: token.clone(),
                tx: self.tx.clone(),
            },
        );
        token
    }

    /// Schedule a one-shot timer `delay_ms` after `now_ms`.
    pub fn set_timeout(&mut self, now_ms: u64, delay_ms: u64, kind: TimerKind) -> CancelToken {
        let token = CancelToken::new();
        self.push_timer(now_ms.saturating_add(delay_ms), kind, token.clone());
        token
    }

    /// Start a recurring interval owned by `route`.
    pub fn set_interval(
        &mut self,
        now_ms: u64,
        route: &str,
        name: impl Into<String>,
        period_ms: u64,
    ) -> CancelToken {
        let period_ms = period_ms.max(1);
        let token = CancelToken::new();
        self.push_timer(
            now_ms.saturating_add(period_ms),
            TimerKind::Interval {
                name: name.into(),
                period_ms,
            },
            token.clone(),
        );
        self.intervals
            .entry(route.to_string())
            .or_default()
            .push(token.clone());
        token
    }

    /// Cancel every interval owned by `route`. Returns how many were cancelled.
    pub fn cancel_route(&mut self, route: &str) -> usize {
        let tokens = self.intervals.remove(route).unwrap_or_default();
        for t in &tokens {
            t.cancel();
        }
        if !tokens.is_empty() {
            tracing::debug!(route, count = tokens.len(), "route intervals cancelled");
        }
        tokens.len()
    }

    /// Fetches submitted and not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Timers (one-shot and recurring) still scheduled, cancelled ones included until pumped.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Deliver finished fetches and fire due timers.
    pub fn pump(&mut self, engine: &mut dyn Engine, now_ms: u64) -> BridgeResult<PumpStats> {
        let mut stats = PumpStats::default();
        self.drain_completions(engine, &mut stats)?;
        self.fire_timers(engine, now_ms, &mut stats);
        Ok(stats)
    }

    fn drain_completions(
        &mut self,
        engine: &mut dyn Engine,
        stats: &mut PumpStats,
    ) -> BridgeResult<()> {
        loop {
            let done = match self.rx.try_recv() {
                Ok(done) => done,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(()),
            };
            self.in_flight = self.in_flight.saturating_sub(1);
            if done.token.is_cancelled() {
                tracing::debug!(callback = done.callback, "fetch result dropped after cancel");
                stats.cancelled += 1;
                continue;
            }
            match done.result {
                Ok(response) => {
                    let payload = serde_json::to_string(&response)?;
                    let ptr = engine.alloc_string(payload.as_bytes());
                    engine.resume_callback(done.callback, ptr);
                    stats.resumed += 1;
                }
                Err(reason) => {
                    tracing::warn!(callback = done.callback, %reason, "fetch failed");
                    let ptr = engine.alloc_string(reason.as_bytes());
                    engine.resume_failed(done.callback, ptr);
                    stats.failed += 1;
                }
            }
        }
    }

    fn fire_timers(&mut self, engine: &mut dyn Engine, now_ms: u64, stats: &mut PumpStats) {
        let (mut due, rest): (Vec<Timer>, Vec<Timer>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.due_ms <= now_ms || t.token.is_cancelled());
        self.timers = rest;
        due.sort_by_key(|t| (t.due_ms, t.seq));

        for timer in due {
            if timer.token.is_cancelled() {
                stats.cancelled += 1;
                continue;
            }
            stats.fired += 1;
            match &timer.kind {
                TimerKind::Timeout { callback } => engine.button_callback(*callback),
                TimerKind::CtxTimeout { callback } => engine.ctx_button_callback(*callback),
                TimerKind::Interval { name, period_ms } => {
                    let ptr = engine.alloc_string(name.as_bytes());
                    engine.timeout_ctx_callback(ptr);
                    // One tick per pump; a late frame does not replay missed ticks.
                    let next = now_ms.saturating_add(*period_ms);
                    self.push_timer(next, timer.kind.clone(), timer.token.clone());
                }
            }
        }
    }

    fn push_timer(&mut self, due_ms: u64, kind: TimerKind, token: CancelToken) {
        self.next_seq += 1;
        self.timers.push(Timer {
            due_ms,
            seq: self.next_seq,
            kind,
            token,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/tasks.rs"]
mod tests;
