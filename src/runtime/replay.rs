use crate::dom::LiveTree;
use crate::dom::virtual_dom::{NodeSnapshot, VirtualDom};
use crate::engine::fixture::{SimApp, SimStep};
use crate::engine::sim::SimEngine;
use crate::foundation::error::BridgeResult;
use crate::foundation::opts::BridgeOpts;
use crate::runtime::bridge::{Bridge, FrameOutcome};

/// Frame period of the replay clock, in milliseconds.
pub const FRAME_MS: u64 = 16;

/// Drives a [`Bridge`] over a [`SimApp`] with a fixed frame clock and runs its script.
pub struct Replay {
    bridge: Bridge<SimEngine, VirtualDom>,
    script: Vec<SimStep>,
    clock_ms: u64,
    frames: u64,
}

/// End state of a replay.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ReplaySummary {
    /// Frames run.
    pub frames: u64,
    /// Location path.
    pub path: String,
    /// Engine route id.
    pub route: String,
    /// Registered live nodes.
    pub registered: usize,
    /// Stylesheet rules.
    pub rules: usize,
    /// Whether the loop halted.
    pub halted: bool,
    /// Connected tree under the root.
    pub tree: Vec<NodeSnapshot>,
}

impl Replay {
    /// Validate `app` and start a bridge over it.
    pub fn new(app: SimApp, opts: BridgeOpts) -> BridgeResult<Self> {
        app.validate()?;
        let script = app.script.clone();
        let mut dom = VirtualDom::new();
        if !app.initial_route.is_empty() && app.initial_route != opts.root_route {
            dom.push_history(&app.initial_route);
        }
        let bridge = Bridge::init(SimEngine::new(app), dom, opts)?;
        Ok(Self {
            bridge,
            script,
            clock_ms: 0,
            frames: 0,
        })
    }

    pub fn bridge(&self) -> &Bridge<SimEngine, VirtualDom> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut Bridge<SimEngine, VirtualDom> {
        &mut self.bridge
    }

    /// Advance the clock one frame period and run a frame.
    pub fn frame(&mut self) -> FrameOutcome {
        self.clock_ms += FRAME_MS;
        self.frames += 1;
        self.bridge.frame(self.clock_ms)
    }

    /// Run `n` frames, stopping early once the loop halts.
    pub fn run_frames(&mut self, n: u64) -> FrameOutcome {
        let mut last = FrameOutcome::Idle;
        for _ in 0..n {
            last = self.frame();
            if last == FrameOutcome::Halted {
                break;
            }
        }
        last
    }

    /// Apply one scripted step.
    pub fn step(&mut self, step: &SimStep) -> BridgeResult<()> {
        match step {
            SimStep::Frame => {
                self.frame();
            }
            SimStep::Click(id) => {
                self.bridge.click(id)?;
            }
            SimStep::Input { id, value } => {
                self.bridge.input(id, value)?;
            }
            SimStep::Navigate(path) => self.bridge.navigate(path)?,
            SimStep::SetText { id, text } => self.bridge.engine_mut().set_text(id, text)?,
            SimStep::SetCss { id, css } => self.bridge.engine_mut().set_css(id, css)?,
            SimStep::Remove(id) => {
                self.bridge.engine_mut().remove_node(id)?;
            }
        }
        Ok(())
    }

    /// Apply the fixture's script in order.
    #[tracing::instrument(skip_all)]
    pub fn run_script(&mut self) -> BridgeResult<()> {
        let script = std::mem::take(&mut self.script);
        for step in &script {
            self.step(step)?;
        }
        Ok(())
    }

    /// Current end state.
    pub fn summary(&self) -> ReplaySummary {
        let dom = self.bridge.dom();
        ReplaySummary {
            frames: self.frames,
            path: self.bridge.current_path().to_string(),
            route: self.bridge.engine().route().to_string(),
            registered: self.bridge.reconciler().registry().len(),
            rules: dom.rules().len(),
            halted: self.bridge.is_halted(),
            tree: dom.snapshot(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/replay.rs"]
mod tests;
