//! Fabric bridge mirrors the render tree of a foreign compute engine onto a live UI tree.
//!
//! The engine (typically a WebAssembly module) owns layout, styling and dirty state and
//! exposes its render tree as binary records in linear memory. The bridge:
//!
//! - reads the record layout once through a [`LayoutDescriptor`]
//! - walks the engine tree each frame and creates, updates or skips live elements based on
//!   each node's dirty flag ([`Reconciler::reconcile_pass`])
//! - collects elements the pass did not visit, honoring exit animations
//! - maintains one stylesheet incrementally ([`StyleRuleCache`])
//! - routes UI events, navigation and asynchronous work back into the engine ([`Bridge`])
//!
//! [`SimEngine`] and [`VirtualDom`] are deterministic in-memory implementations of the two
//! sides, used by the tests and the `fabric-bridge` CLI.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod decode;
pub(crate) mod dom;
pub(crate) mod engine;
pub(crate) mod host;
pub(crate) mod memory;
pub(crate) mod reconcile;
pub(crate) mod runtime;
pub(crate) mod style;

pub use crate::foundation::core::{
    BoundingBox, HookIds, NodePtr, Span, Viewport, canonical_route, pathname_of,
    route_layout_key,
};
pub use crate::foundation::error::{BridgeError, BridgeResult};
pub use crate::foundation::opts::BridgeOpts;

pub use crate::memory::reader::{MemoryView, read_cstr, read_string};

pub use crate::decode::command::{CommandProps, RenderCommand, decode_render_command};
pub use crate::decode::descriptor::{DESCRIPTOR_WORDS, LayoutDescriptor};
pub use crate::decode::element_type::ElementType;
pub use crate::decode::input::{INPUT_RECORD_SIZE, InputKind, InputRecord, decode_input};

pub use crate::dom::virtual_dom::{NodeSnapshot, VirtualDom};
pub use crate::dom::{DomEvent, ElementKind, ElementRef, EventType, LiveTree, StyleSheet};

pub use crate::engine::fixture::{SimApp, SimInput, SimNode, SimStep};
pub use crate::engine::sim::{ButtonArg, EngineCall, SIM_LAYOUT, SimEngine};
pub use crate::engine::{Engine, HookPhase};

pub use crate::style::cache::{StyleRuleCache, StyleTarget};

pub use crate::reconcile::deferred::{DeferredOp, DeferredQueue};
pub use crate::reconcile::elements::{ElementSpec, element_spec};
pub use crate::reconcile::handlers::{
    Behavior, HandlerMap, Listener, inst_listener_key, listener_key,
};
pub use crate::reconcile::lifecycle::GcStats;
pub use crate::reconcile::registry::{ActiveIdentifierSet, LiveNodeRegistry, RegistryEntry};
pub use crate::reconcile::walker::{PassStats, Reconciler, RenderMode};

pub use crate::host::calls::HostCall;
pub use crate::runtime::bridge::{Bridge, FrameOutcome};
pub use crate::runtime::replay::{FRAME_MS, Replay, ReplaySummary};
pub use crate::runtime::tasks::{
    CancelToken, Completion, FetchRequest, FetchResponse, Fetcher, PumpStats, StaticFetcher,
    TaskQueue, TimerKind,
};
