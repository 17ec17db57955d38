//! Frame-driven runtime: the render loop, event dispatch, navigation and the asynchronous work
//! the engine starts (fetches, timers, intervals).

pub(crate) mod bridge;
pub(crate) mod replay;
pub(crate) mod tasks;
