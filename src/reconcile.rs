//! Incremental reconciliation of the engine render tree into a [`crate::LiveTree`].
//!
//! A pass walks the engine tree against the live tree, driven by each node's dirty flag and
//! whether a live element with the node's identifier already exists. The identifiers visited
//! during the pass form the survivor set of the garbage-collection pass that follows.

pub(crate) mod deferred;
pub(crate) mod elements;
pub(crate) mod handlers;
pub(crate) mod lifecycle;
pub(crate) mod registry;
pub(crate) mod walker;
