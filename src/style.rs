//! Incremental stylesheet maintenance.

pub(crate) mod cache;
