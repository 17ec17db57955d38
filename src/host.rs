//! Calls the engine makes into the host, decoded from engine memory.

pub(crate) mod calls;
