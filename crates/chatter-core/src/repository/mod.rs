//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (chatter-infra) implements with SQLite. `memory` holds the process-local
//! implementation of the same contract; `boxed` erases either one for runtime
//! selection.

pub mod boxed;
pub mod conversation;
pub mod memory;
pub mod user;
