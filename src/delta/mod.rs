// Delta commands and the passes that operate on command lists.
//
// - `command`: COPY / LITERAL commands and the `Delta` sequence
// - `refine`: split coarse literals around longest base matches
// - `merge`: collapse adjacent mergeable commands
// - `apply`: replay a delta against its base
// - `format`: JSON delta documents

pub mod apply;
pub mod command;
pub mod format;
pub mod merge;
pub mod refine;

pub use apply::{ApplyError, InvalidReason, apply_delta};
pub use command::{Command, Delta};
