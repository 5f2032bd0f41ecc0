//! Bindelta: binary delta (diff/patch) engine in Rust.
//!
//! A delta is an ordered list of COPY (from the base) and LITERAL commands
//! that rebuilds a target buffer from a base buffer. It is computed in
//! three passes:
//! - Coarse block matching with an Adler-32 / SHA-256 block index (`hash`)
//! - Refinement of leftover literals with a suffix array or suffix
//!   automaton over the base (`suffix`)
//! - Merging of adjacent commands into a canonical delta (`delta`)
//!
//! The crate also provides a JSON delta document (`delta::format`),
//! file-oriented helpers (`io`) and an optional CLI (`cli` feature).
//!
//! # Quick Start
//!
//! ```
//! use bindelta::{apply_delta, calculate_delta};
//!
//! let base = b"hello old world, hello old friend";
//! let target = b"hello new world, hello old friend";
//!
//! let delta = calculate_delta(base, target);
//! let rebuilt = apply_delta(base, &delta).unwrap();
//! assert_eq!(rebuilt, target);
//! ```

pub mod delta;
pub mod engine;
pub mod hash;
pub mod io;
pub mod suffix;

#[cfg(feature = "cli")]
pub mod cli;

pub use delta::apply::{ApplyError, InvalidReason};
pub use delta::command::{Command, Delta};
pub use delta::format::{DeltaDocument, FormatError};
pub use engine::{
    DeltaStats, apply_delta, calculate_delta, calculate_delta_with_options,
    calculate_delta_with_stats,
};
pub use hash::config::{DeltaConfig, MatchBackend};
