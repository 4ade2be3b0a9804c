//! Shared types for the Parinfer engine.
//!
//! The engine crate (`parinfer-core`) and any host driving it (the
//! `parinferc` CLI, editor glue) exchange three kinds of data, all defined
//! here:
//!
//! - [`Options`] and [`Change`]: the caller's input besides the text itself.
//! - [`Answer`]: the result of a transformation run.
//! - [`Error`]: a structured description of why a run failed.
//!
//! All result-side types serialize to the camelCase JSON shape the wider
//! Parinfer ecosystem uses on the wire.

pub mod answer;
pub mod error;
pub mod options;

pub use answer::{Answer, Closer, Paren, TabStop, TrailRange};
pub use error::{Error, ErrorKind};
pub use options::{Change, Options};
