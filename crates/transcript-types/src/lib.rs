//! Core data model for the transcript observability core: the line-level
//! input to an adapter ([`RawEntry`]/[`RawLine`]) and the adapter-independent
//! normalized output ([`ParsedEvent`]/[`EventType`]).

pub mod error;
pub mod event;
pub mod raw;
pub mod text;

pub use error::{Error, Result};
pub use event::{EventType, ParsedEvent, ToolSuccess};
pub use raw::{RawEntry, RawLine};
