//! Structured path codec.
//!
//! Converts between slash-separated, bracket-annotated path strings
//! (`/interfaces/interface[name=eth0]/state`) and [`StructuredPath`], and
//! flattens structured paths back into display strings while collecting
//! their key annotations as tags.

pub mod codec;
pub mod types;

pub use codec::{field_name, flatten, flatten_with_prefix, parse};
pub use types::{PathElement, StructuredPath};
