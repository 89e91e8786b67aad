//! The OOXML codec: reader, writer, style index, shared strings, and the
//! preserved-part store.
//!
//! All file and archive I/O in the crate lives under this module. The
//! domain model stays pure; the codec translates it to and from the
//! physical package, preserving byte-for-byte everything it does not
//! model.

pub mod paths;
pub mod preserved;
pub mod reader;
pub mod sst;
pub mod style_index;
pub mod writer;

pub use preserved::{PreservedPartHandle, PreservedPartStore};
pub use reader::{read, read_bytes};
pub use writer::{write, write_with, WriteOptions};
