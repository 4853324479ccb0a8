//! Document stores for Lakshya.
//!
//! Two [`DocumentStore`](lakshya_interface::DocumentStore) backends:
//!
//! - [`InMemoryDocumentStore`] keeps every collection in process memory
//! - [`FileDocumentStore`] keeps one JSON file per document on disk
//!
//! Both validate paths the same way and order query results by document id.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;
mod select;

pub use filesystem::FileDocumentStore;
pub use memory::InMemoryDocumentStore;
pub use select::validate_segment;
