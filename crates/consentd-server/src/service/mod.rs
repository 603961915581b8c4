//! The consent pipeline.
//!
//! Three components own the write and read paths:
//! - `TypeResolver`: cache-aside resolution of slugs to type records
//! - `EventWriter`: validated, deduplicated, atomic batch ingestion
//! - `StateReader`: derived current-state reads and the raw audit listing
//!
//! plus `UserService` for the user management surface. All of them are
//! constructed with explicit store/cache trait objects; there is no global
//! registry.

pub mod reader;
pub mod resolver;
pub mod users;
pub mod writer;

pub use reader::StateReader;
pub use resolver::TypeResolver;
pub use users::{UserProfile, UserService};
pub use writer::EventWriter;
