//! Document-store interface: one typed `Collection` handle per table,
//! reached through find / count / insert / update / delete primitives plus
//! batch id lookup for reference expansion. Services never issue SQL
//! themselves.

pub mod collection;
pub mod document;
pub mod error;
pub mod models;
pub mod pool;

pub use collection::Collection;
pub use document::Document;
pub use error::StoreError;
