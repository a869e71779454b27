//! Server-side sessions referenced by an opaque cookie.

pub mod cookie;
pub mod extractors;
pub mod store;

pub use extractors::{MaybeSession, SessionUser};
pub use store::SessionStore;
