//! Service layer
//!
//! Services own the pool, open one explicit transaction per call, hand
//! `&mut *tx` to the DAOs and commit. Any `?` before the commit drops the
//! transaction, which rolls it back.

mod library;
mod users;

pub use library::LibraryService;
pub use users::UserService;
