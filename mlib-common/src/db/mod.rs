//! Database access: schema initialization and one DAO per entity
//!
//! DAOs borrow a `SqliteConnection` for their lifetime. Callers normally hand
//! them `&mut *tx` from `pool.begin()`, commit when done, and let an early
//! return drop the transaction, which rolls it back.

pub mod albums;
pub mod artists;
pub mod dao;
pub mod error;
pub mod init;
pub mod sessions;
pub mod songs;
pub mod users;

pub use albums::Albums;
pub use artists::Artists;
pub use dao::Dao;
pub use error::{DaoError, DaoResult};
pub use init::*;
pub use sessions::Sessions;
pub use songs::Songs;
pub use users::Users;

/// Case-folded form of a searchable column.
///
/// SQLite's `lower()` and `LIKE` only fold ASCII, so search columns are folded
/// here and stored next to the original text.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Build a `LIKE` pattern matching `fragment` anywhere in the column.
///
/// The fragment is case-folded like the stored column. `%`, `_` and `\` in it
/// are escaped; pair with `ESCAPE '\'`.
pub(crate) fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fold_case(fragment).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
