pub mod profile;
pub mod user;

use serde::Serialize;
use sqlx::{query_builder::Separated, Postgres};
use uuid::Uuid;

pub use profile::ProfileRow;
pub use user::UserRow;

/// Row shape shared by the REST and Postgres table backends
pub trait TableRow: Serialize + Send + Sync + 'static {
    /// Column list in the order `bind_values` pushes them
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Uuid;

    fn bind_values(&self, row: &mut Separated<'_, '_, Postgres, &'static str>);
}
