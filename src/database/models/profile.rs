use serde::{Deserialize, Serialize};
use sqlx::{query_builder::Separated, FromRow, Postgres};
use uuid::Uuid;

use super::TableRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub is_blocked: bool,
}

impl ProfileRow {
    /// Fresh profile: active and unblocked
    pub fn new(
        id: Uuid,
        email: impl Into<String>,
        full_name: Option<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            full_name,
            role: role.into(),
            is_active: true,
            is_blocked: false,
        }
    }
}

impl TableRow for ProfileRow {
    const COLUMNS: &'static [&'static str] =
        &["id", "email", "full_name", "role", "is_active", "is_blocked"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn bind_values(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.id)
            .push_bind(self.email.clone())
            .push_bind(self.full_name.clone())
            .push_bind(self.role.clone())
            .push_bind(self.is_active)
            .push_bind(self.is_blocked);
    }
}
