use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::users::dto::User;
use crate::users::repo_types::UserRow;

/// Read access to the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, in whatever order the database returns them.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn get_user_by_id(&self, id: &str) -> Result<User, StoreError>;

    /// Email is not unique; when several rows match the earliest created wins.
    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id::text AS id, first_name, last_name, email, status::text AS status,
                   time_created, time_modified
            FROM users
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn get_user_by_id(&self, id: &str) -> Result<User, StoreError> {
        // No row can carry a non-UUID id, so skip the round-trip.
        let Ok(id) = Uuid::parse_str(id) else {
            debug!(%id, "lookup with non-uuid id");
            return Err(StoreError::NotFound);
        };

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id::text AS id, first_name, last_name, email, status::text AS status,
                   time_created, time_modified
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)?;

        User::try_from(row)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id::text AS id, first_name, last_name, email, status::text AS status,
                   time_created, time_modified
            FROM users
            WHERE email = $1
            ORDER BY time_created, id
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)?;

        User::try_from(row)
    }
}
