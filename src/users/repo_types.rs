use sqlx::FromRow;
use time::{format_description::FormatItem, macros::format_description, PrimitiveDateTime};
use uuid::Uuid;

use crate::error::StoreError;
use crate::users::dto::{User, UserStatus};

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Raw `users` row. `id` and `status` arrive as text and are checked in `TryFrom`.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub time_created: PrimitiveDateTime,
    pub time_modified: PrimitiveDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&r.id)
            .map_err(|e| StoreError::mapping(format!("invalid user id {:?}: {e}", r.id)))?;
        let status = r
            .status
            .parse::<UserStatus>()
            .map_err(|e| StoreError::mapping(format!("user {id}: {e}")))?;

        Ok(User {
            id,
            first_name: r.first_name.unwrap_or_default(),
            last_name: r.last_name.unwrap_or_default(),
            email: r.email.unwrap_or_default(),
            status,
            time_created: format_timestamp(r.time_created)?,
            time_modified: format_timestamp(r.time_modified)?,
        })
    }
}

fn format_timestamp(ts: PrimitiveDateTime) -> Result<String, StoreError> {
    ts.format(TIMESTAMP_FORMAT)
        .map_err(|e| StoreError::mapping(format!("timestamp {ts}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn row() -> UserRow {
        UserRow {
            id: "11111111-1111-1111-1111-111111111111".into(),
            first_name: Some("John".into()),
            last_name: Some("Doe".into()),
            email: Some("johndoe@mail.com".into()),
            status: "ACTIVE".into(),
            time_created: datetime!(2023-01-01 12:00:00),
            time_modified: datetime!(2023-01-02 08:30:05),
        }
    }

    #[test]
    fn maps_valid_row() {
        let user = User::try_from(row()).unwrap();
        assert_eq!(user.id.to_string(), "11111111-1111-1111-1111-111111111111");
        assert_eq!(user.first_name, "John");
        assert_eq!(user.last_name, "Doe");
        assert_eq!(user.email, "johndoe@mail.com");
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.time_created, "2023-01-01 12:00:00");
        assert_eq!(user.time_modified, "2023-01-02 08:30:05");
    }

    #[test]
    fn null_names_become_empty() {
        let mut r = row();
        r.first_name = None;
        r.email = None;
        let user = User::try_from(r).unwrap();
        assert_eq!(user.first_name, "");
        assert_eq!(user.email, "");
    }

    #[test]
    fn malformed_id_is_a_mapping_error() {
        let mut r = row();
        r.id = "invalid-uuid".into();
        let err = User::try_from(r).unwrap_err();
        assert!(matches!(err, StoreError::Mapping(ref m) if m.contains("invalid-uuid")));
    }

    #[test]
    fn unknown_status_is_a_mapping_error() {
        let mut r = row();
        r.status = "SUSPENDED".into();
        assert!(matches!(
            User::try_from(r).unwrap_err(),
            StoreError::Mapping(_)
        ));
    }
}
