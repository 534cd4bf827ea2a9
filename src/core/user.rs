//! User business logic and the capability-role value object.
//!
//! The core never derives permissions from ambient session state. The web
//! layer authenticates, resolves a [`Role`], and passes an [`Actor`] into the
//! operations that branch on capability (currently event visibility).

use crate::{
    entities::{Role, User, user},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{Set, prelude::*};

/// A pre-validated caller identity, as seen by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Capability role the web layer resolved for this caller
    pub role: Role,
}

impl Actor {
    /// Wraps a role resolved by the calling layer.
    #[must_use]
    pub const fn new(role: Role) -> Self {
        Self { role }
    }

    /// Shorthand for an administrative caller.
    #[must_use]
    pub const fn admin() -> Self {
        Self { role: Role::Admin }
    }

    /// Whether this actor can see events that are not publicly visible.
    #[must_use]
    pub const fn sees_private_events(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Creates a new user with a zero credit balance.
pub async fn create_user(
    db: &DatabaseConnection,
    display_name: String,
    role: Role,
) -> Result<user::Model> {
    let model = user::ActiveModel {
        display_name: Set(display_name.trim().to_string()),
        role: Set(role),
        credit_balance: Set(Decimal::ZERO),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Finds a user by its unique ID, returning None if absent.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by ID, failing with [`Error::UserNotFound`] if absent.
///
/// Generic over the connection so it can run inside a caller's transaction.
pub async fn require_user<C>(conn: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_user_zero_balance() -> Result<()> {
        let db = setup_test_db().await?;

        let user = create_user(&db, "Alice".to_string(), Role::User).await?;
        assert_eq!(user.display_name, "Alice");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.credit_balance, Decimal::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_trims_name() -> Result<()> {
        let db = setup_test_db().await?;

        let user = create_user(&db, "  Bob  ".to_string(), Role::Organizer).await?;
        assert_eq!(user.display_name, "Bob");

        Ok(())
    }

    #[tokio::test]
    async fn test_require_user_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = require_user(&db, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::UserNotFound { id: 999 }
        ));

        Ok(())
    }

    #[test]
    fn test_actor_visibility() {
        assert!(Actor::admin().sees_private_events());
        assert!(!Actor::new(Role::User).sees_private_events());
        assert!(!Actor::new(Role::Organizer).sees_private_events());
        assert!(!Actor::new(Role::Guest).sees_private_events());
    }
}
