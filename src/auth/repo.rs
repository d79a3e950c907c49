use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username or email already taken")]
    Duplicate,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Storage seam for user records. Callers pass identifiers already
/// lowercased; rows are stored lowercase so matching stays exact.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by username or email in one shot.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert a new user. A username or email collision surfaces as
    /// [`StoreError::Duplicate`].
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Persist the mutable fields of an existing user.
    async fn update(&self, user: &User) -> Result<User, StoreError>;
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
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, username, email, password_hash, recent_score, created_at, updated_at
            FROM users
            WHERE username = $1 OR email = $1
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, username, email, password_hash, recent_score, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, username, email, password_hash, recent_score, created_at, updated_at
            "#,
        )
        .bind(&new_user.full_name)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Database(e),
        })?;
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = $2, password_hash = $3, recent_score = $4, updated_at = now()
            WHERE id = $1
            RETURNING id, full_name, username, email, password_hash, recent_score, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(&user.recent_score)
        .fetch_one(&self.db)
        .await?;
        Ok(updated)
    }
}

/// In-memory store for tests. Uniqueness is checked under one lock so
/// concurrent inserts race the same way the database constraint does.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryUserStore {
    users: std::sync::Mutex<Vec<User>>,
}

#[cfg(test)]
#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        let taken = users
            .iter()
            .any(|u| u.username == new_user.username || u.email == new_user.email);
        if taken {
            return Err(StoreError::Duplicate);
        }
        let now = time::OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            recent_score: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        slot.full_name = user.full_name.clone();
        slot.password_hash = user.password_hash.clone();
        slot.recent_score = user.recent_score.clone();
        slot.updated_at = time::OffsetDateTime::now_utc();
        Ok(slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(username: &str, email: &str) -> NewUser {
        NewUser {
            full_name: "Sample User".into(),
            username: username.into(),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
        }
    }

    #[tokio::test]
    async fn memory_store_finds_by_username_or_email() {
        let store = MemoryUserStore::default();
        store.insert(sample("bo", "bo@x.com")).await.expect("insert");

        let by_name = store.find_by_identifier("bo").await.expect("query");
        let by_mail = store.find_by_identifier("bo@x.com").await.expect("query");
        let missing = store.find_by_identifier("nobody").await.expect("query");

        assert_eq!(by_name.unwrap().email, "bo@x.com");
        assert_eq!(by_mail.unwrap().username, "bo");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicate_username_and_email() {
        let store = MemoryUserStore::default();
        store.insert(sample("bo", "bo@x.com")).await.expect("insert");

        let same_name = store.insert(sample("bo", "other@x.com")).await;
        let same_mail = store.insert(sample("other", "bo@x.com")).await;

        assert!(matches!(same_name, Err(StoreError::Duplicate)));
        assert!(matches!(same_mail, Err(StoreError::Duplicate)));
    }

    #[tokio::test]
    async fn memory_store_update_persists_mutable_fields() {
        let store = MemoryUserStore::default();
        let mut user = store.insert(sample("bo", "bo@x.com")).await.expect("insert");

        user.recent_score = Some("40%".into());
        user.password_hash = "$argon2id$new".into();
        store.update(&user).await.expect("update");

        let reloaded = store.find_by_id(user.id).await.expect("query").unwrap();
        assert_eq!(reloaded.recent_score.as_deref(), Some("40%"));
        assert_eq!(reloaded.password_hash, "$argon2id$new");
    }
}
