use rand::{distributions::Alphanumeric, Rng};
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::accounts::password::hash_password;

pub const RESET_TOKEN_LEN: usize = 64;

/// User record. `password_hash` is null for accounts without a local
/// password; `reset_token` and `reset_token_expiry` are set together or
/// not at all.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Outcome of checking a presented reset token against the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    Valid,
    Expired,
    Invalid,
}

/// A freshly issued reset token.
#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Classifies a presented token against what the store holds. A token is
/// valid only when one is stored, matches exactly, and its expiry has not
/// passed; an expired exact match reports `Expired`, everything else
/// `Invalid`.
pub(crate) fn check_token(
    stored_token: Option<&str>,
    stored_expiry: Option<OffsetDateTime>,
    presented: &str,
    now: OffsetDateTime,
) -> TokenCheck {
    let (Some(stored), Some(expiry)) = (stored_token, stored_expiry) else {
        return TokenCheck::Invalid;
    };
    if stored != presented {
        return TokenCheck::Invalid;
    }
    if now > expiry {
        return TokenCheck::Expired;
    }
    TokenCheck::Valid
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, reset_token, reset_token_expiry, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user. The raw password is hashed here; callers never
    /// handle hashes.
    pub async fn create(db: &PgPool, email: &str, raw_password: &str) -> anyhow::Result<User> {
        let hash = hash_password(raw_password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, reset_token, reset_token_expiry, created_at
            "#,
        )
        .bind(email)
        .bind(hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn update_password(
        db: &PgPool,
        email: &str,
        raw_password: &str,
    ) -> anyhow::Result<()> {
        let hash = hash_password(raw_password)?;
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(hash)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Issue a reset token with the given validity window, overwriting any
    /// prior token so at most one is live per user.
    pub async fn create_reset_token(
        db: &PgPool,
        email: &str,
        ttl: Duration,
    ) -> anyhow::Result<IssuedToken> {
        let token = generate_reset_token();
        let expires_at = OffsetDateTime::now_utc() + ttl;
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token = $2, reset_token_expiry = $3
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(&token)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(IssuedToken { token, expires_at })
    }

    pub async fn verify_reset_token(
        db: &PgPool,
        email: &str,
        token: &str,
    ) -> anyhow::Result<TokenCheck> {
        let Some(user) = User::find_by_email(db, email).await? else {
            return Ok(TokenCheck::Invalid);
        };
        Ok(check_token(
            user.reset_token.as_deref(),
            user.reset_token_expiry,
            token,
            OffsetDateTime::now_utc(),
        ))
    }

    /// Replace the password and clear the token columns in one statement,
    /// making the token single-use.
    pub async fn reset_password_with_token(
        db: &PgPool,
        email: &str,
        raw_password: &str,
    ) -> anyhow::Result<()> {
        let hash = hash_password(raw_password)?;
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, reset_token = NULL, reset_token_expiry = NULL
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(hash)
        .execute(db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    #[test]
    fn generated_tokens_are_opaque_and_distinct() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), RESET_TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn matching_unexpired_token_is_valid() {
        let expiry = now() + Duration::hours(1);
        assert_eq!(
            check_token(Some("tok"), Some(expiry), "tok", now()),
            TokenCheck::Valid
        );
    }

    #[test]
    fn matching_token_past_expiry_is_expired() {
        let expiry = now() - Duration::minutes(1);
        assert_eq!(
            check_token(Some("tok"), Some(expiry), "tok", now()),
            TokenCheck::Expired
        );
    }

    #[test]
    fn mismatched_token_is_invalid_even_when_expired() {
        // Mismatch wins over expiry: the caller never learns whether some
        // other token exists for the account.
        let expiry = now() - Duration::minutes(1);
        assert_eq!(
            check_token(Some("tok"), Some(expiry), "other", now()),
            TokenCheck::Invalid
        );
    }

    #[test]
    fn absent_token_is_invalid() {
        assert_eq!(check_token(None, None, "tok", now()), TokenCheck::Invalid);
    }

    #[test]
    fn superseded_token_no_longer_matches() {
        // After a second issuance the store holds the new token; the old
        // one now fails the exact-match check.
        let expiry = now() + Duration::hours(1);
        assert_eq!(
            check_token(Some("new-token"), Some(expiry), "old-token", now()),
            TokenCheck::Invalid
        );
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let at = now();
        assert_eq!(check_token(Some("tok"), Some(at), "tok", at), TokenCheck::Valid);
    }
}
