use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Chat preference record; at most one row per user.
#[derive(Debug, Clone, FromRow)]
pub struct UserPreferences {
    pub id: Uuid,
    pub user_id: Uuid,
    pub chat_name: Option<String>,
    pub occupation: Option<String>,
    pub traits: Option<String>,
    pub additional_info: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields accepted on save. All independently optional; an omitted field
/// is written back as null on update (matching the observed behavior of
/// the settings form, which always submits the full field set).
#[derive(Debug, Default)]
pub struct PreferenceFields {
    pub chat_name: Option<String>,
    pub occupation: Option<String>,
    pub traits: Option<String>,
    pub additional_info: Option<String>,
}

impl UserPreferences {
    pub async fn find_by_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> anyhow::Result<Option<UserPreferences>> {
        let prefs = sqlx::query_as::<_, UserPreferences>(
            r#"
            SELECT id, user_id, chat_name, occupation, traits, additional_info,
                   created_at, updated_at
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(prefs)
    }

    /// Create on first save, update in place afterwards. Read-then-write
    /// without a transaction; concurrent saves race last-writer-wins.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        fields: &PreferenceFields,
    ) -> anyhow::Result<()> {
        match Self::find_by_user(db, user_id).await? {
            Some(existing) => {
                sqlx::query(
                    r#"
                    UPDATE user_preferences
                    SET chat_name = $2, occupation = $3, traits = $4,
                        additional_info = $5, updated_at = now()
                    WHERE id = $1
                    "#,
                )
                .bind(existing.id)
                .bind(&fields.chat_name)
                .bind(&fields.occupation)
                .bind(&fields.traits)
                .bind(&fields.additional_info)
                .execute(db)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO user_preferences
                        (user_id, chat_name, occupation, traits, additional_info)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(user_id)
                .bind(&fields.chat_name)
                .bind(&fields.occupation)
                .bind(&fields.traits)
                .bind(&fields.additional_info)
                .execute(db)
                .await?;
            }
        }
        Ok(())
    }
}
