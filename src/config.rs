use serde::Deserialize;

/// Runtime mode. Development logs outgoing mail instead of dispatching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// SMTP relay settings. Absent when SMTP_HOST is not configured, in which
/// case reset mail is logged rather than sent.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub app_url: String,
    pub environment: Environment,
    pub reset_token_ttl_minutes: i64,
    pub session: SessionConfig,
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let app_url =
            std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };
        let reset_token_ttl_minutes = std::env::var("RESET_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);

        let session = SessionConfig {
            secret: std::env::var("SESSION_SECRET")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "boogle".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "boogle-users".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 30),
        };

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
                password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
                from: std::env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "no-reply@localhost".into()),
            }),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            app_url,
            environment,
            reset_token_ttl_minutes,
            session,
            smtp,
        })
    }
}
