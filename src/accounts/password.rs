use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Verification against a nullable stored hash. Accounts created without a
/// local password can never match.
pub fn verify_stored(plain: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(hash) => verify_password(plain, hash).unwrap_or(false),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_stored_rejects_missing_hash() {
        assert!(!verify_stored("anything", None));
    }

    #[test]
    fn verify_stored_rejects_malformed_hash() {
        assert!(!verify_stored("anything", Some("not-a-valid-hash")));
    }

    #[test]
    fn verify_stored_accepts_correct_password() {
        let hash = hash_password("secret1").expect("hashing should succeed");
        assert!(verify_stored("secret1", Some(&hash)));
        assert!(!verify_stored("secret2", Some(&hash)));
    }
}
