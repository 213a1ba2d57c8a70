use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;

/// A single rejected field. The closed-set status contract only needs to
/// know that validation failed; fields and messages go to the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

pub type Validated<T> = Result<T, Vec<FieldError>>;

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) -> String {
    let email = email.trim().to_string();
    if !is_valid_email(&email) {
        errors.push(FieldError {
            field: "email",
            message: "invalid email address",
        });
    }
    email
}

fn check_password(field: &'static str, password: &str, errors: &mut Vec<FieldError>) {
    if password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError {
            field,
            message: "password too short",
        });
    }
}

/// Validated email + password pair for sign-in and registration.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn credentials(email: &str, password: &str) -> Validated<Credentials> {
    let mut errors = Vec::new();
    let email = check_email(email, &mut errors);
    check_password("password", password, &mut errors);
    if errors.is_empty() {
        Ok(Credentials {
            email,
            password: password.to_string(),
        })
    } else {
        Err(errors)
    }
}

pub fn email_only(email: &str) -> Validated<String> {
    let mut errors = Vec::new();
    let email = check_email(email, &mut errors);
    if errors.is_empty() {
        Ok(email)
    } else {
        Err(errors)
    }
}

#[derive(Debug)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

pub fn password_change(
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Validated<PasswordChange> {
    let mut errors = Vec::new();
    check_password("currentPassword", current_password, &mut errors);
    check_password("newPassword", new_password, &mut errors);
    check_password("confirmPassword", confirm_password, &mut errors);
    if new_password != confirm_password {
        errors.push(FieldError {
            field: "confirmPassword",
            message: "passwords don't match",
        });
    }
    if errors.is_empty() {
        Ok(PasswordChange {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        })
    } else {
        Err(errors)
    }
}

#[derive(Debug)]
pub struct PasswordReset {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

pub fn password_reset(
    email: &str,
    token: &str,
    new_password: &str,
    confirm_password: &str,
) -> Validated<PasswordReset> {
    let mut errors = Vec::new();
    let email = check_email(email, &mut errors);
    if token.is_empty() {
        errors.push(FieldError {
            field: "token",
            message: "token is required",
        });
    }
    check_password("newPassword", new_password, &mut errors);
    check_password("confirmPassword", confirm_password, &mut errors);
    if new_password != confirm_password {
        errors.push(FieldError {
            field: "confirmPassword",
            message: "passwords don't match",
        });
    }
    if errors.is_empty() {
        Ok(PasswordReset {
            email,
            token: token.to_string(),
            new_password: new_password.to_string(),
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_credentials_and_trims_email() {
        let creds = credentials("  user@example.com ", "secret1").expect("should validate");
        assert_eq!(creds.email, "user@example.com");
        assert_eq!(creds.password, "secret1");
    }

    #[test]
    fn rejects_bad_email_shapes() {
        for email in ["", "nope", "a@b", "a b@example.com", "@example.com"] {
            let errors = credentials(email, "secret1").unwrap_err();
            assert!(errors.iter().any(|e| e.field == "email"), "email: {email}");
        }
    }

    #[test]
    fn rejects_short_password() {
        let errors = credentials("user@example.com", "five5").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
    }

    #[test]
    fn six_characters_is_enough() {
        assert!(credentials("user@example.com", "sixsix").is_ok());
    }

    #[test]
    fn password_change_requires_matching_confirmation() {
        let errors = password_change("current1", "newpass1", "newpass2").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "confirmPassword");

        let change = password_change("current1", "newpass1", "newpass1").expect("should validate");
        assert_eq!(change.new_password, "newpass1");
    }

    #[test]
    fn password_reset_requires_token() {
        let errors = password_reset("user@example.com", "", "newpass1", "newpass1").unwrap_err();
        assert!(errors.iter().any(|e| e.field == "token"));

        let reset =
            password_reset("user@example.com", "tok", "newpass1", "newpass1").expect("valid");
        assert_eq!(reset.token, "tok");
    }

    #[test]
    fn reset_confirmation_mismatch_is_invalid() {
        let errors =
            password_reset("user@example.com", "tok", "newpass1", "different1").unwrap_err();
        assert!(errors.iter().any(|e| e.field == "confirmPassword"));
    }
}
