use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use tracing::error;

use crate::errors::ServiceError;

/// Hashes a plain-text password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    if password.is_empty() {
        return Err(ServiceError::ValidationError(
            "Password cannot be empty".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Argon2 password hashing failed");
            ServiceError::HashError(e.to_string())
        })
}

/// Checks `provided` against a stored PHC string. A mismatch is `Ok(false)`.
pub fn verify_password(stored_hash: &str, provided: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "Stored password hash could not be parsed");
        ServiceError::HashError(e.to_string())
    })?;

    match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "Argon2 password verification failed");
            Err(ServiceError::HashError(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("diesel-and-donuts").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "diesel-and-donuts").unwrap());
        assert!(!verify_password(&hash, "petrol-and-pretzels").unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("secret-pass").unwrap();
        let b = hash_password("secret-pass").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_password_is_rejected() {
        assert_matches!(hash_password(""), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert_matches!(
            verify_password("not-a-phc-string", "x"),
            Err(ServiceError::HashError(_))
        );
    }
}
