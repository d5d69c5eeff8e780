//! Password hashing via bcrypt, plus the complexity policy.

use tokio::task;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 12;

/// Hash a password with bcrypt (cost 12).
///
/// Hashing at this cost takes hundreds of milliseconds of pure CPU, so it
/// runs on the blocking thread pool and never stalls request acceptance.
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AuthError::Internal(format!("hash task: {e}")))?
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// A wrong password is `Ok(false)`, never an error; only a corrupt stored
/// hash errors. The mismatch comparison is constant-time inside bcrypt.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("verify task: {e}")))?
        .map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Password complexity policy, evaluated once per registration or password
/// change. A single policy value is constructed with the config and handed
/// to the account service; rules live here, not per-route.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: false,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password, naming the first unmet requirement.
    pub fn validate(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::Validation(format!(
                "password must be at least {} characters",
                self.min_length
            )));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(AuthError::Validation(
                "password must contain an uppercase letter".into(),
            ));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(AuthError::Validation(
                "password must contain a lowercase letter".into(),
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::Validation("password must contain a digit".into()));
        }
        if self.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AuthError::Validation(
                "password must contain a special character".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_is_salted_and_verifiable() {
        let h1 = hash_password("Secret1!".into()).await.unwrap();
        let h2 = hash_password("Secret1!".into()).await.unwrap();
        assert_ne!(h1, "Secret1!");
        // Fresh salt per call, so the hashes differ and both still verify.
        assert_ne!(h1, h2);
        assert!(verify_password("Secret1!".into(), h1).await.unwrap());
        assert!(verify_password("Secret1!".into(), h2).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_is_false_not_error() {
        let h = hash_password("Secret1!".into()).await.unwrap();
        assert!(!verify_password("wrong".into(), h).await.unwrap());
    }

    #[test]
    fn default_policy_accepts_compliant_password() {
        assert!(PasswordPolicy::default().validate("Secret1!").is_ok());
    }

    #[test]
    fn policy_rejects_each_missing_class() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("Short1").is_err()); // too short
        assert!(policy.validate("secret1!").is_err()); // no uppercase
        assert!(policy.validate("SECRET1!").is_err()); // no lowercase
        assert!(policy.validate("Secretss").is_err()); // no digit
    }

    #[test]
    fn special_requirement_is_opt_in() {
        let policy = PasswordPolicy {
            require_special: true,
            ..PasswordPolicy::default()
        };
        assert!(policy.validate("Secret12").is_err());
        assert!(policy.validate("Secret1!").is_ok());
    }
}
