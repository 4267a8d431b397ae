//! Root principal and credential checking.

use constant_time_eq::constant_time_eq;

/// The single configured identity allowed to log in.
#[derive(Clone)]
pub struct Principal {
    pub name: String,
    pub secret: String,
}

impl Principal {
    pub fn new(name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Compares login attempts against the root principal.
///
/// The stored secret is compared in plaintext as configured; there is no
/// hashing, lockout or rate limiting.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    principal: Principal,
}

impl CredentialVerifier {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    /// Name of the configured principal.
    pub fn principal_name(&self) -> &str {
        &self.principal.name
    }

    /// Returns true only if both fields match the root principal exactly.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }
        // Both comparisons always run so a name mismatch costs the same as a
        // secret mismatch.
        let name_ok = constant_time_eq(username.as_bytes(), self.principal.name.as_bytes());
        let secret_ok = constant_time_eq(password.as_bytes(), self.principal.secret.as_bytes());
        name_ok & secret_ok
    }
}
