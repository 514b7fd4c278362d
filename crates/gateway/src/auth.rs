//! Identity-provider seam and the in-memory development fallback.
//!
//! The real identity provider is an external collaborator; the core only
//! consumes `sign_in`/`sign_out` and an ambient current-identity stream.
//! The resolved role gates which slices a consumer may activate.

use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::watch;

use gangway_core::error::CoreError;
use gangway_core::role::RoleTag;
use gangway_core::types::DbId;

use crate::error::GatewayResult;

/// The signed-in identity as resolved by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: Option<DbId>,
    pub email: String,
    pub display_name: String,
    pub role: RoleTag,
}

impl Identity {
    /// Whether this identity may activate manager-only views.
    pub fn has_manager_access(&self) -> bool {
        self.role.has_manager_access()
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve credentials to an identity and publish it on the stream.
    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Identity>;

    /// Clear the current identity.
    async fn sign_out(&self);

    /// Ambient current-identity stream; `None` while signed out.
    fn identity(&self) -> watch::Receiver<Option<Identity>>;
}

// ---------------------------------------------------------------------------
// In-memory provider
// ---------------------------------------------------------------------------

/// One entry in the development identity directory.
#[derive(Debug, Clone)]
struct DirectoryEntry {
    identity: Identity,
    /// `None` accepts any password (the development default).
    password: Option<String>,
}

/// Identity provider backed by an in-memory directory.
///
/// This is the development fallback for the hosted provider: sign-in
/// resolves the email against the directory (case-insensitive) and checks
/// the password only when the entry carries one.
pub struct MemoryAuthProvider {
    directory: RwLock<Vec<DirectoryEntry>>,
    current: watch::Sender<Option<Identity>>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            directory: RwLock::new(Vec::new()),
            current,
        }
    }

    /// Register a directory identity. `password: None` accepts any password.
    pub fn with_identity(self, identity: Identity, password: Option<&str>) -> Self {
        self.directory
            .write()
            .expect("auth directory lock poisoned")
            .push(DirectoryEntry {
                identity,
                password: password.map(str::to_string),
            });
        self
    }

    /// Directory with one employee and one manager, enough to drive every
    /// development flow.
    pub fn seeded() -> Self {
        Self::new()
            .with_identity(
                Identity {
                    user_id: Some(1),
                    email: "sam@example.com".to_string(),
                    display_name: "Sam Chen".to_string(),
                    role: RoleTag::from("employee"),
                },
                None,
            )
            .with_identity(
                Identity {
                    user_id: Some(2),
                    email: "dana@example.com".to_string(),
                    display_name: "Dana Flores".to_string(),
                    role: RoleTag::from("manager"),
                },
                None,
            )
    }
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Identity> {
        let wanted = email.trim().to_lowercase();
        let entry = {
            let directory = self.directory.read().expect("auth directory lock poisoned");
            directory
                .iter()
                .find(|e| e.identity.email.to_lowercase() == wanted)
                .cloned()
        };
        let entry = entry.ok_or_else(|| {
            CoreError::Unauthorized(format!("No account for '{email}'"))
        })?;
        if let Some(expected) = &entry.password {
            if expected != password {
                return Err(CoreError::Unauthorized("Wrong password".to_string()).into());
            }
        }
        tracing::debug!(email = %entry.identity.email, "signed in");
        self.current.send_replace(Some(entry.identity.clone()));
        Ok(entry.identity)
    }

    async fn sign_out(&self) {
        self.current.send_replace(None);
    }

    fn identity(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::error::GatewayError;

    use super::*;

    #[tokio::test]
    async fn sign_in_resolves_directory_entry_case_insensitively() {
        let auth = MemoryAuthProvider::seeded();
        let identity = auth.sign_in("SAM@example.com", "anything").await.unwrap();
        assert_eq!(identity.display_name, "Sam Chen");
        assert_eq!(auth.identity().borrow().as_ref(), Some(&identity));
    }

    #[tokio::test]
    async fn unknown_email_is_unauthorized() {
        let auth = MemoryAuthProvider::seeded();
        let err = auth.sign_in("nobody@example.com", "x").await.unwrap_err();
        assert_matches!(err, GatewayError::Core(CoreError::Unauthorized(_)));
        assert!(auth.identity().borrow().is_none());
    }

    #[tokio::test]
    async fn password_is_checked_only_when_set() {
        let auth = MemoryAuthProvider::new().with_identity(
            Identity {
                user_id: None,
                email: "locked@example.com".to_string(),
                display_name: "Locked".to_string(),
                role: RoleTag::from("manager"),
            },
            Some("s3cret"),
        );
        assert!(auth.sign_in("locked@example.com", "wrong").await.is_err());
        assert!(auth.sign_in("locked@example.com", "s3cret").await.is_ok());
    }

    #[tokio::test]
    async fn sign_out_clears_the_stream() {
        let auth = MemoryAuthProvider::seeded();
        auth.sign_in("dana@example.com", "x").await.unwrap();
        auth.sign_out().await;
        assert!(auth.identity().borrow().is_none());
    }
}
