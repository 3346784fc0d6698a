//! Permission checks at the session and stream boundary.
//!
//! The cockpit is not in the business of user accounts or cookie
//! cryptography; it only asks a collaborator whether a connection may reach
//! the protected surfaces.  Two implementations ship with the crate: one for
//! development (everything granted) and one shared-token gate for
//! deployments with a reverse proxy handling real authentication.

use rover_types::RoverError;

/// The scope guarding both the WebSocket and the video stream.
pub const PROTECTED_SCOPE: &str = "protected";

/// Decides whether a connection may reach a protected surface.
///
/// Checked once per connection, before the handler starts.  A denial
/// rejects the connection with HTTP 403; the handler never runs.
pub trait AuthGate: Send + Sync {
    /// Grant or deny `scope` to a connection presenting `token`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Unauthorized`] on denial.
    fn check(&self, token: Option<&str>, scope: &str) -> Result<(), RoverError>;
}

/// Grants everything.  Development and trusted-LAN default.
pub struct AllowAll;

impl AuthGate for AllowAll {
    fn check(&self, _token: Option<&str>, _scope: &str) -> Result<(), RoverError> {
        Ok(())
    }
}

/// Grants any scope to connections presenting the configured token.
pub struct SharedToken {
    token: String,
}

impl SharedToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl AuthGate for SharedToken {
    fn check(&self, token: Option<&str>, scope: &str) -> Result<(), RoverError> {
        if token == Some(self.token.as_str()) {
            Ok(())
        } else {
            Err(RoverError::Unauthorized {
                scope: scope.to_string(),
            })
        }
    }
}
