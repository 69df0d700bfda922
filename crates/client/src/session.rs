//! Session identity for the cart subsystem.
//!
//! The gate owns the current bearer token and user id; everything else
//! reads it on demand. The cart service never holds a long-lived copy of
//! an identity, so a sign-out observed between two mutations is never
//! masked by a stale token.

use std::fmt;

use tokio::sync::watch;
use zeroize::Zeroize;

/// Identifier of the signed-in marketplace user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Bearer token material for the marketplace backend.
///
/// The token never appears in `Debug` output and is zeroized on drop.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps raw token material.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for constructing an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(**redacted**)")
    }
}

impl Drop for BearerToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// An authenticated session: who the shopper is and the token that proves
/// it to the backend.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    user_id: UserId,
    token: BearerToken,
}

impl SessionIdentity {
    /// Pairs a user id with its bearer token.
    pub fn new(user_id: impl Into<UserId>, token: BearerToken) -> Self {
        Self {
            user_id: user_id.into(),
            token,
        }
    }

    /// Returns the signed-in user id.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the bearer token.
    pub fn token(&self) -> &BearerToken {
        &self.token
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Holds the current [`SessionIdentity`], if any, and broadcasts
/// transitions to observers.
///
/// The authentication flow owns the transitions: it calls [`sign_in`] when
/// a login or a restored token becomes valid and [`sign_out`] on logout.
/// The cart side only ever reads.
///
/// [`sign_in`]: SessionGate::sign_in
/// [`sign_out`]: SessionGate::sign_out
#[derive(Debug, Clone)]
pub struct SessionGate {
    identity: watch::Sender<Option<SessionIdentity>>,
}

impl SessionGate {
    /// Creates a gate with no signed-in identity.
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);

        Self { identity }
    }

    /// Returns the current identity, or `None` while anonymous.
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.identity.borrow().clone()
    }

    /// Returns `true` when a session identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    /// Installs an identity after a successful login or session restore.
    pub fn sign_in(&self, identity: SessionIdentity) {
        self.identity.send_replace(Some(identity));
    }

    /// Drops the current identity. The cart deliberately survives this:
    /// logging out must not delete a shopper's in-progress cart.
    pub fn sign_out(&self) {
        self.identity.send_replace(None);
    }

    /// Subscribes to identity transitions (anonymous to authenticated and
    /// back). Receivers see the value current at subscription time plus
    /// every change after it.
    pub fn watch(&self) -> watch::Receiver<Option<SessionIdentity>> {
        self.identity.subscribe()
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}
