//! Owner identity collaborator seam.
//!
//! # Responsibility
//! - Define the tenant key carried by every catalog operation.
//! - Keep identity resolution outside the core: the surrounding layer
//!   resolves the owner once and injects it before any store access.
//!
//! # Invariants
//! - The core never accepts a caller-supplied owner id embedded in request
//!   data; every scoping check uses the injected `OwnerId`.
//! - Ownership of an entity is immutable after creation.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque tenant identity. Typically an identity-provider subject; the core
/// never inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supplies the authoritative owner for the current call context.
pub trait IdentityProvider {
    fn current_owner(&self) -> OwnerId;
}

/// Fixed-owner identity for embedding callers and tests.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    owner: OwnerId,
}

impl StaticIdentity {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_owner(&self) -> OwnerId {
        self.owner.clone()
    }
}
