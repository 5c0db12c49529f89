//! Authorization policy.
//!
//! Every permission decision in the platform goes through [`authorize`], which
//! takes the acting user, what they want to do and what they want to do it to.

use uuid::Uuid;

use crate::domain::Role;
use crate::error::DomainError;

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// The target of an action, carrying what the rules need to know about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Post { author_id: Option<Uuid> },
    Category,
}

/// Decide whether `actor` may perform `action` on `resource`.
pub fn authorize(actor: &Actor, action: Action, resource: Resource) -> Result<(), DomainError> {
    let allowed = match (resource, action) {
        (Resource::Post { .. }, Action::Create) => true,
        (Resource::Post { author_id }, Action::Update | Action::Delete) => {
            actor.is_admin() || author_id == Some(actor.user_id)
        }
        (Resource::Category, _) => actor.is_admin(),
    };

    if allowed {
        return Ok(());
    }

    tracing::debug!(
        user_id = %actor.user_id,
        role = %actor.role,
        ?action,
        ?resource,
        "Authorization denied"
    );

    Err(match resource {
        Resource::Category => DomainError::Forbidden("Admin access required"),
        Resource::Post { .. } => DomainError::Forbidden("Access denied"),
    })
}
