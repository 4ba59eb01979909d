//! Authorization gate.
//!
//! Pure decisions over the verified caller and the ownership chain of the target
//! record. Nothing here touches the store: services load the chain and ask.
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Property, UserRole};

/// The verified caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn owner(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Owner,
        }
    }

    pub fn tenant(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Tenant,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.role == UserRole::Owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateProperty,
    UpdateProperty,
    DeleteProperty,
    ReconcileAvailability,
    CreateTenant,
    UpdateTenant,
    DeleteTenant,
    RecordPayment,
    ViewPaymentStats,
    CreateMaintenance,
    UpdateMaintenance,
    DeleteMaintenance,
}

impl Action {
    fn allowed_roles(&self) -> &'static [UserRole] {
        match self {
            Action::RecordPayment | Action::CreateMaintenance => {
                &[UserRole::Owner, UserRole::Tenant]
            }
            _ => &[UserRole::Owner],
        }
    }

    fn denial(&self) -> &'static str {
        match self {
            Action::CreateProperty => "Only owners can add properties",
            Action::UpdateProperty => "Only owners can update properties",
            Action::DeleteProperty => "Only owners can delete properties",
            Action::ReconcileAvailability => "Only owners can reconcile availability",
            Action::CreateTenant => "Only owners can add tenants",
            Action::UpdateTenant => "Only owners can update tenants",
            Action::DeleteTenant => "Only owners can remove tenants",
            Action::ViewPaymentStats => "Only owners can view payment statistics",
            Action::UpdateMaintenance => "Only owners can update maintenance requests",
            Action::DeleteMaintenance => "Only owners can delete maintenance requests",
            Action::RecordPayment | Action::CreateMaintenance => "Access denied",
        }
    }
}

/// The owner at the root of a record's ownership chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipChain {
    pub owner_id: Uuid,
}

impl From<&Property> for OwnershipChain {
    fn from(property: &Property) -> Self {
        Self {
            owner_id: property.owner_id,
        }
    }
}

/// What a caller may read from a shared collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadScope {
    Everything,
    OwnRecords,
}

/// Role check, done before any lookup.
pub fn require_role(actor: &Actor, action: Action) -> AppResult<()> {
    if action.allowed_roles().contains(&actor.role) {
        Ok(())
    } else {
        Err(AppError::ForbiddenWith(action.denial().to_string()))
    }
}

pub fn require_owner(actor: &Actor, chain: OwnershipChain) -> AppResult<()> {
    if chain.owner_id == actor.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Role check followed by the ownership check against a loaded chain.
pub fn authorize(actor: &Actor, action: Action, chain: OwnershipChain) -> AppResult<()> {
    require_role(actor, action)?;
    require_owner(actor, chain)
}

pub fn read_scope(actor: &Actor) -> ReadScope {
    match actor.role {
        UserRole::Owner => ReadScope::Everything,
        UserRole::Tenant => ReadScope::OwnRecords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn tenants_cannot_attempt_owner_actions() {
        let tenant = Actor::tenant(Uuid::new_v4());
        for action in [
            Action::CreateProperty,
            Action::DeleteTenant,
            Action::ViewPaymentStats,
            Action::UpdateMaintenance,
        ] {
            let err = require_role(&tenant, action).unwrap_err();
            assert_eq!(err.status(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn both_roles_record_payments_and_report_issues() {
        let tenant = Actor::tenant(Uuid::new_v4());
        let owner = Actor::owner(Uuid::new_v4());
        for actor in [tenant, owner] {
            assert!(require_role(&actor, Action::RecordPayment).is_ok());
            assert!(require_role(&actor, Action::CreateMaintenance).is_ok());
        }
    }

    #[test]
    fn ownership_chain_must_end_at_caller() {
        let owner = Actor::owner(Uuid::new_v4());
        let mine = OwnershipChain {
            owner_id: owner.user_id,
        };
        let theirs = OwnershipChain {
            owner_id: Uuid::new_v4(),
        };
        assert!(authorize(&owner, Action::UpdateTenant, mine).is_ok());
        assert_eq!(
            authorize(&owner, Action::UpdateTenant, theirs)
                .unwrap_err()
                .status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn role_is_checked_before_ownership() {
        let tenant = Actor::tenant(Uuid::new_v4());
        let chain = OwnershipChain {
            owner_id: tenant.user_id,
        };
        let err = authorize(&tenant, Action::DeleteProperty, chain).unwrap_err();
        assert!(matches!(err, AppError::ForbiddenWith(msg) if msg.contains("Only owners")));
    }

    #[test]
    fn read_scope_by_role() {
        assert_eq!(
            read_scope(&Actor::owner(Uuid::new_v4())),
            ReadScope::Everything
        );
        assert_eq!(
            read_scope(&Actor::tenant(Uuid::new_v4())),
            ReadScope::OwnRecords
        );
    }
}
