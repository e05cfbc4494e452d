//! Role permission matrix.
//!
//! Two layers:
//! - the access table answers "may this role call the operation at all"
//!   (the coarse gate applied before any store access)
//! - the status rule table answers "which target statuses may this role set,
//!   and only on tickets assigned to it?" (applied by the lifecycle engine
//!   against the locked ticket row, before the transition table)

use crate::{Identity, Role, Ticket, TicketStatus, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operations exposed upward to the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreateTicket,
    ListTickets,
    AssignTicket,
    UpdateStatus,
    DeleteTicket,
    /// Comments and status history; further narrowed by ticket access
    TicketThread,
    CreateUser,
    ListUsers,
}

impl Operation {
    /// Roles allowed to invoke the operation.
    pub fn allowed_roles(&self) -> &'static [Role] {
        const ANY: &[Role] = &[Role::Manager, Role::Support, Role::User];
        match self {
            Self::CreateTicket => &[Role::User],
            Self::ListTickets => ANY,
            Self::AssignTicket => &[Role::Manager],
            Self::UpdateStatus => &[Role::Manager, Role::Support],
            Self::DeleteTicket => &[Role::Manager],
            Self::TicketThread => ANY,
            Self::CreateUser => &[Role::Manager],
            Self::ListUsers => &[Role::Manager],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTicket => "create_ticket",
            Self::ListTickets => "list_tickets",
            Self::AssignTicket => "assign_ticket",
            Self::UpdateStatus => "update_status",
            Self::DeleteTicket => "delete_ticket",
            Self::TicketThread => "ticket_thread",
            Self::CreateUser => "create_user",
            Self::ListUsers => "list_users",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role not in the operation's allowed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Forbidden: Insufficient permissions")]
pub struct Denied {
    pub role: Role,
    pub operation: Operation,
}

/// Authorization gate: fails if `role` may not invoke `operation`.
pub fn authorize(role: Role, operation: Operation) -> Result<(), Denied> {
    if operation.allowed_roles().contains(&role) {
        Ok(())
    } else {
        Err(Denied { role, operation })
    }
}

/// What a role may do through the status update operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRule {
    /// Requester must be the ticket's current assignee
    pub assignee_only: bool,
    /// Target statuses the role may request
    pub targets: &'static [TicketStatus],
}

impl StatusRule {
    pub fn permits_target(&self, target: TicketStatus) -> bool {
        self.targets.contains(&target)
    }
}

const SUPPORT_STATUS_RULE: StatusRule = StatusRule {
    assignee_only: true,
    targets: &[TicketStatus::InProgress, TicketStatus::Resolved],
};

const MANAGER_STATUS_RULE: StatusRule = StatusRule {
    assignee_only: false,
    targets: &[TicketStatus::Closed],
};

/// Status rule for a role; `None` if the role may not change status at all.
pub fn status_rule(role: Role) -> Option<StatusRule> {
    match role {
        Role::Support => Some(SUPPORT_STATUS_RULE),
        Role::Manager => Some(MANAGER_STATUS_RULE),
        Role::User => None,
    }
}

/// Why a status change was refused by the role gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusDenial {
    #[error("Forbidden: You can only update tickets assigned to you")]
    NotAssignee,

    #[error("Forbidden: {}", target_message(*role))]
    TargetNotPermitted { role: Role, target: TicketStatus },

    #[error("Forbidden: {0} cannot change ticket status")]
    RoleNotPermitted(Role),
}

fn target_message(role: Role) -> &'static str {
    match role {
        Role::Support => "Support can only set status to IN_PROGRESS or RESOLVED",
        Role::Manager => "Manager can only close tickets from this endpoint",
        Role::User => "Users cannot change ticket status",
    }
}

impl StatusDenial {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotAssignee => "not_assignee",
            Self::TargetNotPermitted { .. } => "target_not_permitted",
            Self::RoleNotPermitted(_) => "role_not_permitted",
        }
    }
}

/// Role gate for a status change. Assignment is checked before the target so
/// a support agent touching someone else's ticket is always told so first.
pub fn check_status_change(
    role: Role,
    requester: UserId,
    assigned_to: Option<UserId>,
    target: TicketStatus,
) -> Result<(), StatusDenial> {
    let rule = status_rule(role).ok_or(StatusDenial::RoleNotPermitted(role))?;

    if rule.assignee_only && assigned_to != Some(requester) {
        return Err(StatusDenial::NotAssignee);
    }
    if !rule.permits_target(target) {
        return Err(StatusDenial::TargetNotPermitted { role, target });
    }
    Ok(())
}

/// Ticket visibility: managers see everything, support agents see tickets
/// assigned to them, users see tickets they opened.
pub fn can_access_ticket(viewer: Identity, ticket: &Ticket) -> bool {
    match viewer.role {
        Role::Manager => true,
        Role::Support => ticket.is_assigned_to(viewer.id),
        Role::User => ticket.created_by == viewer.id,
    }
}
