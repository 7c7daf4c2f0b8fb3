//! Group entity: a named set of people sharing expenses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, Entity, GroupId, PersonId};

/// Color token used when a group is registered without one.
pub const DEFAULT_GROUP_COLOR: &str = "#10B981";

/// A validated group.
///
/// Members are unique and kept in registration order. Aggregates such as the
/// expense total are not stored here; see `Ledger::group_summaries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    members: Vec<PersonId>,
    color: String,
    created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        members: Vec<PersonId>,
        color: Option<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();

        if id.is_blank() {
            return Err(DomainError::invalid_id("group id cannot be blank"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::invalid_group("name cannot be empty"));
        }
        if members.is_empty() {
            return Err(DomainError::invalid_group("group must have at least one member"));
        }
        for (idx, member) in members.iter().enumerate() {
            if member.is_blank() {
                return Err(DomainError::invalid_id("member cannot be blank"));
            }
            if members[..idx].contains(member) {
                return Err(DomainError::invalid_group(format!(
                    "{member} appears more than once"
                )));
            }
        }

        let color = color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GROUP_COLOR.to_string());

        Ok(Self {
            id,
            name,
            members,
            color,
            created_at,
        })
    }

    pub fn id_typed(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[PersonId] {
        &self.members
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_member(&self, person: &PersonId) -> bool {
        self.members.contains(person)
    }

    pub(crate) fn ensure_member(&self, person: &PersonId) -> DomainResult<()> {
        if self.is_member(person) {
            Ok(())
        } else {
            Err(DomainError::UnknownPerson(person.clone()))
        }
    }
}

impl Entity for Group {
    type Id = GroupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(names: &[&str]) -> Vec<PersonId> {
        names.iter().map(|n| PersonId::new(*n)).collect()
    }

    #[test]
    fn group_keeps_member_order_and_color() {
        let group = Group::new(
            GroupId::new("roommates"),
            "Roommates",
            members(&["You", "Mike", "John"]),
            Some("#10B981".to_string()),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(group.members(), members(&["You", "Mike", "John"]).as_slice());
        assert_eq!(group.color(), "#10B981");
        assert!(group.is_member(&PersonId::new("Mike")));
        assert!(!group.is_member(&PersonId::new("Sarah")));
    }

    #[test]
    fn duplicate_member_is_rejected() {
        let err = Group::new(
            GroupId::new("g"),
            "Friends",
            members(&["You", "Sarah", "You"]),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidGroup(ref msg) if msg.contains("You")));
    }

    #[test]
    fn empty_membership_and_blank_name_are_rejected() {
        let err = Group::new(GroupId::new("g"), "Friends", vec![], None, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidGroup(_)));

        let err = Group::new(GroupId::new("g"), "   ", members(&["You"]), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidGroup(_)));
    }

    #[test]
    fn missing_color_uses_default_token() {
        let group = Group::new(
            GroupId::new("g"),
            "Friends",
            members(&["You"]),
            Some(String::new()),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(group.color(), DEFAULT_GROUP_COLOR);
    }
}
