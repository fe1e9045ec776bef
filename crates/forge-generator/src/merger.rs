//! Name-keyed member merge
//!
//! The merge is a single pass over the class's member list, driven by an
//! ordered association from canonical name to synthesized member. Members
//! whose names are not in the association pass through untouched at their
//! original positions; matched members are handled per [`MergePolicy`];
//! names with no match are appended in association order.

use forge_foundation::{ForgeError, ForgeResult};
use forge_lang_csharp::{ClassNode, MemberKind, MemberNode};
use tracing::debug;

/// What the merger may do to an existing member of the same name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Regenerated every run
    Replace,
    /// Created when missing, never overwritten afterwards
    EnsurePresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    Replaced,
    Appended,
    Kept,
}

impl MergeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeAction::Replaced => "replaced",
            MergeAction::Appended => "appended",
            MergeAction::Kept => "kept",
        }
    }
}

/// A generator-owned member and its merge policy
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedMember {
    pub policy: MergePolicy,
    pub member: MemberNode,
}

impl ManagedMember {
    pub fn new(policy: MergePolicy, member: MemberNode) -> Self {
        Self { policy, member }
    }

    pub fn name(&self) -> &str {
        self.member.name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub class: ClassNode,
    /// One entry per managed member, in the order they were given
    pub actions: Vec<(String, MergeAction)>,
    /// Set when any member was replaced or appended
    pub dirty: bool,
}

pub struct Merger;

impl Merger {
    /// Fold a single member into `class`
    pub fn merge(class: ClassNode, member: ManagedMember) -> ForgeResult<MergeResult> {
        Self::merge_all(class, vec![member])
    }

    /// Fold every managed member into `class` in one pass.
    ///
    /// Fails without touching the class when a canonical name already
    /// appears on more than one method.
    pub fn merge_all(mut class: ClassNode, managed: Vec<ManagedMember>) -> ForgeResult<MergeResult> {
        for entry in &managed {
            let count = class.methods_named(entry.name()).count();
            if count > 1 {
                return Err(ForgeError::ambiguous("member", entry.name(), count));
            }
        }

        let names: Vec<String> = managed.iter().map(|m| m.name().to_string()).collect();
        let mut pending: Vec<Option<ManagedMember>> = managed.into_iter().map(Some).collect();
        let mut actions: Vec<Option<MergeAction>> = vec![None; pending.len()];
        let mut dirty = false;

        let existing = std::mem::take(&mut class.members);
        let mut members = Vec::with_capacity(existing.len() + pending.len());

        for member in existing {
            let slot = member
                .name
                .as_deref()
                .filter(|_| member.kind == MemberKind::Method)
                .and_then(|name| names.iter().position(|n| n == name));

            let Some(index) = slot else {
                members.push(member);
                continue;
            };
            let Some(entry) = pending[index].take() else {
                members.push(member);
                continue;
            };

            match entry.policy {
                MergePolicy::Replace => {
                    let mut replacement = entry.member;
                    replacement.trivia = member.trivia;
                    members.push(replacement);
                    actions[index] = Some(MergeAction::Replaced);
                    dirty = true;
                }
                MergePolicy::EnsurePresent => {
                    members.push(member);
                    actions[index] = Some(MergeAction::Kept);
                }
            }
        }

        for (index, entry) in pending.into_iter().enumerate() {
            if let Some(entry) = entry {
                members.push(entry.member);
                actions[index] = Some(MergeAction::Appended);
                dirty = true;
            }
        }

        class.members = members;
        let actions: Vec<(String, MergeAction)> = names
            .into_iter()
            .zip(actions)
            .filter_map(|(name, action)| action.map(|a| (name, a)))
            .collect();

        for (member, action) in &actions {
            debug!(member = %member, action = action.as_str(), "Merged member");
        }

        Ok(MergeResult {
            class,
            actions,
            dirty,
        })
    }
}
