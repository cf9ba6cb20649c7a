//! Content mutation records and the per-transcript watcher that turns them
//! into reclassification requests for streaming messages.

use super::transcript::Transcript;
use crate::core::message::MessageId;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_WATCHER_SERIAL: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added or removed.
    ChildList,
    /// Existing text changed in place.
    CharacterData,
}

/// Where in the transcript tree a mutation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Root,
    Message(MessageId),
    Content(MessageId),
    KvRow { message: MessageId, index: usize },
}

impl NodeRef {
    /// Nearest enclosing message, if any.
    pub fn owning_message(&self) -> Option<MessageId> {
        match *self {
            NodeRef::Root => None,
            NodeRef::Message(id) | NodeRef::Content(id) => Some(id),
            NodeRef::KvRow { message, .. } => Some(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub target: NodeRef,
    pub kind: MutationKind,
}

impl Mutation {
    pub fn child_list(target: NodeRef) -> Self {
        Self {
            target,
            kind: MutationKind::ChildList,
        }
    }

    pub fn character_data(target: NodeRef) -> Self {
        Self {
            target,
            kind: MutationKind::CharacterData,
        }
    }
}

/// Subtree observer for one transcript. Created once, on first
/// registration, and never replaced.
#[derive(Debug)]
pub struct MutationWatcher {
    serial: u64,
}

impl MutationWatcher {
    pub(crate) fn new() -> Self {
        Self {
            serial: NEXT_WATCHER_SERIAL.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Process-unique identity; two reads returning the same serial prove
    /// the watcher was not re-created in between.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Streaming messages touched by a batch, deduplicated in first-seen
    /// order. Mutations outside any message, or on messages that are not
    /// streaming, are ignored.
    pub fn streaming_targets(&self, batch: &[Mutation], transcript: &Transcript) -> Vec<MessageId> {
        let mut targets = Vec::new();
        for mutation in batch {
            let Some(id) = mutation.target.owning_message() else {
                continue;
            };
            let streaming = transcript
                .get(id)
                .is_some_and(|handle| handle.is_streaming());
            if streaming && !targets.contains(&id) {
                targets.push(id);
            }
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_resolve_to_their_message() {
        let id = MessageId(4);
        assert_eq!(NodeRef::Root.owning_message(), None);
        assert_eq!(NodeRef::Content(id).owning_message(), Some(id));
        assert_eq!(
            NodeRef::KvRow {
                message: id,
                index: 2
            }
            .owning_message(),
            Some(id)
        );
    }

    #[test]
    fn serials_are_unique() {
        let first = MutationWatcher::new();
        let second = MutationWatcher::new();
        assert_ne!(first.serial(), second.serial());
    }
}
