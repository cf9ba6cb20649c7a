use super::handle::MessageHandle;
use super::watcher::{Mutation, MutationWatcher, NodeRef};
use crate::core::message::{KvRow, MessageId, MessageType, NewMessage};
use std::collections::{BTreeMap, HashMap};

/// Ordered container of rendered messages.
///
/// Owns the synthetic id counter, a per-type index used by type-scoped
/// operations, and the mutation watcher once one has been installed.
/// Content changes made through the `*_content` and `push_kv_row` methods
/// are queued as mutations while a watcher exists.
#[derive(Debug, Default)]
pub struct Transcript {
    next_id: u64,
    order: Vec<MessageId>,
    handles: HashMap<MessageId, MessageHandle>,
    by_type: BTreeMap<MessageType, Vec<MessageId>>,
    watcher: Option<MutationWatcher>,
    mutations: Vec<Mutation>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: NewMessage) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        self.by_type.entry(message.ty).or_default().push(id);
        self.order.push(id);
        self.handles.insert(id, MessageHandle::new(id, message));
        self.record(Mutation::child_list(NodeRef::Root));
        id
    }

    pub fn remove(&mut self, id: MessageId) -> Option<MessageHandle> {
        let handle = self.handles.remove(&id)?;
        self.order.retain(|existing| *existing != id);
        if let Some(ids) = self.by_type.get_mut(&handle.ty()) {
            ids.retain(|existing| *existing != id);
        }
        self.record(Mutation::child_list(NodeRef::Root));
        Some(handle)
    }

    pub fn get(&self, id: MessageId) -> Option<&MessageHandle> {
        self.handles.get(&id)
    }

    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut MessageHandle> {
        self.handles.get_mut(&id)
    }

    /// Every live message of one type, in transcript order.
    pub fn ids_of_type(&self, ty: MessageType) -> &[MessageId] {
        self.by_type.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ids(&self) -> &[MessageId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageHandle> {
        self.order.iter().filter_map(|id| self.handles.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn append_content(&mut self, id: MessageId, chunk: &str) -> bool {
        let Some(handle) = self.handles.get_mut(&id) else {
            return false;
        };
        handle.body.content.push_str(chunk);
        self.record(Mutation::character_data(NodeRef::Content(id)));
        true
    }

    pub fn replace_content(&mut self, id: MessageId, content: impl Into<String>) -> bool {
        let Some(handle) = self.handles.get_mut(&id) else {
            return false;
        };
        handle.body.content = content.into();
        self.record(Mutation::child_list(NodeRef::Content(id)));
        true
    }

    pub fn push_kv_row(&mut self, id: MessageId, row: KvRow) -> bool {
        let Some(handle) = self.handles.get_mut(&id) else {
            return false;
        };
        handle.body.kvps.push(row);
        let index = handle.body.kvps.len() - 1;
        self.record(Mutation::child_list(NodeRef::KvRow { message: id, index }));
        true
    }

    /// The streaming flag belongs to whoever produces the content; the
    /// display engine only reads it.
    pub fn set_streaming(&mut self, id: MessageId, streaming: bool) -> bool {
        match self.handles.get_mut(&id) {
            Some(handle) => {
                handle.streaming = streaming;
                true
            }
            None => false,
        }
    }

    pub fn watcher(&self) -> Option<&MutationWatcher> {
        self.watcher.as_ref()
    }

    pub(crate) fn ensure_watcher(&mut self) -> &MutationWatcher {
        self.watcher.get_or_insert_with(MutationWatcher::new)
    }

    pub(crate) fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    fn record(&mut self, mutation: Mutation) {
        if self.watcher.is_some() {
            self.mutations.push(mutation);
        }
    }
}
