//! Type-state synchronizer: keeps every rendered message's display class,
//! preview and controls consistent with the per-type preferences.

use super::classifier::{HeightClassifier, LayoutProbe};
use super::controls::{ControlAction, ControlSet};
use super::handle::MessageHandle;
use super::preview::synthesize_preview;
use super::scheduler::{reclassify_delay, DebounceScheduler, STREAMING_RECLASSIFY_DELAY};
use super::state::{resolve_display_class, DisplayClass, Transition};
use super::transcript::Transcript;
use crate::core::message::{MessageId, MessageType, NewMessage};
use crate::core::prefs::{GlobalHeightPolicy, PreferenceField, PreferenceStore, TypePreference};
use crate::utils::clipboard::Clipboard;
use std::time::Instant;
use tracing::{debug, warn};

pub struct DisplayEngine<S: PreferenceStore> {
    store: S,
    transcript: Transcript,
    scheduler: DebounceScheduler,
    classifier: HeightClassifier,
}

impl<S: PreferenceStore> DisplayEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_classifier(store, HeightClassifier::default())
    }

    pub fn with_classifier(store: S, classifier: HeightClassifier) -> Self {
        Self {
            store,
            transcript: Transcript::new(),
            scheduler: DebounceScheduler::new(),
            classifier,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Content producers mutate messages through the transcript; the
    /// resulting mutations are picked up by [`Self::process_mutations`].
    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn scheduler(&self) -> &DebounceScheduler {
        &self.scheduler
    }

    pub fn preference(&self, ty: MessageType) -> TypePreference {
        self.store.get(ty)
    }

    pub fn height_policy(&self) -> GlobalHeightPolicy {
        self.store.height_policy()
    }

    /// Append a message to the transcript and register it.
    pub fn push_message(&mut self, message: NewMessage, probe: &dyn LayoutProbe) -> MessageId {
        let id = self.transcript.append(message);
        self.register_message(id, probe);
        id
    }

    /// Attach controls to a freshly rendered message and bring it in line
    /// with its type's current state. Only this message is touched.
    pub fn register_message(&mut self, id: MessageId, probe: &dyn LayoutProbe) {
        self.transcript.ensure_watcher();
        let classifier = self.classifier;
        let Some(handle) = self.transcript.get_mut(id) else {
            debug!(%id, "register_message on unknown id");
            return;
        };
        let ty = handle.ty();
        let pref = self.store.get(ty);
        let policy = self.store.height_policy();

        handle.controls = Some(ControlSet::new(ty, pref, policy));
        if ty == MessageType::CodeExe {
            handle.summary = handle
                .command()
                .filter(|command| !command.trim().is_empty())
                .and_then(|command| command.lines().next())
                .map(str::to_string);
        }
        apply_preference(handle, pref, policy, &classifier, probe);
        debug!(%id, %ty, class = handle.display().as_str(), "registered message");
    }

    pub fn toggle_hidden(&mut self, ty: MessageType, probe: &dyn LayoutProbe) {
        self.toggle_field(ty, PreferenceField::Hidden, probe);
    }

    pub fn toggle_full_height(&mut self, ty: MessageType, probe: &dyn LayoutProbe) {
        self.toggle_field(ty, PreferenceField::FullHeight, probe);
    }

    fn toggle_field(&mut self, ty: MessageType, field: PreferenceField, probe: &dyn LayoutProbe) {
        let next = !field.read(self.store.get(ty));
        debug!(%ty, ?field, value = next, "toggling type preference");
        self.store.set(ty, field, next);
        self.apply_type(ty, probe);
    }

    pub fn toggle_height_policy(&mut self, probe: &dyn LayoutProbe) {
        let policy = GlobalHeightPolicy {
            fixed_height: !self.store.height_policy().fixed_height,
        };
        debug!(fixed_height = policy.fixed_height, "toggling height policy");
        self.store.set_height_policy(policy);
        self.apply_all(probe);
    }

    /// Re-read preferences from the store and apply every type.
    pub fn apply_all(&mut self, probe: &dyn LayoutProbe) {
        for ty in MessageType::ALL {
            self.apply_type(ty, probe);
        }
    }

    /// Recompute display state for every message of `ty`, then refresh the
    /// type's controls.
    pub fn apply_type(&mut self, ty: MessageType, probe: &dyn LayoutProbe) {
        let pref = self.store.get(ty);
        let policy = self.store.height_policy();
        let ids = self.transcript.ids_of_type(ty).to_vec();
        for id in &ids {
            if let Some(handle) = self.transcript.get_mut(*id) {
                apply_preference(handle, pref, policy, &self.classifier, probe);
            }
        }
        self.refresh_controls(ty);
        debug!(%ty, count = ids.len(), "applied type state");
    }

    pub fn refresh_controls(&mut self, ty: MessageType) {
        let pref = self.store.get(ty);
        let policy = self.store.height_policy();
        let ids = self.transcript.ids_of_type(ty).to_vec();
        for id in ids {
            if let Some(controls) = self
                .transcript
                .get_mut(id)
                .and_then(|handle| handle.controls.as_mut())
            {
                controls.refresh(pref, policy);
            }
        }
    }

    /// Drain recorded mutations and schedule reclassification for the
    /// streaming messages they touched.
    pub fn process_mutations(&mut self, now: Instant) -> usize {
        let batch = self.transcript.take_mutations();
        if batch.is_empty() {
            return 0;
        }
        let Some(watcher) = self.transcript.watcher() else {
            return 0;
        };
        let targets = watcher.streaming_targets(&batch, &self.transcript);
        for id in &targets {
            self.scheduler.schedule(*id, STREAMING_RECLASSIFY_DELAY, now);
        }
        targets.len()
    }

    /// Schedule a reclassification using the delay for the message's
    /// current streaming state.
    pub fn schedule_reclassify(&mut self, id: MessageId, now: Instant) -> bool {
        let Some(handle) = self.transcript.get(id) else {
            return false;
        };
        let delay = reclassify_delay(handle.is_streaming());
        self.scheduler.schedule(id, delay, now);
        true
    }

    /// Clear the streaming flag and settle the final layout once.
    pub fn finish_streaming(&mut self, id: MessageId, now: Instant) -> bool {
        if !self.transcript.set_streaming(id, false) {
            return false;
        }
        self.schedule_reclassify(id, now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Fire every due reclassification. Messages whose class is owned by a
    /// preference (collapsed, expanded) keep their class; collapsed ones get
    /// their preview rebuilt from the content that arrived meanwhile.
    /// Returns the number of messages that changed.
    pub fn run_due(&mut self, now: Instant, probe: &dyn LayoutProbe) -> usize {
        let mut reclassified = 0;
        for id in self.scheduler.take_due(now) {
            let Some(handle) = self.transcript.get_mut(id) else {
                continue;
            };
            if handle.display() == DisplayClass::Collapsed {
                let preview = synthesize_preview(handle.ty(), handle.body());
                if handle.preview.as_deref() != Some(preview.as_str()) {
                    debug!(%id, "refreshing collapsed preview");
                    handle.preview = Some(preview);
                    reclassified += 1;
                }
                continue;
            }
            if !handle.display().is_classifier_owned() {
                debug!(%id, class = handle.display().as_str(), "skipping reclassification");
                continue;
            }
            let class = self.classifier.classify(probe, handle);
            handle.set_display(class.into());
            handle.transition = Some(Transition::starting_at(now));
            reclassified += 1;
        }
        reclassified
    }

    /// Drop a message and any pending timer for it.
    pub fn remove_message(&mut self, id: MessageId) -> Option<MessageHandle> {
        self.scheduler.cancel(id);
        self.transcript.remove(id)
    }

    /// Copy a message's text. Returns whether the clipboard accepted it.
    pub fn copy_message(&mut self, id: MessageId, clipboard: &dyn Clipboard, now: Instant) -> bool {
        let Some(handle) = self.transcript.get_mut(id) else {
            return false;
        };
        let text = handle.body().copy_text();
        if text.is_empty() {
            debug!(%id, "nothing to copy");
            return false;
        }
        match clipboard.write_text(&text) {
            Ok(()) => {
                if let Some(controls) = handle.controls.as_mut() {
                    controls.copy.flash(now);
                }
                true
            }
            Err(err) => {
                warn!(%id, error = %err, "copy to clipboard failed");
                false
            }
        }
    }

    pub fn dispatch(
        &mut self,
        action: ControlAction,
        clipboard: &dyn Clipboard,
        probe: &dyn LayoutProbe,
        now: Instant,
    ) {
        match action {
            ControlAction::ToggleHidden(ty) => self.toggle_hidden(ty, probe),
            ControlAction::ToggleFullHeight(ty) => self.toggle_full_height(ty, probe),
            ControlAction::Copy(id) => {
                self.copy_message(id, clipboard, now);
            }
        }
    }

    /// Drop transition hints that have run their course.
    pub fn settle_transitions(&mut self, now: Instant) {
        let ids = self.transcript.ids().to_vec();
        for id in ids {
            if let Some(handle) = self.transcript.get_mut(id) {
                if handle
                    .transition
                    .is_some_and(|transition| transition.is_finished(now))
                {
                    handle.transition = None;
                }
            }
        }
    }
}

fn apply_preference(
    handle: &mut MessageHandle,
    pref: TypePreference,
    policy: GlobalHeightPolicy,
    classifier: &HeightClassifier,
    probe: &dyn LayoutProbe,
) {
    let class = resolve_display_class(pref, policy, || classifier.measure(probe, handle));
    handle.preview = match class {
        DisplayClass::Collapsed => Some(synthesize_preview(handle.ty(), handle.body())),
        _ => None,
    };
    handle.set_display(class);
}
