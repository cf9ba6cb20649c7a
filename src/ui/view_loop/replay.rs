//! Streams a loaded transcript back as if an agent were producing it.
//!
//! The replay task owns the records and sends [`ReplayMessage`]s over an
//! unbounded channel; the view loop feeds them into the engine through a
//! [`ReplayCursor`].

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::message::{MessageId, NewMessage};
use crate::core::prefs::PreferenceStore;
use crate::core::transcript_file::TranscriptRecord;
use crate::display::{DisplayEngine, LayoutProbe};

#[derive(Clone, Debug)]
pub enum ReplayMessage {
    /// A new message starts streaming. Content arrives as chunks.
    Begin { message: NewMessage, temp: bool },
    Chunk(String),
    End,
    Finished,
}

pub fn spawn_replay(
    records: Vec<TranscriptRecord>,
    tx: mpsc::UnboundedSender<ReplayMessage>,
    cancel_token: CancellationToken,
    chunk_delay: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = replay_records(records, &tx, chunk_delay) => {
                let _ = tx.send(ReplayMessage::Finished);
            }
            _ = cancel_token.cancelled() => {
                debug!("replay cancelled");
            }
        }
    })
}

async fn replay_records(
    records: Vec<TranscriptRecord>,
    tx: &mpsc::UnboundedSender<ReplayMessage>,
    chunk_delay: Duration,
) {
    for record in records {
        let TranscriptRecord { mut message, temp } = record;
        let content = std::mem::take(&mut message.body.content);
        if tx.send(ReplayMessage::Begin { message, temp }).is_err() {
            return;
        }
        for chunk in content.split_inclusive('\n') {
            tokio::time::sleep(chunk_delay).await;
            if tx.send(ReplayMessage::Chunk(chunk.to_string())).is_err() {
                return;
            }
        }
        tokio::time::sleep(chunk_delay).await;
        if tx.send(ReplayMessage::End).is_err() {
            return;
        }
    }
}

/// Tracks which message the replay is currently writing into.
#[derive(Debug, Default)]
pub struct ReplayCursor {
    current: Option<MessageId>,
    /// Progress message to drop once the next message begins.
    pending_temp: Option<MessageId>,
    finished: bool,
}

impl ReplayCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<MessageId> {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn apply<S: PreferenceStore>(
        &mut self,
        message: ReplayMessage,
        engine: &mut DisplayEngine<S>,
        probe: &dyn LayoutProbe,
        now: Instant,
    ) {
        match message {
            ReplayMessage::Begin { message, temp } => {
                if let Some(previous) = self.pending_temp.take() {
                    engine.remove_message(previous);
                }
                let id = engine.push_message(message.streaming(true), probe);
                self.current = Some(id);
                if temp {
                    self.pending_temp = Some(id);
                }
            }
            ReplayMessage::Chunk(chunk) => {
                if let Some(id) = self.current {
                    engine.transcript_mut().append_content(id, &chunk);
                }
            }
            ReplayMessage::End => {
                if let Some(id) = self.current.take() {
                    engine.finish_streaming(id, now);
                }
            }
            ReplayMessage::Finished => self.finished = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{MessageBody, MessageType};
    use crate::core::prefs::MemoryPreferenceStore;
    use crate::display::{DisplayClass, NoLayout};

    fn record(ty: MessageType, content: &str, temp: bool) -> TranscriptRecord {
        TranscriptRecord {
            message: NewMessage::new(ty, MessageBody::text(content)),
            temp,
        }
    }

    #[tokio::test]
    async fn replay_sends_line_chunks_then_end() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_replay(
            vec![record(MessageType::CodeExe, "a\nb\nc", false)],
            tx,
            CancellationToken::new(),
            Duration::ZERO,
        );
        handle.await.expect("replay task");

        let mut received = Vec::new();
        while let Ok(message) = rx.try_recv() {
            received.push(message);
        }
        assert!(matches!(
            &received[0],
            ReplayMessage::Begin { message, temp: false } if message.body.content.is_empty()
        ));
        let chunks: Vec<_> = received
            .iter()
            .filter_map(|m| match m {
                ReplayMessage::Chunk(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(chunks, vec!["a\n", "b\n", "c"]);
        assert!(matches!(received[received.len() - 2], ReplayMessage::End));
        assert!(matches!(received[received.len() - 1], ReplayMessage::Finished));
    }

    #[tokio::test]
    async fn cancelled_replay_does_not_finish() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();
        spawn_replay(
            vec![record(MessageType::User, "hi", false)],
            tx,
            cancel,
            Duration::from_secs(60),
        )
        .await
        .expect("replay task");

        while let Ok(message) = rx.try_recv() {
            assert!(!matches!(message, ReplayMessage::Finished));
        }
    }

    #[test]
    fn cursor_streams_into_one_message() {
        let mut engine = DisplayEngine::new(MemoryPreferenceStore::new());
        let mut cursor = ReplayCursor::new();
        let now = Instant::now();

        cursor.apply(
            ReplayMessage::Begin {
                message: NewMessage::new(MessageType::Response, MessageBody::text("")),
                temp: false,
            },
            &mut engine,
            &NoLayout,
            now,
        );
        let id = cursor.current().expect("current message");
        assert!(engine.transcript().get(id).expect("handle").is_streaming());

        cursor.apply(ReplayMessage::Chunk("hello ".into()), &mut engine, &NoLayout, now);
        cursor.apply(ReplayMessage::Chunk("world".into()), &mut engine, &NoLayout, now);
        assert_eq!(engine.process_mutations(now), 1);

        cursor.apply(ReplayMessage::End, &mut engine, &NoLayout, now);
        let handle = engine.transcript().get(id).expect("handle");
        assert_eq!(handle.body().content, "hello world");
        assert!(!handle.is_streaming());
        assert_eq!(cursor.current(), None);
        assert!(engine.scheduler().is_pending(id));
    }

    #[test]
    fn temp_message_is_replaced_by_the_next_one() {
        let mut engine = DisplayEngine::new(MemoryPreferenceStore::new());
        let mut cursor = ReplayCursor::new();
        let now = Instant::now();

        for (ty, temp) in [(MessageType::Info, true), (MessageType::Response, false)] {
            cursor.apply(
                ReplayMessage::Begin {
                    message: NewMessage::new(ty, MessageBody::text("")),
                    temp,
                },
                &mut engine,
                &NoLayout,
                now,
            );
            cursor.apply(ReplayMessage::End, &mut engine, &NoLayout, now);
        }

        assert_eq!(engine.transcript().len(), 1);
        let remaining = engine.transcript().iter().next().expect("one message");
        assert_eq!(remaining.ty(), MessageType::Response);
        assert_eq!(remaining.display(), DisplayClass::Compact);
        cursor.apply(ReplayMessage::Finished, &mut engine, &NoLayout, now);
        assert!(cursor.is_finished());
    }
}
