//! Turn channel: the hand-off between a session's workflow task and the gateway
//!
//! The workflow side publishes prompts and waits for replies; the gateway side
//! waits for prompts and pushes replies. Prompts go through a single-value
//! slot: a prompt the gateway never read is replaced by the next one, so the
//! gateway always sees the newest question. Each prompt carries a sequence
//! number and every reply echoes the number of the prompt it answers, so a
//! reply that arrives after the workflow gave up waiting is dropped instead of
//! being taken as the answer to a later question. The reply queue has room for
//! one such late reply next to the current one.
//!
//! ```text
//!   workflow task                                gateway request
//!   ─────────────                                ───────────────
//!   send_prompt(q) ──── prompt slot (latest) ──▶ await_prompt()
//!   await_reply()  ◀─── replies (cap 2) ──────── send_reply(a)
//!   finish()       ──── Finished ──────────────▶ await_prompt()
//! ```

use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::error::{InterviewError, Result, WaitKind};

/// Event travelling from the workflow to the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    /// A question awaiting a reply
    Question {
        /// Sequence number of the prompt (1-based)
        seq: u32,
        /// Question text
        text: String,
    },
    /// Sentinel: the workflow will not ask anything more
    Finished,
}

#[derive(Debug)]
struct Reply {
    seq: u32,
    text: String,
}

/// Create a connected turn channel pair
#[must_use]
pub fn turn_channel() -> (WorkflowEnd, GatewayEnd) {
    let (prompt_tx, prompt_rx) = watch::channel(None);
    let (reply_tx, reply_rx) = mpsc::channel(2);

    (
        WorkflowEnd {
            prompt_tx,
            reply_rx,
            next_seq: 1,
            pending: None,
        },
        GatewayEnd {
            prompt_rx,
            reply_tx,
            last_seq: None,
        },
    )
}

/// Workflow-facing half of the turn channel
#[derive(Debug)]
pub struct WorkflowEnd {
    prompt_tx: watch::Sender<Option<PromptEvent>>,
    reply_rx: mpsc::Receiver<Reply>,
    next_seq: u32,
    pending: Option<u32>,
}

impl WorkflowEnd {
    /// Publish one prompt without blocking
    ///
    /// Returns the prompt's sequence number. Fails with `ChannelMisuse` while a
    /// previous prompt is still waiting for its reply. A prompt whose reply
    /// wait already expired and that the gateway never read is replaced.
    pub fn send_prompt(&mut self, text: impl Into<String>) -> Result<u32> {
        if let Some(seq) = self.pending {
            return Err(InterviewError::channel_misuse(format!(
                "prompt {seq} is still waiting for a reply"
            )));
        }

        let seq = self.next_seq;
        let event = PromptEvent::Question {
            seq,
            text: text.into(),
        };

        if self.prompt_tx.is_closed() {
            return Err(InterviewError::ChannelClosed);
        }
        self.prompt_tx.send_replace(Some(event));

        self.next_seq += 1;
        self.pending = Some(seq);
        Ok(seq)
    }

    /// Wait for the reply to the outstanding prompt
    ///
    /// Replies to earlier prompts are discarded. On timeout the outstanding
    /// prompt is abandoned so the next `send_prompt` is allowed.
    pub async fn await_reply(&mut self, timeout: Duration) -> Result<String> {
        let Some(seq) = self.pending else {
            return Err(InterviewError::channel_misuse("no prompt is awaiting a reply"));
        };
        let deadline = Instant::now() + timeout;

        loop {
            match tokio::time::timeout_at(deadline, self.reply_rx.recv()).await {
                Ok(Some(reply)) if reply.seq == seq => {
                    self.pending = None;
                    return Ok(reply.text);
                }
                Ok(Some(stale)) => {
                    log::debug!(
                        "Dropping late reply to prompt {} while waiting for {}",
                        stale.seq,
                        seq
                    );
                }
                Ok(None) => {
                    self.pending = None;
                    return Err(InterviewError::ChannelClosed);
                }
                Err(_) => {
                    self.pending = None;
                    return Err(InterviewError::timeout(WaitKind::Reply));
                }
            }
        }
    }

    /// Sequence number of the prompt awaiting a reply, if any
    #[must_use]
    pub const fn pending(&self) -> Option<u32> {
        self.pending
    }

    /// Signal completion and release any waiter
    ///
    /// Replaces an unread prompt with the sentinel. Dropping the sender also
    /// reads as `Finished` on the gateway side.
    pub fn finish(self) {
        self.prompt_tx.send_replace(Some(PromptEvent::Finished));
    }
}

/// Gateway-facing half of the turn channel
#[derive(Debug)]
pub struct GatewayEnd {
    prompt_rx: watch::Receiver<Option<PromptEvent>>,
    reply_tx: mpsc::Sender<Reply>,
    last_seq: Option<u32>,
}

impl GatewayEnd {
    /// Wait for the next unread prompt or the completion sentinel
    ///
    /// A closed prompt slot with nothing unread is reported as `Finished`.
    pub async fn await_prompt(&mut self, timeout: Duration, kind: WaitKind) -> Result<PromptEvent> {
        let next = async {
            loop {
                if self.prompt_rx.changed().await.is_err() {
                    return PromptEvent::Finished;
                }
                if let Some(event) = self.prompt_rx.borrow_and_update().clone() {
                    return event;
                }
            }
        };

        let event = tokio::time::timeout(timeout, next)
            .await
            .map_err(|_| InterviewError::timeout(kind))?;
        if let PromptEvent::Question { seq, .. } = &event {
            self.last_seq = Some(*seq);
        }
        Ok(event)
    }

    /// Deliver a reply to the most recently observed prompt
    pub fn send_reply(&mut self, text: impl Into<String>) -> Result<()> {
        let Some(seq) = self.last_seq.take() else {
            return Err(InterviewError::channel_misuse(
                "no prompt has been received to reply to",
            ));
        };

        match self.reply_tx.try_send(Reply {
            seq,
            text: text.into(),
        }) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.last_seq = Some(seq);
                Err(InterviewError::channel_misuse("a reply is already queued"))
            }
            Err(TrySendError::Closed(_)) => Err(InterviewError::ChannelClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn prompt_and_reply_alternate() {
        let (mut workflow, mut gateway) = turn_channel();

        let seq = workflow.send_prompt("How are you sleeping?").unwrap();
        assert_eq!(seq, 1);

        let event = gateway.await_prompt(WAIT, WaitKind::FirstPrompt).await.unwrap();
        assert_eq!(
            event,
            PromptEvent::Question {
                seq: 1,
                text: "How are you sleeping?".into()
            }
        );

        gateway.send_reply("Badly").unwrap();
        assert_eq!(workflow.await_reply(WAIT).await.unwrap(), "Badly");
        assert_eq!(workflow.pending(), None);
    }

    #[tokio::test]
    async fn second_prompt_before_reply_is_misuse() {
        let (mut workflow, _gateway) = turn_channel();
        workflow.send_prompt("first").unwrap();
        let err = workflow.send_prompt("second").unwrap_err();
        assert!(matches!(err, InterviewError::ChannelMisuse(_)));
    }

    #[tokio::test]
    async fn reply_wait_times_out_and_frees_slot() {
        let (mut workflow, mut gateway) = turn_channel();
        workflow.send_prompt("first").unwrap();
        gateway.await_prompt(WAIT, WaitKind::FirstPrompt).await.unwrap();

        let err = workflow
            .await_reply(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(workflow.send_prompt("second").unwrap(), 2);
    }

    #[tokio::test]
    async fn unread_prompt_is_replaced_by_newer_one() {
        let (mut workflow, mut gateway) = turn_channel();
        workflow.send_prompt("first").unwrap();
        gateway.await_prompt(WAIT, WaitKind::FirstPrompt).await.unwrap();

        // Two reply waits expire while nobody reads the slot
        assert!(workflow.await_reply(Duration::from_millis(10)).await.is_err());
        assert_eq!(workflow.send_prompt("second").unwrap(), 2);
        assert!(workflow.await_reply(Duration::from_millis(10)).await.is_err());
        assert_eq!(workflow.send_prompt("third").unwrap(), 3);

        let event = gateway.await_prompt(WAIT, WaitKind::NextPrompt).await.unwrap();
        assert_eq!(
            event,
            PromptEvent::Question {
                seq: 3,
                text: "third".into()
            }
        );
        gateway.send_reply("answer to third").unwrap();
        assert_eq!(workflow.await_reply(WAIT).await.unwrap(), "answer to third");
    }

    #[tokio::test]
    async fn read_prompt_is_not_delivered_twice() {
        let (mut workflow, mut gateway) = turn_channel();
        workflow.send_prompt("first").unwrap();
        gateway.await_prompt(WAIT, WaitKind::FirstPrompt).await.unwrap();

        let err = gateway
            .await_prompt(Duration::from_millis(20), WaitKind::NextPrompt)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn prompt_after_gateway_dropped_is_closed() {
        let (mut workflow, gateway) = turn_channel();
        drop(gateway);
        assert!(matches!(
            workflow.send_prompt("anyone?"),
            Err(InterviewError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn late_reply_is_not_taken_for_next_prompt() {
        let (mut workflow, mut gateway) = turn_channel();

        workflow.send_prompt("first").unwrap();
        gateway.await_prompt(WAIT, WaitKind::FirstPrompt).await.unwrap();
        assert!(workflow.await_reply(Duration::from_millis(10)).await.is_err());

        // Answer to prompt 1 arrives after the workflow moved on
        gateway.send_reply("late answer").unwrap();
        workflow.send_prompt("second").unwrap();
        gateway.await_prompt(WAIT, WaitKind::NextPrompt).await.unwrap();
        gateway.send_reply("fresh answer").unwrap();

        assert_eq!(workflow.await_reply(WAIT).await.unwrap(), "fresh answer");
    }

    #[tokio::test]
    async fn finish_releases_waiting_gateway() {
        let (workflow, mut gateway) = turn_channel();
        workflow.finish();
        let event = gateway.await_prompt(WAIT, WaitKind::NextPrompt).await.unwrap();
        assert_eq!(event, PromptEvent::Finished);
    }

    #[tokio::test]
    async fn dropped_workflow_reads_as_finished() {
        let (workflow, mut gateway) = turn_channel();
        drop(workflow);
        let event = gateway.await_prompt(WAIT, WaitKind::NextPrompt).await.unwrap();
        assert_eq!(event, PromptEvent::Finished);
    }

    #[tokio::test]
    async fn gateway_wait_times_out() {
        let (_workflow, mut gateway) = turn_channel();
        let err = gateway
            .await_prompt(Duration::from_millis(10), WaitKind::FirstPrompt)
            .await
            .unwrap_err();
        assert!(matches!(err, InterviewError::Timeout(WaitKind::FirstPrompt)));
    }

    #[tokio::test]
    async fn reply_without_prompt_is_misuse() {
        let (_workflow, mut gateway) = turn_channel();
        assert!(matches!(
            gateway.send_reply("hello"),
            Err(InterviewError::ChannelMisuse(_))
        ));
    }
}
