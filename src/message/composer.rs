use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::Error;

use super::{Clipboard, LinkedInProfile, LogNotifier, MemoryClipboard, Notifier};

/// Builds the outreach message for a profile. Empty fields are substituted
/// as they are.
pub fn compose(profile: &LinkedInProfile) -> String {
    let background = profile
        .summary
        .split('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    format!(
        "Hi {name},\n\
         \n\
         I came across your profile and your work as {job_title} at {company} stood out to me. \
         Your background in {background} is what caught my attention.\n\
         \n\
         We are working on a few projects that could use someone with your expertise, and I \
         think there could be room to collaborate with people in the {location} area.\n\
         \n\
         Would you be open to a short conversation? I would like to hear more about what you \
         are building at {company} and share how we might work together.\n\
         \n\
         Best regards,\n\
         [Your Name]\n\
         \n\
         P.S. Since you are based in {location}, I would be glad to meet for coffee if you \
         are interested!",
        name = profile.name,
        job_title = profile.job_title,
        company = profile.company,
        background = background,
        location = profile.location,
    )
}

/// Something that turns a profile into a message, possibly slowly.
#[async_trait]
pub trait MessageBackend: Send + Sync {
    async fn generate(&self, profile: &LinkedInProfile) -> Result<String, Error>;
}

/// Fills the message template after a fixed delay, standing in for a remote
/// text generation service.
#[derive(Clone, Debug)]
pub struct TemplateBackend {
    delay: Duration,
}

impl TemplateBackend {
    pub fn new(delay: Duration) -> TemplateBackend {
        TemplateBackend { delay }
    }
}

#[async_trait]
impl MessageBackend for TemplateBackend {
    #[tracing::instrument(skip(self, profile))]
    async fn generate(&self, profile: &LinkedInProfile) -> Result<String, Error> {
        tokio::time::sleep(self.delay).await;

        Ok(compose(profile))
    }
}

#[derive(Debug, Default)]
struct ComposerState {
    message: Option<String>,
    in_flight: Option<u64>,
    next_ticket: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct ComposerSnapshot {
    pub message: Option<String>,
    pub pending: bool,
}

fn lock(state: &Mutex<ComposerState>) -> Result<MutexGuard<'_, ComposerState>, Error> {
    state
        .lock()
        .map_err(|_| Error::ExistentialState("message composer lock is poisoned".into()))
}

// Clears the in-flight marker however the generation task ends, including
// when it is aborted before finishing.
struct InFlightGuard {
    state: Arc<Mutex<ComposerState>>,
    ticket: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            if state.in_flight == Some(self.ticket) {
                state.in_flight = None;
            }
        }
    }
}

/// Holds the current generated message and allows one generation at a time.
#[derive(Clone)]
pub struct MessageComposer {
    backend: Arc<dyn MessageBackend>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
    state: Arc<Mutex<ComposerState>>,
}

impl MessageComposer {
    pub fn new(
        backend: Arc<dyn MessageBackend>,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn Clipboard>,
    ) -> MessageComposer {
        MessageComposer {
            backend,
            notifier,
            clipboard,
            state: Arc::new(Mutex::new(ComposerState::default())),
        }
    }

    pub fn with_delay(delay: Duration) -> MessageComposer {
        MessageComposer::new(
            Arc::new(TemplateBackend::new(delay)),
            Arc::new(LogNotifier),
            Arc::new(MemoryClipboard::new()),
        )
    }

    pub fn is_pending(&self) -> Result<bool, Error> {
        Ok(lock(&self.state)?.in_flight.is_some())
    }

    pub fn current_message(&self) -> Result<Option<String>, Error> {
        Ok(lock(&self.state)?.message.clone())
    }

    pub fn snapshot(&self) -> Result<ComposerSnapshot, Error> {
        let state = lock(&self.state)?;

        Ok(ComposerSnapshot {
            message: state.message.clone(),
            pending: state.in_flight.is_some(),
        })
    }

    /// Mirrors what a generate trigger would allow: a complete profile and
    /// nothing already in flight.
    pub fn can_generate(&self, profile: &LinkedInProfile) -> Result<bool, Error> {
        Ok(profile.is_complete() && !self.is_pending()?)
    }

    /// Starts generating a message in the background. The returned handle
    /// resolves to the message; dropping it does not stop the generation,
    /// whose result replaces the current message either way.
    #[tracing::instrument(skip(self))]
    pub fn generate(&self, profile: LinkedInProfile) -> Result<PendingMessage, Error> {
        let missing_fields = profile.missing_fields();
        if !missing_fields.is_empty() {
            return Err(Error::ProfileIncomplete { missing_fields });
        }

        let ticket = {
            let mut state = lock(&self.state)?;
            if state.in_flight.is_some() {
                return Err(Error::GenerationInProgress);
            }
            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.in_flight = Some(ticket);
            ticket
        };

        let guard = InFlightGuard {
            state: Arc::clone(&self.state),
            ticket,
        };
        let backend = Arc::clone(&self.backend);
        let notifier = Arc::clone(&self.notifier);
        let state = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            let _guard = guard;
            let message = backend.generate(&profile).await?;

            {
                let mut state = lock(&state)?;
                state.message = Some(message.clone());
                if state.in_flight == Some(ticket) {
                    state.in_flight = None;
                }
            }

            notifier.notify(
                "Message Generated!",
                "Your personalized outreach message has been created.",
            );

            Ok::<_, Error>(message)
        });

        Ok(PendingMessage { handle })
    }

    /// Copies the current message. Clipboard failures are logged and do not
    /// fail the copy.
    #[tracing::instrument(skip(self))]
    pub fn copy_to_clipboard(&self) -> Result<String, Error> {
        let message = self.current_message()?.ok_or(Error::MessageNotGenerated)?;

        if let Err(err) = self.clipboard.write_text(&message) {
            warn!(%err, "failed to write message to clipboard");
        }

        self.notifier
            .notify("Copied!", "Message copied to clipboard.");

        Ok(message)
    }

    /// Forgets the current message. A generation still in flight will set a
    /// new one when it finishes.
    pub fn clear(&self) -> Result<(), Error> {
        lock(&self.state)?.message = None;

        Ok(())
    }
}

/// A message generation running in the background.
#[derive(Debug)]
pub struct PendingMessage {
    handle: JoinHandle<Result<String, Error>>,
}

impl PendingMessage {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for PendingMessage {
    type Output = Result<String, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(err)) if err.is_cancelled() => {
                Poll::Ready(Err(Error::GenerationCancelled))
            }
            Poll::Ready(Err(err)) => Poll::Ready(Err(Error::GenerationFailed(err.to_string()))),
        }
    }
}
