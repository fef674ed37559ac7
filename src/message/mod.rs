use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Error;

pub mod composer;
pub mod endpoints;
pub use composer::{compose, MessageComposer, PendingMessage};
pub use endpoints::*;

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct LinkedInProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub summary: String,
}

impl LinkedInProfile {
    /// The profile the generator form starts out with.
    pub fn demo() -> LinkedInProfile {
        LinkedInProfile {
            name: "John Doe".into(),
            job_title: "Senior Software Engineer".into(),
            company: "TechCorp Inc.".into(),
            location: "San Francisco, CA".into(),
            summary: "Experienced software engineer with 8+ years in full-stack development. \
                Passionate about building scalable web applications and leading development \
                teams. Currently focused on AI/ML integration and cloud architecture."
                .into(),
        }
    }

    pub fn sample() -> LinkedInProfile {
        LinkedInProfile {
            name: "Sarah Chen".into(),
            job_title: "VP of Engineering".into(),
            company: "InnovateTech Solutions".into(),
            location: "Austin, TX".into(),
            summary: "Seasoned engineering leader with 12+ years building and scaling \
                high-performance teams. Expert in cloud infrastructure, DevOps, and agile \
                methodologies. Currently leading digital transformation initiatives and \
                building next-generation SaaS platforms."
                .into(),
        }
    }

    /// Name and job title are the only fields a message cannot do without.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.job_title.is_empty() {
            missing.push("job_title");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Receives short user-facing notices. Nothing is expected back.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, description: &str);
}

#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, description: &str) {
        info!(title, description, "notification");
    }
}

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), Error>;
}

/// Holds the most recently copied text in process.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> MemoryClipboard {
        MemoryClipboard::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|contents| contents.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), Error> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| Error::ExistentialState("clipboard lock is poisoned".into()))?;
        *contents = Some(text.to_string());

        Ok(())
    }
}
