//! In-memory stand-ins for the network and chat seams.

use crate::error::{Result, UpdaterError};
use crate::repository::{ContentsApi, PutFileRequest, RemoteSource};
use crate::transport::{ChatTransport, ConversationId, MessageId};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct FakeSource {
    manifest: Option<Value>,
    files: HashMap<String, Vec<u8>>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new<C: AsRef<[u8]>>(files: &[(&str, C)]) -> Self {
        Self {
            manifest: Some(Value::Null),
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.as_ref().to_vec()))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_manifest(mut self, manifest: Value) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Make every manifest fetch fail as if the host were down.
    pub fn unreachable(mut self) -> Self {
        self.manifest = None;
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl RemoteSource for FakeSource {
    fn fetch_manifest(&self) -> Result<Value> {
        self.manifest
            .clone()
            .ok_or_else(|| UpdaterError::ManifestUnreachable("connection refused".into()))
    }

    fn fetch_file(&self, relative_path: &str) -> Result<Vec<u8>> {
        self.requested
            .lock()
            .unwrap()
            .push(relative_path.to_string());
        self.files
            .get(relative_path)
            .cloned()
            .ok_or_else(|| UpdaterError::FileFetch {
                path: relative_path.to_string(),
                message: "HTTP 404 Not Found".into(),
            })
    }
}

/// Recorded `put_file` call: path, commit message, content, revision marker.
pub type RecordedPut = (String, String, String, Option<String>);

#[derive(Default)]
pub struct FakeContents {
    pub revisions: HashMap<String, String>,
    pub fail_on: Option<String>,
    pub puts: Mutex<Vec<RecordedPut>>,
}

impl FakeContents {
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }
}

impl ContentsApi for FakeContents {
    fn file_revision(&self, path: &str) -> Result<Option<String>> {
        if self.fail_on.as_deref() == Some(path) {
            return Err(UpdaterError::Publish {
                path: path.to_string(),
                message: "Bad credentials".into(),
            });
        }
        Ok(self.revisions.get(path).cloned())
    }

    fn put_file(&self, request: &PutFileRequest<'_>) -> Result<()> {
        self.puts.lock().unwrap().push((
            request.path.to_string(),
            request.message.to_string(),
            request.content_base64.to_string(),
            request.sha.map(str::to_string),
        ));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: MessageId,
    pub conversation: ConversationId,
    pub text: String,
    pub reply_to: Option<MessageId>,
}

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Vec<SentMessage>,
    pub unsent: Vec<MessageId>,
}

impl RecordingTransport {
    pub fn texts(&self) -> Vec<&str> {
        self.sent.iter().map(|m| m.text.as_str()).collect()
    }

    pub fn last_text(&self) -> &str {
        self.sent.last().map(|m| m.text.as_str()).unwrap_or_default()
    }
}

impl ChatTransport for RecordingTransport {
    fn send(
        &mut self,
        conversation: &ConversationId,
        text: &str,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageId> {
        let id = MessageId::new(format!("bot-{}", self.sent.len() + 1));
        self.sent.push(SentMessage {
            id: id.clone(),
            conversation: conversation.clone(),
            text: text.to_string(),
            reply_to: reply_to.cloned(),
        });
        Ok(id)
    }

    fn unsend(&mut self, message: &MessageId) -> Result<()> {
        self.unsent.push(message.clone());
        Ok(())
    }
}
