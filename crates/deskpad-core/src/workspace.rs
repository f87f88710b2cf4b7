//! Application state with write-through persistence.
//!
//! Every mutation is applied in memory and then the whole affected collection
//! is written back to the store before the call returns.

use anyhow::Result;
use chrono::NaiveDate;
use log::info;

use crate::ai::{ChatError, Reply, TextGenerator};
use crate::chat::{Chat, PendingRequest, KEY_SAVED_MESSAGE};
use crate::dashboard::DashboardSummary;
use crate::notes::NoteBoard;
use crate::store::{KeyValueStore, Storage};
use crate::tasks::TaskList;

pub struct Workspace<S> {
    storage: Storage<S>,
    tasks: TaskList,
    notes: NoteBoard,
    credential: Option<String>,
    fallback_credential: Option<String>,
    chat: Chat,
}

impl<S: KeyValueStore> Workspace<S> {
    /// Loads tasks, notes and the credential from `store`.
    ///
    /// `fallback_credential` is used when nothing is stored; it is never
    /// written back. The chat opens with a greeting when a key is stored.
    pub fn load(store: S, fallback_credential: Option<String>) -> Result<Self> {
        let storage = Storage::new(store);
        let tasks = TaskList::from_tasks(storage.load_tasks()?);
        let notes = NoteBoard::from_notes(storage.load_notes()?);
        let credential = storage.load_credential()?;

        info!(
            "event=workspace_load tasks={} notes={} credential={}",
            tasks.len(),
            notes.len(),
            credential.is_some()
        );

        let mut workspace = Self {
            storage,
            tasks,
            notes,
            credential,
            fallback_credential: fallback_credential.filter(|k| !k.trim().is_empty()),
            chat: Chat::new(),
        };
        if workspace.has_stored_credential() {
            workspace.chat.greet();
        }
        Ok(workspace)
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn notes(&self) -> &NoteBoard {
        &self.notes
    }

    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    pub fn store(&self) -> &S {
        self.storage.inner()
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .or(self.fallback_credential.as_deref())
    }

    pub fn has_stored_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn dashboard(&self, today: NaiveDate) -> DashboardSummary {
        DashboardSummary::build(&self.tasks, &self.notes, today)
    }

    pub fn add_task(&mut self, text: &str) -> Result<bool> {
        let mut next = self.tasks.clone();
        if next.add(text).is_none() {
            return Ok(false);
        }
        self.commit_tasks(next)?;
        info!("event=task_add count={}", self.tasks.len());
        Ok(true)
    }

    pub fn toggle_task(&mut self, position: usize) -> Result<bool> {
        let mut next = self.tasks.clone();
        let Some(completed) = next.toggle(position) else {
            return Ok(false);
        };
        self.commit_tasks(next)?;
        info!("event=task_toggle position={} completed={}", position, completed);
        Ok(true)
    }

    pub fn remove_task(&mut self, position: usize) -> Result<bool> {
        let mut next = self.tasks.clone();
        if next.remove(position).is_none() {
            return Ok(false);
        }
        self.commit_tasks(next)?;
        info!("event=task_remove position={} count={}", position, self.tasks.len());
        Ok(true)
    }

    pub fn add_note(&mut self, title: &str, content: &str) -> Result<bool> {
        let mut next = self.notes.clone();
        if next.add(title, content).is_none() {
            return Ok(false);
        }
        self.commit_notes(next)?;
        info!("event=note_add count={}", self.notes.len());
        Ok(true)
    }

    pub fn remove_note(&mut self, position: usize) -> Result<bool> {
        let mut next = self.notes.clone();
        if next.remove(position).is_none() {
            return Ok(false);
        }
        self.commit_notes(next)?;
        info!("event=note_remove position={} count={}", position, self.notes.len());
        Ok(true)
    }

    /// Stores a new API key and confirms it in the chat. Blank keys are ignored.
    pub fn save_credential(&mut self, key: &str) -> Result<bool> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(false);
        }
        self.storage.save_credential(key)?;
        self.credential = Some(key.to_string());
        self.chat.push_bot(KEY_SAVED_MESSAGE);
        info!("event=credential_saved");
        Ok(true)
    }

    pub fn submit_chat(&mut self, input: &str) -> Option<PendingRequest> {
        let credential = self
            .credential
            .as_deref()
            .or(self.fallback_credential.as_deref());
        self.chat.submit(input, credential)
    }

    pub fn complete_chat(&mut self, outcome: Result<Reply, ChatError>) {
        self.chat.complete(outcome);
    }

    /// Submits and awaits a chat message in one step.
    pub async fn send_chat<G>(&mut self, generator: &G, input: &str)
    where
        G: TextGenerator + ?Sized,
    {
        if let Some(request) = self.submit_chat(input) {
            let outcome = generator.generate(&request.api_key, &request.prompt).await;
            self.complete_chat(outcome);
        }
    }

    // The in-memory list is only replaced once the write went through.
    fn commit_tasks(&mut self, next: TaskList) -> Result<()> {
        self.storage.save_tasks(next.as_slice())?;
        self.tasks = next;
        Ok(())
    }

    fn commit_notes(&mut self, next: NoteBoard) -> Result<()> {
        self.storage.save_notes(next.as_slice())?;
        self.notes = next;
        Ok(())
    }
}
