//! Confirmed saves across the primary document and its side channels.
//!
//! `request_save` builds the combined diff the user confirms;
//! `confirm_save` writes every document. Originals are rebased only when all
//! writes succeed, so a failed save can simply be retried.

use keel_core::DiffEntry;
use serde::Serialize;

use crate::adapter::SettingsAdapter;
use crate::document::PRIMARY_DOCUMENT;
use crate::error::DraftError;
use crate::manager::DraftManager;

/// Outcome of [`DraftManager::request_save`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveRequest {
    /// Nothing differs; no confirmation is needed.
    NothingToSave,
    /// These changes await [`DraftManager::confirm_save`].
    Confirm { diffs: Vec<DiffEntry> },
}

impl<A: SettingsAdapter> DraftManager<A> {
    /// Primary diff followed by each side channel's diff, in registration order.
    ///
    /// # Errors
    ///
    /// [`DraftError::NotReady`] before a load, or a side channel's parse or
    /// duplicate-key error.
    pub fn combined_diffs(&self) -> Result<Vec<DiffEntry>, DraftError> {
        let Some(doc) = self.document.as_ref().filter(|_| self.is_ready()) else {
            return Err(DraftError::NotReady {
                state: self.state.to_string(),
            });
        };
        let mut diffs = doc.diff();
        for channel in &self.side_channels {
            diffs.extend(channel.compute_diffs()?);
        }
        Ok(diffs)
    }

    /// Compute the combined diff and hold it for confirmation.
    ///
    /// # Errors
    ///
    /// Same as [`Self::combined_diffs`]. On error no request is pending, so
    /// [`Self::confirm_save`] stays unreachable until the input is fixed.
    pub fn request_save(&mut self) -> Result<SaveRequest, DraftError> {
        self.pending = None;
        let diffs = self.combined_diffs()?;
        let dirty = self.side_channels.iter().any(|channel| channel.is_dirty());
        if diffs.is_empty() && !dirty {
            tracing::debug!(tool = self.adapter.name(), "nothing to save");
            return Ok(SaveRequest::NothingToSave);
        }
        self.pending = Some(diffs.clone());
        Ok(SaveRequest::Confirm { diffs })
    }

    /// The diff awaiting confirmation, if any.
    pub fn pending_save(&self) -> Option<&[DiffEntry]> {
        self.pending.as_deref()
    }

    /// Drop the pending request without writing anything.
    pub fn cancel_save(&mut self) {
        self.pending = None;
    }

    /// Write every draft and rebase the originals.
    ///
    /// The primary document is always written in full; side channels are
    /// written when dirty. Returns the diff that was confirmed.
    ///
    /// # Errors
    ///
    /// [`DraftError::NoPendingSave`] without a prior request, or
    /// [`DraftError::SaveFailed`] with the adapter's message. After a failure
    /// the drafts and the pending request are kept so the save can be retried.
    pub async fn confirm_save(&mut self) -> Result<Vec<DiffEntry>, DraftError> {
        let diffs = self.pending.take().ok_or(DraftError::NoPendingSave)?;
        let Some(draft) = self.draft().cloned() else {
            return Err(DraftError::NotReady {
                state: self.state.to_string(),
            });
        };

        if let Err(error) = self.write_all(&draft).await {
            tracing::warn!(tool = self.adapter.name(), %error, "save failed; draft kept");
            self.pending = Some(diffs);
            return Err(error);
        }

        if let Some(doc) = self.document.as_mut() {
            doc.rebase();
        }
        for channel in &mut self.side_channels {
            channel.mark_saved();
        }
        tracing::info!(tool = self.adapter.name(), changes = diffs.len(), "settings saved");
        Ok(diffs)
    }

    async fn write_all(
        &self,
        draft: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), DraftError> {
        self.adapter
            .save_settings(draft)
            .await
            .map_err(|source| DraftError::SaveFailed {
                document: PRIMARY_DOCUMENT.to_string(),
                source,
            })?;
        for channel in self.side_channels.iter().filter(|channel| channel.is_dirty()) {
            channel.save().await?;
        }
        Ok(())
    }
}
