//! Editing session for one tool.

use std::fmt;

use futures::future::try_join_all;
use keel_core::{DiffEntry, JsonPath};
use keel_schema::{
    FieldDescriptor, FieldType, SchemaOption, available_options, default_value,
    describe_fields, property_schema, resolve, schema_options, synthetic_schema,
};
use serde_json::{Map, Value};

use crate::adapter::SettingsAdapter;
use crate::document::{self, DocumentState};
use crate::error::DraftError;
use crate::side_channel::SideChannel;

/// Load lifecycle of a session.
///
/// `Unloaded -> Loading -> Ready`, or `Loading -> Error` when a fetch fails.
/// A reload from `Error` re-enters `Loading`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Error(String),
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unloaded => f.write_str("unloaded"),
            Self::Loading => f.write_str("loading"),
            Self::Ready => f.write_str("ready"),
            Self::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// How to pick the starting value of a new key.
///
/// With neither set, the root schema's property of the same name is used if
/// there is one.
#[derive(Debug, Clone, Default)]
pub struct AddKey {
    pub schema: Option<Value>,
    pub field_type: Option<FieldType>,
}

impl AddKey {
    #[must_use]
    pub const fn typed(field_type: FieldType) -> Self {
        Self {
            schema: None,
            field_type: Some(field_type),
        }
    }

    #[must_use]
    pub const fn with_schema(schema: Value) -> Self {
        Self {
            schema: Some(schema),
            field_type: None,
        }
    }
}

pub struct DraftManager<A> {
    pub(crate) adapter: A,
    pub(crate) schema: Option<Value>,
    pub(crate) state: LoadState,
    pub(crate) document: Option<DocumentState>,
    pub(crate) side_channels: Vec<Box<dyn SideChannel>>,
    pub(crate) pending: Option<Vec<DiffEntry>>,
}

impl<A: SettingsAdapter> DraftManager<A> {
    #[must_use]
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            schema: None,
            state: LoadState::Unloaded,
            document: None,
            side_channels: Vec::new(),
            pending: None,
        }
    }

    /// Builder form of [`Self::register_side_channel`].
    #[must_use]
    pub fn with_side_channel(mut self, channel: impl SideChannel + 'static) -> Self {
        self.register_side_channel(Box::new(channel));
        self
    }

    /// Add an auxiliary document. It is loaded, diffed, reset, and saved
    /// together with the primary document from the next load on.
    pub fn register_side_channel(&mut self, channel: Box<dyn SideChannel>) {
        self.side_channels.push(channel);
    }

    pub const fn adapter(&self) -> &A {
        &self.adapter
    }

    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// Cached root schema, if one has been loaded.
    pub const fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    pub fn draft(&self) -> Option<&Map<String, Value>> {
        self.document.as_ref().map(|doc| &doc.draft)
    }

    pub fn original(&self) -> Option<&Map<String, Value>> {
        self.document.as_ref().map(|doc| &doc.original)
    }

    pub fn side_channel_names(&self) -> Vec<&str> {
        self.side_channels.iter().map(|channel| channel.name()).collect()
    }

    /// Borrow a registered side channel by concrete type.
    pub fn side_channel<T: SideChannel + 'static>(&self) -> Option<&T> {
        self.side_channels
            .iter()
            .find_map(|channel| channel.as_any().downcast_ref::<T>())
    }

    /// Mutably borrow a registered side channel by concrete type.
    ///
    /// `None` unless the session is `Ready`. Any pending save request is
    /// dropped, since the caller may now edit the channel.
    pub fn side_channel_mut<T: SideChannel + 'static>(&mut self) -> Option<&mut T> {
        if !self.is_ready() {
            return None;
        }
        self.pending = None;
        self.side_channels
            .iter_mut()
            .find_map(|channel| channel.as_any_mut().downcast_mut::<T>())
    }

    /// Fetch schema, settings, and every side channel together.
    ///
    /// The cached schema is reused unless `refetch_schema` is set. The
    /// session only becomes `Ready` when every fetch succeeds; any failure
    /// drops the document, unloads every side channel, and leaves the session
    /// in `Error`.
    ///
    /// # Errors
    ///
    /// [`DraftError::LoadFailed`] naming the document that could not be read.
    pub async fn load(&mut self, refetch_schema: bool) -> Result<(), DraftError> {
        tracing::debug!(tool = self.adapter.name(), refetch_schema, "loading settings");
        self.state = LoadState::Loading;
        self.pending = None;

        let cached = if refetch_schema { None } else { self.schema.clone() };
        let adapter = &self.adapter;

        let schema = async {
            match cached {
                Some(schema) => Ok(schema),
                None => adapter
                    .load_schema()
                    .await
                    .map_err(|source| DraftError::LoadFailed {
                        document: "schema".to_string(),
                        source,
                    }),
            }
        };
        let settings = async {
            adapter
                .load_settings()
                .await
                .map_err(|source| DraftError::LoadFailed {
                    document: document::PRIMARY_DOCUMENT.to_string(),
                    source,
                })
        };
        let channels = try_join_all(self.side_channels.iter_mut().map(|channel| channel.load()));

        let loaded = futures::try_join!(schema, settings, channels);
        match loaded {
            Ok((schema, settings, _)) => {
                tracing::debug!(
                    tool = self.adapter.name(),
                    keys = settings.len(),
                    side_channels = self.side_channels.len(),
                    "settings loaded"
                );
                self.schema = Some(schema);
                self.document = Some(DocumentState::new(settings));
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(tool = self.adapter.name(), %error, "failed to load settings");
                self.document = None;
                for channel in &mut self.side_channels {
                    channel.unload();
                }
                self.state = LoadState::Error(error.to_string());
                Err(error)
            }
        }
    }

    /// Load again, forcing a schema refetch.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub async fn reload(&mut self) -> Result<(), DraftError> {
        self.load(true).await
    }

    fn document_mut(&mut self) -> Result<&mut DocumentState, DraftError> {
        if self.state != LoadState::Ready {
            return Err(DraftError::NotReady {
                state: self.state.to_string(),
            });
        }
        self.pending = None;
        self.document.as_mut().ok_or_else(|| DraftError::NotReady {
            state: LoadState::Unloaded.to_string(),
        })
    }

    /// Insert a new top-level key holding a default value.
    ///
    /// # Errors
    ///
    /// [`DraftError::BlankKey`] or [`DraftError::DuplicateKey`]; the draft is
    /// left unchanged in both cases.
    pub fn add_key(&mut self, key: &str, options: AddKey) -> Result<(), DraftError> {
        let key = key.trim();
        let root = self.schema.as_ref();
        let schema = match options {
            AddKey {
                schema: Some(schema),
                ..
            } => resolve(Some(&schema), root),
            AddKey {
                field_type: Some(field_type),
                ..
            } => Some(synthetic_schema(field_type)),
            AddKey { .. } => root.and_then(|root| property_schema(root, key)),
        };
        let value = default_value(schema.as_ref());

        let doc = self.document_mut()?;
        doc.draft = document::with_key_added(&doc.draft, key, value)?;
        tracing::debug!(key, "added key to draft");
        Ok(())
    }

    /// Remove a top-level key. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// [`DraftError::NotReady`] before a successful load.
    pub fn delete_key(&mut self, key: &str) -> Result<bool, DraftError> {
        let doc = self.document_mut()?;
        let existed = doc.draft.contains_key(key);
        doc.draft = document::without_key(&doc.draft, key);
        Ok(existed)
    }

    /// Write `value` at `path` in the draft.
    ///
    /// # Errors
    ///
    /// [`DraftError::Path`] when the path's parent does not exist.
    pub fn set_value(&mut self, path: &JsonPath, value: Value) -> Result<(), DraftError> {
        let doc = self.document_mut()?;
        doc.draft = document::with_value_at(&doc.draft, path, value)?;
        Ok(())
    }

    /// Discard every edit, including side-channel edits.
    pub fn reset_draft(&mut self) {
        self.pending = None;
        if let Some(doc) = self.document.as_mut() {
            doc.reset();
        }
        for channel in &mut self.side_channels {
            channel.reset();
        }
    }

    /// Whether anything differs from what was last loaded or saved. Always
    /// false outside `Ready`.
    pub fn has_changes(&self) -> bool {
        self.is_ready()
            && (self.side_channels.iter().any(|channel| channel.is_dirty())
                || self.document.as_ref().is_some_and(DocumentState::has_changes))
    }

    /// Descriptors for every top-level key currently in the draft.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        self.draft()
            .map(|draft| describe_fields(draft, self.schema.as_ref()))
            .unwrap_or_default()
    }

    /// Every property the schema declares.
    pub fn schema_options(&self) -> Vec<SchemaOption> {
        self.schema.as_ref().map(schema_options).unwrap_or_default()
    }

    /// Declared properties not yet present in the draft.
    pub fn available_options(&self) -> Vec<SchemaOption> {
        match (self.schema.as_ref(), self.draft()) {
            (Some(root), Some(draft)) => available_options(root, draft),
            _ => Vec::new(),
        }
    }
}
