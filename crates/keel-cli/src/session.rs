//! Wiring a tool profile to an editing session.

use keel_config::ToolProfile;
use keel_draft::{DraftManager, EnvChannel, FreeFormChannel, SecretChannel};

use crate::store::{EnvFile, FileSettings, JsonObjectFile, SecretFile};

/// Side-channel document names, also the first segment of their diff paths.
pub const AUTH_DOCUMENT: &str = "auth";
pub const EXTRA_DOCUMENT: &str = "extra";
pub const ENV_DOCUMENT: &str = "env";

/// Build an unloaded session over every document `profile` names.
pub fn open(name: &str, profile: &ToolProfile) -> DraftManager<FileSettings> {
    let adapter = FileSettings::new(name, profile.settings_path(), profile.schema_path());
    let mut manager = DraftManager::new(adapter);

    if let Some(auth) = &profile.auth {
        manager.register_side_channel(Box::new(SecretChannel::new(
            AUTH_DOCUMENT,
            auth.field.as_str(),
            SecretFile::new(auth.path()),
        )));
    }
    if let Some(extra) = profile.extra_path() {
        manager.register_side_channel(Box::new(FreeFormChannel::new(
            EXTRA_DOCUMENT,
            JsonObjectFile::new(extra),
        )));
    }
    if let Some(env) = &profile.env {
        manager.register_side_channel(Box::new(EnvChannel::new(
            ENV_DOCUMENT,
            env.fields.iter().cloned(),
            EnvFile::new(env.path(), env.fields.clone()),
        )));
    }

    tracing::debug!(
        tool = name,
        side_channels = ?manager.side_channel_names(),
        "session opened"
    );
    manager
}
