//! Load/save of the two-sided selection between sessions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Error as SerdeError;

use crate::domain::trade_state::PersistedState;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "TradeValueScanner";
const APP_NAME: &str = "TradeValueScanner";

/// Platform config directory for this app, if the platform has one.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Where the selection is saved, if the platform has a config directory.
pub fn state_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("state.json"))
}

/// Missing or unreadable state is treated as "nothing saved".
pub fn load_persisted_state_at(path: &Path) -> Option<PersistedState> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read saved trade state");
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(state) => Some(state),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unparseable trade state");
            None
        }
    }
}

pub fn save_persisted_state_at(path: &Path, state: &PersistedState) -> Result<(), PersistSaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    tracing::debug!(
        path = %path.display(),
        offer = state.offer.len(),
        request = state.request.len(),
        "saved trade state"
    );
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PersistSaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Basis, CatalogItem, ItemIdentity, TradeSide, TradeState};

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut state = TradeState::default();
        let key = state.add(
            TradeSide::Offer,
            CatalogItem::new(ItemIdentity::with_variant(4, "Gold"), "Brulee", "Vehicle")
                .with_cash_value("4.5m")
                .with_duped_value("3m"),
            Some(1_700_000_000),
        );
        state.set_basis(TradeSide::Offer, &key, Basis::Duped);

        save_persisted_state_at(&path, &state.to_persisted()).unwrap();
        let loaded = load_persisted_state_at(&path).unwrap();

        assert_eq!(loaded, state.to_persisted());
    }

    #[test]
    fn missing_or_corrupt_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        assert!(load_persisted_state_at(&path).is_none());

        fs::write(&path, "{ not json").unwrap();
        assert!(load_persisted_state_at(&path).is_none());
    }
}
