use crate::errors::AppError;
use crate::models::{Side, VoteData, VoteTally};
use std::collections::BTreeMap;
use std::{path::Path, path::PathBuf, sync::Arc};
use tokio::{fs, sync::Mutex};
use tracing::{error, info, warn};

pub async fn load_data(path: &Path) -> VoteData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse vote file: {err}");
                VoteData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => VoteData::default(),
        Err(err) => {
            error!("failed to read vote file: {err}");
            VoteData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &VoteData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// File-backed vote counters. Rows are seeded externally and only ever incremented.
#[derive(Clone)]
pub struct VoteStore {
    path: PathBuf,
    data: Arc<Mutex<VoteData>>,
}

impl VoteStore {
    pub fn new(path: PathBuf, data: VoteData) -> Self {
        Self {
            path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn open(path: PathBuf) -> Self {
        let data = load_data(&path).await;
        info!("loaded {} vote rows from {}", data.tallies.len(), path.display());
        Self::new(path, data)
    }

    pub async fn get(&self, id: &str) -> Option<VoteTally> {
        self.data.lock().await.tallies.get(id).copied()
    }

    pub async fn all(&self) -> BTreeMap<String, VoteTally> {
        self.data.lock().await.tallies.clone()
    }

    /// Adds one vote for `side`. Returns `false` when the row does not exist or
    /// the write to disk fails, in which case the count is left unchanged.
    pub async fn increment(&self, id: &str, side: Side) -> bool {
        let mut data = self.data.lock().await;
        let Some(entry) = data.tallies.get_mut(id) else {
            warn!("no vote row for design {id}");
            return false;
        };

        let previous = *entry;
        match side {
            Side::Original => entry.original = entry.original.saturating_add(1),
            Side::Ai => entry.ai = entry.ai.saturating_add(1),
        }

        if let Err(err) = persist_data(&self.path, &data).await {
            error!("failed to record vote for {id}: {}", err.message);
            data.tallies.insert(id.to_string(), previous);
            return false;
        }

        true
    }
}
