// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;
use tracing::info;

use crate::domain::agent::ObjectId;
use crate::domain::backend::{Backend, BackendError};

/// Downloaded file handed back to an operator console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedDownload {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Operator access to files agents have pulled into the object store.
#[derive(Clone)]
pub struct DownloadService {
    backend: Arc<dyn Backend>,
}

impl DownloadService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn sync(&self, file_id: &ObjectId) -> Result<SyncedDownload, BackendError> {
        let object = self.backend.retrieve_object(file_id).await?;
        Ok(SyncedDownload {
            file_name: display_name(&object.name).to_string(),
            content: object.content,
        })
    }

    pub async fn delete(&self, file_id: &ObjectId) -> Result<(), BackendError> {
        self.backend.delete_object(file_id).await?;
        info!(file_id = %file_id, "Download deleted");
        Ok(())
    }
}

/// Stored names are `<id>_<name>`; keep the part after the first separator.
pub fn display_name(stored_name: &str) -> &str {
    match stored_name.split_once('_') {
        Some((_, name)) => name,
        None => stored_name,
    }
}
