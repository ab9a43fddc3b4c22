use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{BloodType, Donor};
use crate::kernel::BaseDonorRegistry;

/// Storage-level lookup filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorFilter {
    pub blood_type: Option<BloodType>,
    /// Exact, case-insensitive city match.
    pub city: Option<String>,
}

impl DonorFilter {
    pub fn by_blood_type(blood_type: BloodType) -> Self {
        Self {
            blood_type: Some(blood_type),
            city: None,
        }
    }

    pub fn matches(&self, donor: &Donor) -> bool {
        if let Some(bt) = self.blood_type {
            if donor.blood_type != bt {
                return false;
            }
        }
        match (&self.city, &donor.city) {
            (None, _) => true,
            (Some(wanted), Some(city)) => city.trim().eq_ignore_ascii_case(wanted.trim()),
            (Some(_), None) => false,
        }
    }
}

/// Donor registry held in process memory.
///
/// Backs the drill binary and tests; production deployments plug their document
/// store in through [`BaseDonorRegistry`].
#[derive(Default)]
pub struct InMemoryDonorRegistry {
    donors: RwLock<Vec<Donor>>,
}

impl InMemoryDonorRegistry {
    pub fn new(donors: Vec<Donor>) -> Self {
        Self {
            donors: RwLock::new(donors),
        }
    }

    /// Load donors from a JSON array on disk.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read donor file {}", path.display()))?;
        let donors: Vec<Donor> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse donor file {}", path.display()))?;

        info!(count = donors.len(), path = %path.display(), "Loaded donor registry");
        Ok(Self::new(donors))
    }

    pub async fn insert(&self, donor: Donor) {
        self.donors.write().await.push(donor);
    }

    pub async fn len(&self) -> usize {
        self.donors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.donors.read().await.is_empty()
    }
}

#[async_trait]
impl BaseDonorRegistry for InMemoryDonorRegistry {
    async fn list_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>> {
        Ok(self
            .donors
            .read()
            .await
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }
}
