// Repository trait for vaccination dataset access
use crate::domain::area::AreaTimeSeries;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Every usable area with its records, ordered by source identifier.
    /// Areas failing population checks are already left out.
    async fn load_areas(&self) -> anyhow::Result<Vec<AreaTimeSeries>>;

    /// Source identifier to map code.
    async fn load_code_table(&self) -> anyhow::Result<HashMap<String, String>>;

    /// Every code the map can draw.
    async fn load_canonical_codes(&self) -> anyhow::Result<Vec<String>>;
}
