use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SnapshotDto {
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LiveUsageDto {
    pub enabled: bool,
}
