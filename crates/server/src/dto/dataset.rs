use kartalla::timetable::Timetable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDto {
    pub path: String,
    pub gtfs_epoch: Option<i64>,
    pub json_epoch: Option<i64>,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub routes: usize,
    pub trips: usize,
    /// Live filters detached by a reload.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsubscribe: Vec<String>,
}

impl DatasetDto {
    pub fn from(path: String, timetable: &Timetable) -> Self {
        Self {
            path,
            gtfs_epoch: timetable.gtfs_epoch,
            json_epoch: timetable.json_epoch,
            first_date: timetable.dates.iter().min().map(ToString::to_string),
            last_date: timetable.dates.iter().max().map(ToString::to_string),
            routes: timetable.routes.len(),
            trips: timetable.trip_count(),
            unsubscribe: Vec::new(),
        }
    }
}
