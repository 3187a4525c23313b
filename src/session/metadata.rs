use serde::{Deserialize, Serialize};

/// One outing of capturing points at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSession {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch
    pub start_time_ms: u64,
    #[serde(default)]
    pub end_time_ms: Option<u64>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub total_points: usize,
}

impl CaptureSession {
    pub fn new(id: impl Into<String>, name: impl Into<String>, start_time_ms: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_time_ms,
            end_time_ms: None,
            location_name: None,
            latitude: None,
            longitude: None,
            total_points: 0,
        }
    }

    pub fn with_location(mut self, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        self.location_name = Some(name.into());
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn is_active(&self) -> bool {
        self.end_time_ms.is_none()
    }

    pub fn apply(&mut self, update: &SessionUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(end) = update.end_time_ms {
            self.end_time_ms = Some(end);
        }
        if let Some(location) = &update.location_name {
            self.location_name = Some(location.clone());
        }
        if let Some(lat) = update.latitude {
            self.latitude = Some(lat);
        }
        if let Some(lon) = update.longitude {
            self.longitude = Some(lon);
        }
        if let Some(total) = update.total_points {
            self.total_points = total;
        }
    }
}

/// Partial edit of session metadata; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub name: Option<String>,
    pub end_time_ms: Option<u64>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_points: Option<usize>,
}
