use super::{CoverageAnalyzer, CoverageStatus, Gap, HorizonPoint, HorizonStatistics, PointUpdate};
use crate::config::CaptureConfig;
use crate::error::{HorizonError, Result};

/// In-memory point set of the active capture session
///
/// Points are kept in capture order. Ids not supplied by the caller are
/// assigned as `<session>-<sequence>`.
pub struct PointStore {
    session_id: String,
    points: Vec<HorizonPoint>,
    next_sequence: u64,
    analyzer: CoverageAnalyzer,
}

impl PointStore {
    pub fn new(session_id: impl Into<String>, config: &CaptureConfig) -> Self {
        Self {
            session_id: session_id.into(),
            points: Vec::new(),
            next_sequence: 1,
            analyzer: CoverageAnalyzer::new(config),
        }
    }

    /// Seed a store with points loaded from storage.
    pub fn with_points(
        session_id: impl Into<String>,
        config: &CaptureConfig,
        points: Vec<HorizonPoint>,
    ) -> Result<Self> {
        let mut store = Self::new(session_id, config);
        for point in points {
            store.add_point(point)?;
        }
        Ok(store)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn analyzer(&self) -> &CoverageAnalyzer {
        &self.analyzer
    }

    /// Append a point to the session.
    ///
    /// The point must belong to this session (an empty `session_id` is
    /// adopted) and its id, if given, must be unused.
    pub fn add_point(&mut self, mut point: HorizonPoint) -> Result<&HorizonPoint> {
        if point.session_id.is_empty() {
            point.session_id = self.session_id.clone();
        } else if point.session_id != self.session_id {
            return Err(HorizonError::InvalidPoint(format!(
                "point belongs to session {}, not {}",
                point.session_id, self.session_id
            )));
        }

        if point.id.is_empty() {
            point.id = self.next_id();
        } else if self.get(&point.id).is_some() {
            return Err(HorizonError::InvalidPoint(format!(
                "duplicate point id {}",
                point.id
            )));
        }

        point.normalize();
        log::debug!(
            "Point {} captured at {:.1}° / {:.1}°",
            point.id,
            point.azimuth,
            point.altitude
        );

        let index = self.points.len();
        self.points.push(point);
        Ok(&self.points[index])
    }

    pub fn update_point(&mut self, id: &str, update: &PointUpdate) -> Result<&HorizonPoint> {
        let point = self
            .points
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;
        update.apply(point);
        Ok(point)
    }

    pub fn remove_point(&mut self, id: &str) -> Result<HorizonPoint> {
        let index = self
            .points
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;
        Ok(self.points.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&HorizonPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn points(&self) -> &[HorizonPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn coverage(&self) -> f32 {
        self.analyzer.coverage(&self.points)
    }

    pub fn gaps(&self) -> Vec<Gap> {
        self.analyzer.gaps(&self.points)
    }

    pub fn is_complete(&self) -> bool {
        self.analyzer.is_complete(&self.points)
    }

    pub fn status(&self) -> CoverageStatus {
        self.analyzer.status(&self.points)
    }

    pub fn statistics(&self) -> HorizonStatistics {
        self.analyzer.statistics(&self.points)
    }

    fn next_id(&mut self) -> String {
        loop {
            let id = format!("{}-{}", self.session_id, self.next_sequence);
            self.next_sequence += 1;
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn not_found(id: &str) -> HorizonError {
    HorizonError::NotFound {
        kind: "point",
        id: id.to_string(),
    }
}
