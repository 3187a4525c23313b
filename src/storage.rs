//! Storage collaborator for sessions and points.
//!
//! The engine never persists anything itself; it hands sessions and points
//! to a [`SessionStore`]. [`MemoryStore`] keeps everything in process and
//! backs the command-line tools and tests.

use std::collections::BTreeMap;

use crate::error::{HorizonError, Result};
use crate::session::{CaptureSession, HorizonPoint, PointUpdate, SessionUpdate};

/// Create/read/update/delete for sessions and their points
///
/// Failures surface as [`HorizonError::Persistence`] or
/// [`HorizonError::NotFound`] and are not retried by callers.
pub trait SessionStore {
    fn create_session(&mut self, session: CaptureSession) -> Result<()>;

    /// All sessions, most recent first
    fn list_sessions(&self) -> Result<Vec<CaptureSession>>;

    fn get_session(&self, id: &str) -> Result<CaptureSession>;

    fn update_session(&mut self, id: &str, update: &SessionUpdate) -> Result<CaptureSession>;

    /// Delete a session together with its points.
    fn delete_session(&mut self, id: &str) -> Result<()>;

    fn add_point(&mut self, point: HorizonPoint) -> Result<()>;

    /// Points of a session in capture order
    fn points(&self, session_id: &str) -> Result<Vec<HorizonPoint>>;

    fn update_point(&mut self, id: &str, update: &PointUpdate) -> Result<HorizonPoint>;

    fn delete_point(&mut self, id: &str) -> Result<()>;
}

/// In-process [`SessionStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: BTreeMap<String, CaptureSession>,
    points: Vec<HorizonPoint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}

fn session_not_found(id: &str) -> HorizonError {
    HorizonError::NotFound {
        kind: "session",
        id: id.to_string(),
    }
}

fn point_not_found(id: &str) -> HorizonError {
    HorizonError::NotFound {
        kind: "point",
        id: id.to_string(),
    }
}

impl SessionStore for MemoryStore {
    fn create_session(&mut self, session: CaptureSession) -> Result<()> {
        if self.sessions.contains_key(&session.id) {
            return Err(HorizonError::Persistence(format!(
                "session {} already exists",
                session.id
            )));
        }
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<CaptureSession>> {
        let mut sessions: Vec<CaptureSession> = self.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| b.start_time_ms.cmp(&a.start_time_ms));
        Ok(sessions)
    }

    fn get_session(&self, id: &str) -> Result<CaptureSession> {
        self.sessions
            .get(id)
            .cloned()
            .ok_or_else(|| session_not_found(id))
    }

    fn update_session(&mut self, id: &str, update: &SessionUpdate) -> Result<CaptureSession> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| session_not_found(id))?;
        session.apply(update);
        Ok(session.clone())
    }

    fn delete_session(&mut self, id: &str) -> Result<()> {
        self.sessions
            .remove(id)
            .ok_or_else(|| session_not_found(id))?;
        self.points.retain(|p| p.session_id != id);
        Ok(())
    }

    fn add_point(&mut self, point: HorizonPoint) -> Result<()> {
        if !self.sessions.contains_key(&point.session_id) {
            return Err(session_not_found(&point.session_id));
        }
        if point.id.is_empty() || self.points.iter().any(|p| p.id == point.id) {
            return Err(HorizonError::Persistence(format!(
                "cannot store point with id {:?}",
                point.id
            )));
        }
        self.points.push(point);
        Ok(())
    }

    fn points(&self, session_id: &str) -> Result<Vec<HorizonPoint>> {
        if !self.sessions.contains_key(session_id) {
            return Err(session_not_found(session_id));
        }
        Ok(self
            .points
            .iter()
            .filter(|p| p.session_id == session_id)
            .cloned()
            .collect())
    }

    fn update_point(&mut self, id: &str, update: &PointUpdate) -> Result<HorizonPoint> {
        let point = self
            .points
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| point_not_found(id))?;
        update.apply(point);
        Ok(point.clone())
    }

    fn delete_point(&mut self, id: &str) -> Result<()> {
        let index = self
            .points
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| point_not_found(id))?;
        self.points.remove(index);
        Ok(())
    }
}
