//! Per-sample pipeline and capture session lifecycle.

use crossbeam_channel::Receiver;
use serde::Serialize;

use crate::calibration::{CalibrationController, CalibrationResult};
use crate::config::{FusionMethod, HorizonConfig};
use crate::error::{HorizonError, Result};
use crate::export::{ExportFormat, ExportedFile, HorizonExporter, HorizonProfile};
use crate::orientation::{OrientationFilter, OrientationReading, RawSample};
use crate::session::{
    CaptureSession, CoverageStatus, Gap, HorizonPoint, HorizonStatistics, PointStore, PointUpdate,
    SessionUpdate,
};
use crate::stability::StabilityScorer;
use crate::storage::SessionStore;

/// Which sensor channels have delivered data since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SensorStatus {
    pub accelerometer: bool,
    pub magnetometer: bool,
    pub attitude: bool,
    pub heading: bool,
}

impl SensorStatus {
    fn record(&mut self, sample: &RawSample) {
        self.accelerometer |= sample.gravity.is_some();
        self.magnetometer |= sample.magnetic.is_some();
        self.attitude |= sample.attitude.is_some();
        self.heading |= sample.heading.is_some();
    }

    /// True once the channels the fusion method needs have been seen.
    pub fn is_available(&self, method: FusionMethod) -> bool {
        match method {
            FusionMethod::CrossProduct => self.accelerometer && self.magnetometer,
            FusionMethod::Heading => self.attitude || self.accelerometer,
        }
    }
}

struct ActiveSession {
    session: CaptureSession,
    points: PointStore,
}

/// Owns the filter, scorer and calibration controller, the active
/// session's points, and the storage collaborator they are saved to.
pub struct CaptureProcessor<S: SessionStore> {
    config: HorizonConfig,
    filter: OrientationFilter,
    scorer: StabilityScorer,
    calibration: CalibrationController,
    exporter: HorizonExporter,
    sensors: SensorStatus,
    store: S,
    active: Option<ActiveSession>,
}

impl<S: SessionStore> CaptureProcessor<S> {
    pub fn new(config: &HorizonConfig, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            filter: OrientationFilter::new(&config.fusion),
            scorer: StabilityScorer::new(&config.stability, config.fusion.method),
            calibration: CalibrationController::new(&config.calibration),
            exporter: HorizonExporter::new(&config.export, &config.capture),
            sensors: SensorStatus::default(),
            store,
            active: None,
        })
    }

    /// Run one sample through fusion and scoring.
    pub fn process_sample(&mut self, sample: &RawSample) -> Option<OrientationReading> {
        self.sensors.record(sample);
        if sample.is_empty() {
            log::debug!("Sample at {} ms carries no sensor data", sample.timestamp_ms);
            return None;
        }

        let reading = self.filter.update(sample)?;
        let accuracy = self.scorer.observe(reading.azimuth, reading.altitude);
        Some(reading.with_accuracy(accuracy))
    }

    /// Latest reading annotated with the current stability score
    pub fn current_reading(&self) -> Option<OrientationReading> {
        self.filter
            .current()
            .map(|r| r.with_accuracy(self.scorer.current()))
    }

    pub fn sensor_status(&self) -> SensorStatus {
        self.sensors
    }

    pub fn sensors_available(&self) -> bool {
        self.sensors.is_available(self.filter.method())
    }

    pub fn filter(&self) -> &OrientationFilter {
        &self.filter
    }

    pub fn config(&self) -> &HorizonConfig {
        &self.config
    }

    pub fn calibrate_snapshot(&mut self) -> CalibrationResult {
        self.calibration.snapshot(&mut self.filter, &self.scorer)
    }

    /// Timed calibration over a live stream; blocks for at most the
    /// configured duration.
    pub fn calibrate(&mut self, samples: &Receiver<RawSample>) -> CalibrationResult {
        self.calibration
            .calibrate(samples, &mut self.filter, &mut self.scorer)
    }

    pub fn start_session(&mut self, session: CaptureSession) -> Result<()> {
        if let Some(active) = &self.active {
            return Err(HorizonError::Session(format!(
                "session {} is still active",
                active.session.id
            )));
        }

        self.store.create_session(session.clone())?;
        log::info!(
            "Started session {} ({}) at {} resolution",
            session.id,
            session.name,
            self.config.capture.resolution
        );
        let points = PointStore::new(session.id.clone(), &self.config.capture);
        self.active = Some(ActiveSession { session, points });
        Ok(())
    }

    /// Reopen a stored session and continue capturing into it.
    pub fn resume_session(&mut self, id: &str) -> Result<()> {
        if self.active.is_some() {
            return Err(HorizonError::Session("another session is active".to_string()));
        }
        let session = self.store.get_session(id)?;
        let stored = self.store.points(id)?;
        let points = PointStore::with_points(id, &self.config.capture, stored)?;
        log::info!("Resumed session {} with {} points", id, points.len());
        self.active = Some(ActiveSession { session, points });
        Ok(())
    }

    /// Capture the current reading as a point.
    ///
    /// The point is kept in memory first; a storage failure is returned
    /// to the caller and the in-memory point stays.
    pub fn capture_point(&mut self, notes: Option<String>) -> Result<HorizonPoint> {
        let reading = self.current_reading().ok_or(HorizonError::NoReading)?;
        let active = self.active_mut()?;

        let mut point = HorizonPoint::from_reading(active.session.id.clone(), &reading);
        point.notes = notes;
        let point = active.points.add_point(point)?.clone();

        self.store.add_point(point.clone())?;
        Ok(point)
    }

    pub fn update_point(&mut self, id: &str, update: &PointUpdate) -> Result<HorizonPoint> {
        let point = self.active_mut()?.points.update_point(id, update)?.clone();
        self.store.update_point(id, update)?;
        Ok(point)
    }

    pub fn remove_point(&mut self, id: &str) -> Result<HorizonPoint> {
        let point = self.active_mut()?.points.remove_point(id)?;
        self.store.delete_point(id)?;
        Ok(point)
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    pub fn points(&self) -> &[HorizonPoint] {
        self.active
            .as_ref()
            .map(|a| a.points.points())
            .unwrap_or(&[])
    }

    pub fn coverage(&self) -> f32 {
        self.active.as_ref().map_or(0.0, |a| a.points.coverage())
    }

    pub fn gaps(&self) -> Vec<Gap> {
        self.active
            .as_ref()
            .map_or_else(Vec::new, |a| a.points.gaps())
    }

    pub fn is_complete(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.points.is_complete())
    }

    pub fn status(&self) -> CoverageStatus {
        self.active
            .as_ref()
            .map_or(CoverageStatus::KeepCapturing, |a| a.points.status())
    }

    pub fn statistics(&self) -> HorizonStatistics {
        self.active
            .as_ref()
            .map_or_else(HorizonStatistics::default, |a| a.points.statistics())
    }

    pub fn profile(&self) -> HorizonProfile {
        self.exporter.build_profile(self.points())
    }

    pub fn export(&self, format: ExportFormat) -> Result<ExportedFile> {
        let active = self
            .active
            .as_ref()
            .ok_or_else(|| HorizonError::Session("no active session".to_string()))?;
        self.exporter.export(
            format,
            &active.session,
            active.points.points(),
            active.points.statistics(),
        )
    }

    /// Close the active session, record its end time and point count, and
    /// drop the tilt baseline.
    ///
    /// The session stays active if the store rejects the update.
    pub fn end_session(&mut self, end_time_ms: u64) -> Result<CaptureSession> {
        let active = self
            .active
            .as_ref()
            .ok_or_else(|| HorizonError::Session("no active session".to_string()))?;

        let update = SessionUpdate {
            end_time_ms: Some(end_time_ms),
            total_points: Some(active.points.len()),
            ..Default::default()
        };
        let stored = self.store.update_session(&active.session.id, &update)?;
        log::info!(
            "Ended session {} with {} points, {:.1}% coverage",
            active.session.id,
            active.points.len(),
            active.points.coverage()
        );

        self.active = None;
        self.filter.clear_baseline();
        Ok(stored)
    }

    /// Forget fusion and scoring state, e.g. after the sensors restart.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.scorer.reset();
        self.sensors = SensorStatus::default();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn active_mut(&mut self) -> Result<&mut ActiveSession> {
        self.active
            .as_mut()
            .ok_or_else(|| HorizonError::Session("no active session".to_string()))
    }
}
