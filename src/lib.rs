pub mod calibration;
pub mod capture;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod math;
pub mod orientation;
pub mod sensor;
pub mod session;
pub mod stability;
pub mod storage;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use calibration::{CalibrationController, CalibrationResult};
pub use capture::{CaptureProcessor, SensorStatus};
pub use config::HorizonConfig;
pub use error::{ExportError, HorizonError, Result};
pub use export::{ExportFormat, ExportSink, ExportedFile, HorizonExporter, HorizonProfile};
pub use orientation::{OrientationFilter, OrientationReading, RawSample};
pub use session::{CaptureSession, CoverageAnalyzer, HorizonPoint, PointStore};
pub use stability::{AccuracyScore, StabilityScorer};
pub use storage::{MemoryStore, SessionStore};
