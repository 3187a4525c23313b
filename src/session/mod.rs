pub mod coverage;
pub mod metadata;
pub mod point;
pub mod store;

pub use coverage::{CoverageAnalyzer, CoverageStatus, Gap, HorizonStatistics};
pub use metadata::{CaptureSession, SessionUpdate};
pub use point::{HorizonPoint, PointUpdate};
pub use store::PointStore;
