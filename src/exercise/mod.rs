pub mod detector;
pub mod phase;
pub mod session;

pub use detector::{parse_selection, ExerciseDetector, ExerciseKind};
pub use phase::{MotionState, PhaseSignal, Thresholds, DEFAULT_HYSTERESIS};
pub use session::ExerciseSession;
