pub mod angle;
pub mod keypoint;

pub use angle::{angle_between, AngleCalculator, Joint, Side, DEFAULT_CONFIDENCE_THRESHOLD};
pub use keypoint::{Keypoint, KeypointIndex, Pose};
