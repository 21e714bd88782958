//! Planet Nife landing sequence: star field flight, blob planet, fly-through into a
//! furnished room.
//!
//! The library holds everything that does not need a GPU, so the whole cinematic can
//! be driven and checked with simulated time. The `nife` binary adds the window and
//! the render passes.

pub mod camera_path;
pub mod config;
pub mod orbit;
pub mod overlay;
pub mod phase;
pub mod scene;
pub mod session;

pub use camera_path::{ease_in_out_quad, progress, travel_pose, EnterPath, EnterSample, EnterSegment, Pose};
pub use config::{LandingConfig, OrbitConfig, SequenceConfig};
pub use orbit::OrbitControls;
pub use overlay::{format_datetime, DateSource, FixedClock, LocalClock, Overlay, OverlayText, TextAnchor};
pub use phase::{Phase, PhaseMachine, SequenceError};
pub use session::{SceneSession, SequenceEvent};
