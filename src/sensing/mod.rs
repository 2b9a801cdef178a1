pub mod controller;
pub mod device;
pub mod loop_worker;
pub mod walk;

pub use controller::AttentionController;
pub use device::{CaptureDevice, VirtualCamera};
pub use walk::{clamp_attention, AttentionSample, AttentionWalk};
