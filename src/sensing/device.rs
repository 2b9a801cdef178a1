use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{FocusError, FocusResult};

/// Whatever feeds the attention signal: a webcam, a wearable, a test double.
pub trait CaptureDevice: Send + Sync {
    fn name(&self) -> &str;

    /// Requests access. A refusal leaves the source unstarted; the caller
    /// may ask again later.
    fn acquire(&self) -> FocusResult<()>;
}

/// Stand-in camera whose permission can be flipped at runtime.
#[derive(Debug)]
pub struct VirtualCamera {
    available: AtomicBool,
}

impl VirtualCamera {
    pub fn available() -> Self {
        Self {
            available: AtomicBool::new(true),
        }
    }

    pub fn denied() -> Self {
        Self {
            available: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl CaptureDevice for VirtualCamera {
    fn name(&self) -> &str {
        "virtual-camera"
    }

    fn acquire(&self) -> FocusResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(FocusError::CaptureUnavailable(
                "camera permission denied".into(),
            ))
        }
    }
}
