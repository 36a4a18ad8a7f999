use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hardcase_core::{HardnessError, HardnessResult};

/// Cooperative cancellation flag shared between a caller and running measures.
///
/// Long measures poll it between rows or rounds, never in the middle of one.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this flag to stop.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Interrupted)` once the flag is set.
    pub fn check(&self) -> HardnessResult<()> {
        if self.is_triggered() {
            Err(HardnessError::Interrupted)
        } else {
            Ok(())
        }
    }
}
