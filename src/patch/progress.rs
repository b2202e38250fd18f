//! Progress reporting for the patch pipeline.
//!
//! Classification, assembly, and packing each walk every face of the mesh. On
//! large meshes callers may want to see how far along that is, so the
//! `_with_progress` entry points accept a [`Progress`] callback.
//!
//! # Example
//!
//! ```
//! use gregory::patch::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 3, "Assembling patches");
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives `(current, total, message)`.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report progress of a stage that is one step of a larger run.
    ///
    /// `stage_current / stage_total` is mapped into step `step` of `steps`,
    /// scaled by 1000 so the callback still receives integers.
    #[inline]
    pub fn report_stage(
        &self,
        stage_current: usize,
        stage_total: usize,
        step: usize,
        steps: usize,
        message: &str,
    ) {
        if stage_total == 0 || steps == 0 {
            return;
        }
        let fraction = (stage_current.min(stage_total) * 1000) / stage_total;
        (self.callback)(step * 1000 + fraction, steps * 1000, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
