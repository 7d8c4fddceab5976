//! Progress reporting for a catalog run.

/// Sent after each rule has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTick {
    /// Rules applied so far, starting at 1.
    pub current: usize,
    /// Number of rules in the catalog.
    pub total: usize,
    /// Identifier of the rule that just finished.
    pub rule: &'static str,
}

impl ProgressTick {
    /// Completion as a percentage.
    ///
    /// # Examples
    ///
    /// ```
    /// use wtv_transform::ProgressTick;
    ///
    /// let tick = ProgressTick { current: 1, total: 4, rule: "mode" };
    /// assert!((tick.percent() - 25.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.current as f64 / self.total as f64) * 100.0
    }
}

/// Receives one [`ProgressTick`] per applied rule.
///
/// Any `FnMut(ProgressTick)` is a sink:
///
/// ```
/// use wtv_transform::{Progress, ProgressTick};
///
/// let mut seen = Vec::new();
/// let mut sink = |tick: ProgressTick| seen.push(tick.current);
/// sink.tick(ProgressTick { current: 1, total: 1, rule: "vite-base" });
/// assert_eq!(seen, [1]);
/// ```
pub trait Progress {
    /// Called after a rule completes.
    fn tick(&mut self, tick: ProgressTick);
}

impl<F: FnMut(ProgressTick)> Progress for F {
    fn tick(&mut self, tick: ProgressTick) {
        self(tick);
    }
}

/// A sink that ignores every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn tick(&mut self, _tick: ProgressTick) {}
}
