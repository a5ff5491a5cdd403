use huduma_core::validation::DEFAULT_URGENT_START_WINDOW_HOURS;

/// Tunables for [`LifecycleService`](crate::LifecycleService).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Lead time given to urgent requests submitted without a start time.
    pub urgent_start_window_hours: i64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            urgent_start_window_hours: DEFAULT_URGENT_START_WINDOW_HOURS,
        }
    }
}
