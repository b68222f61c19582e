/// Simulated time in milliseconds, plus the scale applied to delays.
///
/// The clock only moves forward. While an event is being dispatched it reads
/// that event's due time.
#[derive(Debug, Clone)]
pub struct SimClock {
    now: u64,
    time_scale: f64,
}

impl SimClock {
    /// A clock at time 0.
    pub fn new(time_scale: f64) -> Self {
        Self {
            now: 0,
            time_scale: time_scale.max(0.0),
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// The configured delay multiplier.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Move the clock to `time`. Earlier times are ignored.
    pub fn advance_to(&mut self, time: u64) -> u64 {
        self.now = self.now.max(time);
        self.now
    }

    /// Due time for something `delay` ms from now, after scaling.
    pub fn due_after(&self, delay: u64) -> u64 {
        let scaled = (delay as f64 * self.time_scale) as u64;
        self.now.saturating_add(scaled)
    }
}
