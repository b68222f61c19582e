use rand::rngs::StdRng;
use vw_core::{Frames, ImageStore, WorldModel};

use crate::config::RulesConfig;
use crate::event::{EventLog, SimEvent, SimEventKind};

/// Everything an action may touch besides the scheduler itself.
pub struct SimContext<'a> {
    /// The world being simulated.
    pub world: &'a mut WorldModel,
    /// Frame lists for newly spawned entities.
    pub images: &'a dyn ImageStore,
    /// The run's only randomness source.
    pub rng: &'a mut StdRng,
    /// Journal of what the rules did.
    pub events: &'a mut EventLog,
    /// Rule constants.
    pub rules: &'a RulesConfig,
}

impl SimContext<'_> {
    /// Record an event at simulated time `time`.
    pub fn emit(&mut self, time: u64, kind: SimEventKind, description: impl Into<String>) {
        self.events.push(SimEvent::new(time, kind, description));
    }

    /// Frames for sprite `key`.
    pub fn frames(&self, key: &str) -> Frames {
        self.images.frames(key)
    }
}
