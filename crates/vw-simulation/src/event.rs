use vw_core::{EntityId, EntityKind, Point};

/// What a rule did to the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEventKind {
    /// An entity was placed and its actions seeded.
    Spawned {
        /// The new entity.
        entity: EntityId,
        /// Its kind.
        kind: EntityKind,
        /// Where it was placed.
        at: Point,
    },
    /// An entity left the world and lost its pending actions.
    Removed {
        /// The removed entity.
        entity: EntityId,
        /// Its kind.
        kind: EntityKind,
    },
    /// An entity took one step.
    Moved {
        /// The entity that moved.
        entity: EntityId,
        /// The cell it left.
        from: Point,
        /// The cell it entered.
        to: Point,
    },
    /// An entity was replaced by a successor of another kind.
    Transformed {
        /// The retired entity.
        from: EntityId,
        /// Its successor.
        to: EntityId,
        /// The successor's kind.
        kind: EntityKind,
    },
    /// A miner picked up a piece of ore.
    Mined {
        /// The miner.
        miner: EntityId,
        /// The ore it consumed.
        ore: EntityId,
    },
    /// A blob reached a vein and set off a quake.
    Erupted {
        /// The blob.
        blob: EntityId,
        /// The vein it destroyed.
        vein: EntityId,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::Spawned { entity, .. }
            | Self::Removed { entity, .. }
            | Self::Moved { entity, .. } => *entity == id,
            Self::Transformed { from, to, .. } => *from == id || *to == id,
            Self::Mined { miner, ore } => *miner == id || *ore == id,
            Self::Erupted { blob, vein } => *blob == id || *vein == id,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// Simulated time at which it happened.
    pub time: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given time, kind, and description.
    pub fn new(time: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// A journal keeping at most `capacity` records (0 keeps everything).
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events: capacity,
        }
    }

    /// Record `event`. Once over capacity the oldest records fall off.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        let excess = self.events.len().saturating_sub(self.max_events);
        if self.max_events > 0 && excess > 0 {
            self.events.drain(..excess);
        }
    }

    /// Every retained record, oldest first.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Records stamped with simulated time `time`.
    pub fn events_at(&self, time: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.time == time).collect()
    }

    /// Records that name `id` in any role.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` when nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
