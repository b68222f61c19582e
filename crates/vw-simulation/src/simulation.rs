use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use vw_core::{Entity, EntityId, EntityKind, Frames, ImageStore, WorldModel};

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::scheduler::EventScheduler;

/// The top-level simulation orchestrator.
///
/// Owns the world, scheduler, RNG, event log, and image provider. Drivers
/// place entities through [`spawn`](Self::spawn) (or build the world first and
/// call [`seed_all`](Self::seed_all)), then push simulated time forward.
pub struct Simulation {
    world: WorldModel,
    scheduler: EventScheduler,
    rng: StdRng,
    events: EventLog,
    images: Box<dyn ImageStore>,
    config: SimConfig,
    target: u64,
    seeded: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("now", &self.scheduler.now())
            .field("target", &self.target)
            .field("live", &self.world.live_count())
            .field("pending", &self.scheduler.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create a new simulation from a world, configuration, and image provider.
    ///
    /// Entities already in `world` have nothing scheduled until
    /// [`seed_all`](Self::seed_all) is called.
    pub fn new(world: WorldModel, config: SimConfig, images: impl ImageStore + 'static) -> Self {
        let scheduler = EventScheduler::new(config.time_scale)
            .with_max_dispatch(config.max_dispatch_per_advance);
        Self {
            world,
            scheduler,
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            images: Box::new(images),
            config,
            target: 0,
            seeded: false,
        }
    }

    /// Place `entity` on a free cell and seed its actions.
    ///
    /// Fails with [`CoreError::OccupiedPosition`](vw_core::CoreError::OccupiedPosition)
    /// if the cell is taken. An out-of-bounds entity is stored but never
    /// scheduled.
    pub fn spawn(&mut self, entity: Entity) -> SimResult<EntityId> {
        let (kind, at) = (entity.kind, entity.position());
        let description = format!("{} ({kind}) placed at {at}", entity.name);
        let id = self.world.try_add_entity(entity)?;
        if !self.world.is_live(id) {
            tracing::debug!(%id, %kind, %at, "placed off-grid; not scheduled");
            return Ok(id);
        }

        self.scheduler
            .schedule_actions(&self.world, id, &self.config.rules)?;
        self.events.push(SimEvent::new(
            self.scheduler.now(),
            SimEventKind::Spawned { entity: id, kind, at },
            description,
        ));
        Ok(id)
    }

    /// Seed actions for every live entity, in creation order.
    ///
    /// Only the first call does anything, and entities that already have
    /// pending events (placed through [`spawn`](Self::spawn)) are skipped.
    pub fn seed_all(&mut self) -> SimResult<()> {
        if self.seeded {
            return Ok(());
        }
        let ids: Vec<EntityId> = self
            .world
            .entities()
            .map(|(id, _)| id)
            .filter(|id| self.scheduler.pending_count(*id) == 0)
            .collect();
        let count = ids.len();
        for id in ids {
            self.scheduler
                .schedule_actions(&self.world, id, &self.config.rules)?;
        }
        self.seeded = true;
        tracing::debug!(count, "seeded world");
        Ok(())
    }

    /// Cancel `id`'s pending events and take it off the grid.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        self.scheduler.unschedule_all_events(id);
        let Some(kind) = self.world.entity(id).map(|e| e.kind) else {
            return false;
        };
        let removed = self.world.remove_entity(id);
        if removed {
            self.events.push(SimEvent::new(
                self.scheduler.now(),
                SimEventKind::Removed { entity: id, kind },
                format!("{id} ({kind}) despawned"),
            ));
        }
        removed
    }

    /// Dispatch everything due strictly before `time`.
    ///
    /// If the dispatch cap cuts the call short the clock lags behind `time`,
    /// but `time` is still remembered as the driver's target.
    pub fn advance_to(&mut self, time: u64) -> SimResult<usize> {
        self.target = self.target.max(time);
        let mut ctx = SimContext {
            world: &mut self.world,
            images: self.images.as_ref(),
            rng: &mut self.rng,
            events: &mut self.events,
            rules: &self.config.rules,
        };
        self.scheduler.advance_to(time, &mut ctx)
    }

    /// Advance `delta` ms past the last requested target.
    pub fn advance_by(&mut self, delta: u64) -> SimResult<usize> {
        self.advance_to(self.target.saturating_add(delta))
    }

    /// Drive `steps` ticks of `step` ms each. Returns the total events dispatched.
    pub fn run(&mut self, steps: u64, step: u64) -> SimResult<usize> {
        let mut dispatched = 0;
        for _ in 0..steps {
            dispatched += self.advance_by(step)?;
        }
        Ok(dispatched)
    }

    /// The world.
    pub fn world(&self) -> &WorldModel {
        &self.world
    }

    /// The scheduler, for inspecting pending events.
    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        self.scheduler.clock()
    }

    /// Current simulated time in ms.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// The latest time the driver asked to reach. Equals [`now`](Self::now)
    /// unless a dispatch cap deferred some events.
    pub fn target(&self) -> u64 {
        self.target
    }

    /// The journal of rule effects.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The configuration this run was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Frames the image provider hands out for `kind`.
    pub fn frames(&self, kind: EntityKind) -> Frames {
        self.images.frames(kind.sprite_key())
    }

    /// Live entities per kind. Kinds with none are omitted.
    pub fn census(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for (_, entity) in self.world.entities() {
            *counts.entry(entity.kind).or_insert(0) += 1;
        }
        counts
    }
}
