use rand::SeedableRng;
use rand::rngs::StdRng;
use vw_core::{Background, Entity, EntityId, StaticImageStore, WorldModel};

use crate::config::RulesConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::EventLog;
use crate::scheduler::EventScheduler;

/// Loose parts of a simulation, for poking at the scheduler and rules directly.
pub(crate) struct Harness {
    pub world: WorldModel,
    pub scheduler: EventScheduler,
    pub rng: StdRng,
    pub events: EventLog,
    pub images: StaticImageStore,
    pub rules: RulesConfig,
}

impl Harness {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            world: WorldModel::new(rows, cols, Background::new("grass")),
            scheduler: EventScheduler::new(1.0),
            rng: StdRng::seed_from_u64(7),
            events: EventLog::new(0),
            images: StaticImageStore::new(),
            rules: RulesConfig::default(),
        }
    }

    /// Place strictly and seed its actions.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = self.world.try_add_entity(entity).unwrap();
        self.scheduler
            .schedule_actions(&self.world, id, &self.rules)
            .unwrap();
        id
    }

    pub fn advance_to(&mut self, time: u64) -> SimResult<usize> {
        let mut ctx = SimContext {
            world: &mut self.world,
            images: &self.images,
            rng: &mut self.rng,
            events: &mut self.events,
            rules: &self.rules,
        };
        self.scheduler.advance_to(time, &mut ctx)
    }
}
