use std::collections::{BTreeMap, HashMap};

use vw_core::{EntityId, EntityKind, WorldModel};

use crate::action::{Action, Repeat};
use crate::clock::SimClock;
use crate::config::RulesConfig;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};

/// A pending action, due at `time`, owned by `entity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// What to run.
    pub action: Action,
    /// Simulated time at which it becomes due.
    pub time: u64,
    /// The entity the action belongs to.
    pub entity: EntityId,
}

/// Queue position: due time first, then insertion order.
type EventKey = (u64, u64);

/// Time-ordered queue of pending actions with per-entity cancellation.
///
/// Events fire in ascending due time; events due at the same time fire in the
/// order they were scheduled.
#[derive(Debug)]
pub struct EventScheduler {
    queue: BTreeMap<EventKey, Event>,
    pending: HashMap<EntityId, Vec<EventKey>>,
    clock: SimClock,
    next_seq: u64,
    max_dispatch: usize,
}

impl EventScheduler {
    /// An empty scheduler at time 0.
    pub fn new(time_scale: f64) -> Self {
        Self {
            queue: BTreeMap::new(),
            pending: HashMap::new(),
            clock: SimClock::new(time_scale),
            next_seq: 0,
            max_dispatch: usize::MAX,
        }
    }

    /// Cap the number of events a single [`advance_to`](Self::advance_to) call
    /// may dispatch.
    pub fn with_max_dispatch(mut self, max: usize) -> Self {
        self.max_dispatch = max.max(1);
        self
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Current simulated time.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Queue `action` for `entity`, due `delay` (scaled) ms from now.
    pub fn schedule_event(&mut self, entity: EntityId, action: Action, delay: u64) {
        let time = self.clock.due_after(delay);
        let key = (time, self.next_seq);
        self.next_seq += 1;

        self.queue.insert(
            key,
            Event {
                action,
                time,
                entity,
            },
        );
        self.pending.entry(entity).or_default().push(key);
    }

    /// Drop every pending event owned by `entity`. No-op if it has none.
    pub fn unschedule_all_events(&mut self, entity: EntityId) {
        if let Some(keys) = self.pending.remove(&entity) {
            for key in keys {
                self.queue.remove(&key);
            }
        }
    }

    fn remove_pending(&mut self, entity: EntityId, key: EventKey) {
        if let Some(keys) = self.pending.get_mut(&entity) {
            keys.retain(|k| *k != key);
            if keys.is_empty() {
                self.pending.remove(&entity);
            }
        }
    }

    /// Seed the recurring behaviour for a freshly placed entity.
    ///
    /// Miners and blobs get an activity and an endless animation, quakes a
    /// bounded animation plus the activity that ends them, ore and veins an
    /// activity only. Blacksmiths and obstacles get nothing.
    pub fn schedule_actions(
        &mut self,
        world: &WorldModel,
        id: EntityId,
        rules: &RulesConfig,
    ) -> SimResult<()> {
        let entity = world.entity(id).ok_or(SimError::UnknownEntity(id))?;
        match entity.kind {
            EntityKind::MinerFull | EntityKind::MinerNotFull | EntityKind::OreBlob => {
                let animation = entity.animation_period()?;
                self.schedule_event(id, Action::Activity, entity.action_period);
                self.schedule_event(id, Action::Animation(Repeat::Forever), animation);
            }
            EntityKind::Quake => {
                let animation = entity.animation_period()?;
                let repeat = Repeat::from_count(rules.quake_animation_repeat);
                self.schedule_event(id, Action::Activity, entity.action_period);
                self.schedule_event(id, Action::Animation(repeat), animation);
            }
            EntityKind::Ore | EntityKind::Vein => {
                self.schedule_event(id, Action::Activity, entity.action_period);
            }
            EntityKind::Blacksmith | EntityKind::Obstacle => {}
        }
        Ok(())
    }

    /// Dispatch every event due strictly before `time`, oldest first.
    ///
    /// Events scheduled by a dispatched action fire in the same call if they
    /// are also due before `time`. Events for entities that are no longer live
    /// are dropped without running. Returns the number of actions run.
    ///
    /// An action error is returned as-is. The failing event is already off the
    /// queue, so calling again resumes with everything else.
    pub fn advance_to(&mut self, time: u64, ctx: &mut SimContext<'_>) -> SimResult<usize> {
        let mut dispatched = 0;

        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 >= time {
                break;
            }
            if dispatched >= self.max_dispatch {
                tracing::warn!(
                    dispatched,
                    remaining = self.queue.len(),
                    target = time,
                    "dispatch cap reached; deferring remaining events"
                );
                return Ok(dispatched);
            }

            let (key, event) = entry.remove_entry();
            self.remove_pending(event.entity, key);
            self.clock.advance_to(event.time);

            if !ctx.world.is_live(event.entity) {
                tracing::trace!(entity = %event.entity, action = ?event.action, "dropping event for dead entity");
                continue;
            }

            tracing::trace!(time = event.time, entity = %event.entity, action = ?event.action, "dispatch");
            dispatched += 1;
            event.action.execute(event.entity, self, ctx)?;
        }

        self.clock.advance_to(time);
        Ok(dispatched)
    }

    /// Number of pending events owned by `entity`.
    pub fn pending_count(&self, entity: EntityId) -> usize {
        self.pending.get(&entity).map_or(0, Vec::len)
    }

    /// Pending events owned by `entity`, soonest first.
    pub fn pending_events(&self, entity: EntityId) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .pending
            .get(&entity)
            .map(|keys| keys.iter().filter_map(|k| self.queue.get(k)).collect())
            .unwrap_or_default();
        events.sort_by_key(|e| e.time);
        events
    }

    /// Due time of the next event, if any.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|(time, _)| *time)
    }

    /// Total number of pending events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SimEventKind;
    use crate::test_support::Harness;
    use proptest::prelude::*;
    use vw_core::{CoreError, Entity, Frames, Point};

    fn obstacle(x: i32, y: i32) -> Entity {
        Entity::obstacle("rock", Point::new(x, y), Frames::new("obstacle", 1))
    }

    fn blob(x: i32, y: i32, frames: usize) -> Entity {
        Entity::ore_blob("blob", Point::new(x, y), 1_000_000, 10, Frames::new("blob", frames))
    }

    #[test]
    fn schedule_event_registers_pending() {
        let mut h = Harness::new(5, 5);
        let id = h.world.add_entity(obstacle(0, 0));
        h.scheduler.schedule_event(id, Action::Activity, 25);
        assert_eq!(h.scheduler.pending_count(id), 1);
        assert_eq!(h.scheduler.next_due(), Some(25));
        assert_eq!(h.scheduler.pending_events(id)[0].time, 25);
    }

    #[test]
    fn time_scale_stretches_delays() {
        let mut h = Harness::new(5, 5);
        h.scheduler = EventScheduler::new(2.0);
        let id = h.world.add_entity(obstacle(0, 0));
        h.scheduler.schedule_event(id, Action::Activity, 25);
        assert_eq!(h.scheduler.next_due(), Some(50));
    }

    #[test]
    fn advance_to_is_strict() {
        let mut h = Harness::new(5, 5);
        let id = h.spawn(blob(0, 0, 100));
        // Animation due at 10.
        assert_eq!(h.advance_to(10).unwrap(), 0);
        assert_eq!(h.world.entity(id).unwrap().current_frame(), 0);
        assert_eq!(h.advance_to(11).unwrap(), 1);
        assert_eq!(h.world.entity(id).unwrap().current_frame(), 1);
        assert_eq!(h.scheduler.now(), 11);
    }

    #[test]
    fn rescheduled_events_settle_within_one_call() {
        let mut h = Harness::new(5, 5);
        let id = h.spawn(blob(0, 0, 100));
        // Fires at 10, 20, 30, 40, 50.
        assert_eq!(h.advance_to(55).unwrap(), 5);
        assert_eq!(h.world.entity(id).unwrap().current_frame(), 5);
        assert_eq!(h.scheduler.pending_events(id)[0].time, 60);
    }

    #[test]
    fn unschedule_prevents_future_dispatch() {
        let mut h = Harness::new(5, 5);
        let id = h.spawn(blob(0, 0, 100));
        h.scheduler.unschedule_all_events(id);
        h.scheduler.unschedule_all_events(id);
        assert_eq!(h.scheduler.pending_count(id), 0);
        assert_eq!(h.advance_to(10_000).unwrap(), 0);
        assert_eq!(h.world.entity(id).unwrap().current_frame(), 0);
    }

    #[test]
    fn unschedule_leaves_other_entities_alone() {
        let mut h = Harness::new(5, 5);
        let a = h.spawn(blob(0, 0, 100));
        let b = h.spawn(blob(2, 2, 100));
        h.scheduler.unschedule_all_events(a);
        h.advance_to(31).unwrap();
        assert_eq!(h.world.entity(a).unwrap().current_frame(), 0);
        assert_eq!(h.world.entity(b).unwrap().current_frame(), 3);
    }

    #[test]
    fn finite_animation_stops_after_repeats() {
        let mut h = Harness::new(5, 5);
        let id = h.world.add_entity(blob(0, 0, 100));
        h.scheduler
            .schedule_event(id, Action::Animation(Repeat::Times(3)), 10);
        h.advance_to(1_000).unwrap();
        assert_eq!(h.world.entity(id).unwrap().current_frame(), 3);
        assert_eq!(h.scheduler.pending_count(id), 0);
    }

    #[test]
    fn single_shot_animation_fires_once() {
        let mut h = Harness::new(5, 5);
        let id = h.world.add_entity(blob(0, 0, 100));
        h.scheduler
            .schedule_event(id, Action::Animation(Repeat::Times(1)), 10);
        assert_eq!(h.advance_to(1_000).unwrap(), 1);
        assert!(h.scheduler.is_empty());
    }

    #[test]
    fn animation_on_static_kind_fails_without_corrupting_queue() {
        let mut h = Harness::new(5, 5);
        let rock = h.world.add_entity(obstacle(0, 0));
        let other = h.spawn(blob(2, 2, 100));
        h.scheduler
            .schedule_event(rock, Action::Animation(Repeat::Forever), 5);

        let err = h.advance_to(100).unwrap_err();
        assert_eq!(
            err,
            SimError::Core(CoreError::UnsupportedOperation {
                operation: "animation_period",
                kind: EntityKind::Obstacle,
            })
        );
        assert_eq!(h.scheduler.pending_count(rock), 0);
        assert_eq!(h.scheduler.pending_count(other), 2);

        h.advance_to(100).unwrap();
        assert_eq!(h.world.entity(other).unwrap().current_frame(), 9);
    }

    #[test]
    fn activity_on_static_kind_fails() {
        let mut h = Harness::new(5, 5);
        let smith = h.world.add_entity(Entity::blacksmith(
            "smith",
            Point::new(1, 1),
            Frames::new("blacksmith", 1),
        ));
        h.scheduler.schedule_event(smith, Action::Activity, 1);
        assert_eq!(
            h.advance_to(5).unwrap_err(),
            SimError::UnsupportedActivity(EntityKind::Blacksmith)
        );
    }

    #[test]
    fn events_for_removed_entities_are_dropped() {
        let mut h = Harness::new(5, 5);
        let rock = h.world.add_entity(obstacle(0, 0));
        h.scheduler.schedule_event(rock, Action::Activity, 1);
        h.world.remove_entity(rock);
        assert_eq!(h.advance_to(5).unwrap(), 0);
        assert!(h.scheduler.is_empty());
    }

    #[test]
    fn static_kinds_seed_nothing() {
        let mut h = Harness::new(5, 5);
        let rock = h.spawn(obstacle(0, 0));
        let smith = h.spawn(Entity::blacksmith(
            "smith",
            Point::new(1, 1),
            Frames::new("blacksmith", 1),
        ));
        assert_eq!(h.scheduler.pending_count(rock), 0);
        assert_eq!(h.scheduler.pending_count(smith), 0);
    }

    #[test]
    fn same_time_events_fire_in_insertion_order() {
        let mut h = Harness::new(5, 5);
        let frames = Frames::new("ore", 1);
        let first = h.spawn(Entity::ore("first", Point::new(4, 4), 10, frames.clone()));
        let second = h.spawn(Entity::ore("second", Point::new(0, 0), 10, frames));
        h.advance_to(11).unwrap();

        let removed: Vec<EntityId> = h
            .events
            .events()
            .iter()
            .filter_map(|e| match e.kind {
                SimEventKind::Removed { entity, .. } => Some(entity),
                _ => None,
            })
            .collect();
        assert_eq!(removed, vec![first, second]);
    }

    #[test]
    fn dispatch_cap_defers_runaway_cascades() {
        let mut h = Harness::new(3, 3);
        h.scheduler = EventScheduler::new(1.0).with_max_dispatch(4);
        // A zero-period vein reschedules itself at the same instant forever.
        let vein = h.spawn(Entity::vein("v", Point::new(1, 1), 0, Frames::new("vein", 1)));

        assert_eq!(h.advance_to(1).unwrap(), 4);
        assert_eq!(h.scheduler.now(), 0);
        assert_eq!(h.advance_to(1).unwrap(), 4);
        assert_eq!(h.scheduler.pending_count(vein), 1);
    }

    proptest! {
        #[test]
        fn dispatch_order_is_non_decreasing(delays in prop::collection::vec(100..500u64, 1..40)) {
            let mut h = Harness::new(8, 8);
            let mut ids = Vec::new();
            for (i, delay) in delays.iter().enumerate() {
                let pos = Point::new((i % 8) as i32, (i / 8) as i32);
                let id = h.world.add_entity(Entity::ore("o", pos, *delay, Frames::new("ore", 1)));
                h.scheduler.schedule_event(id, Action::Activity, *delay);
                ids.push(id);
            }
            h.advance_to(501).unwrap();

            let times: Vec<u64> = h
                .events
                .events()
                .iter()
                .filter(|e| matches!(e.kind, SimEventKind::Removed { .. }))
                .map(|e| e.time)
                .collect();
            prop_assert_eq!(times.len(), ids.len());
            prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
