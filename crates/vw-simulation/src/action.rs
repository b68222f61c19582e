use vw_core::EntityId;

use crate::activity;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::scheduler::EventScheduler;

/// How many more times an animation fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Reschedule for as long as the entity lives.
    Forever,
    /// Fire this many more times, this firing included. `Times(1)` fires once.
    Times(u32),
}

impl Repeat {
    /// Map a raw repeat count, where 0 means forever.
    pub fn from_count(count: u32) -> Self {
        if count == 0 {
            Self::Forever
        } else {
            Self::Times(count)
        }
    }

    /// The counter for the next firing, or `None` when this was the last one.
    pub fn next(self) -> Option<Repeat> {
        match self {
            Self::Forever => Some(Self::Forever),
            Self::Times(n) if n > 1 => Some(Self::Times(n - 1)),
            Self::Times(_) => None,
        }
    }
}

/// A unit of deferred work owned by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Advance the entity's frame, then reschedule while repeats remain.
    Animation(Repeat),
    /// Run the entity's kind-specific rule once.
    Activity,
}

impl Action {
    /// Run this action on behalf of `entity`.
    pub fn execute(
        self,
        entity: EntityId,
        scheduler: &mut EventScheduler,
        ctx: &mut SimContext<'_>,
    ) -> SimResult<()> {
        match self {
            Self::Animation(repeat) => animate(entity, repeat, scheduler, ctx),
            Self::Activity => activity::execute(entity, scheduler, ctx),
        }
    }
}

fn animate(
    id: EntityId,
    repeat: Repeat,
    scheduler: &mut EventScheduler,
    ctx: &mut SimContext<'_>,
) -> SimResult<()> {
    let entity = ctx.world.entity_mut(id).ok_or(SimError::UnknownEntity(id))?;
    let period = entity.animation_period()?;
    entity.next_image();

    if let Some(next) = repeat.next() {
        scheduler.schedule_event(id, Action::Animation(next), period);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_from_count() {
        assert_eq!(Repeat::from_count(0), Repeat::Forever);
        assert_eq!(Repeat::from_count(3), Repeat::Times(3));
    }

    #[test]
    fn repeat_counts_down_to_none() {
        assert_eq!(Repeat::Times(3).next(), Some(Repeat::Times(2)));
        assert_eq!(Repeat::Times(2).next(), Some(Repeat::Times(1)));
        assert_eq!(Repeat::Times(1).next(), None);
        assert_eq!(Repeat::Times(0).next(), None);
        assert_eq!(Repeat::Forever.next(), Some(Repeat::Forever));
    }
}
