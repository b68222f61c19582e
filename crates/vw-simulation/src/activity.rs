//! Each rule runs once per firing and either reschedules the entity's next
//! activity or replaces the entity (transform/destroy), in which case the
//! successor's actions are seeded instead.

use rand::Rng;
use rand::rngs::StdRng;
use vw_core::{Entity, EntityId, EntityKind, Point};

use crate::action::Action;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::movement::{Passability, next_position};
use crate::scheduler::EventScheduler;

/// Run the activity rule for `id`'s kind.
pub fn execute(
    id: EntityId,
    scheduler: &mut EventScheduler,
    ctx: &mut SimContext<'_>,
) -> SimResult<()> {
    let kind = entity(ctx, id)?.kind;
    match kind {
        EntityKind::MinerFull => miner_full(id, scheduler, ctx),
        EntityKind::MinerNotFull => miner_not_full(id, scheduler, ctx),
        EntityKind::Ore => ore(id, scheduler, ctx),
        EntityKind::OreBlob => ore_blob(id, scheduler, ctx),
        EntityKind::Quake => quake(id, scheduler, ctx),
        EntityKind::Vein => vein(id, scheduler, ctx),
        EntityKind::Blacksmith | EntityKind::Obstacle => Err(SimError::UnsupportedActivity(kind)),
    }
}

fn entity<'a>(ctx: &'a SimContext<'_>, id: EntityId) -> SimResult<&'a Entity> {
    ctx.world.entity(id).ok_or(SimError::UnknownEntity(id))
}

fn miner_full(
    id: EntityId,
    scheduler: &mut EventScheduler,
    ctx: &mut SimContext<'_>,
) -> SimResult<()> {
    let miner = entity(ctx, id)?;
    let (pos, period) = (miner.position(), miner.action_period);

    if let Some(smith) = ctx.world.find_nearest(pos, EntityKind::Blacksmith) {
        let smith_pos = entity(ctx, smith)?.position();
        if pos.adjacent(smith_pos) {
            let miner = entity(ctx, id)?;
            let successor = Entity::miner_not_full(
                miner.name.clone(),
                miner.resource_limit,
                pos,
                miner.action_period,
                miner.animation_period()?,
                miner.frames().clone(),
            );
            transform(id, successor, scheduler, ctx)?;
            return Ok(());
        }
        step_toward(id, smith_pos, Passability::EmptyOnly, scheduler, ctx)?;
    }

    scheduler.schedule_event(id, Action::Activity, period);
    Ok(())
}

fn miner_not_full(
    id: EntityId,
    scheduler: &mut EventScheduler,
    ctx: &mut SimContext<'_>,
) -> SimResult<()> {
    let miner = entity(ctx, id)?;
    let (pos, period) = (miner.position(), miner.action_period);

    if let Some(ore) = ctx.world.find_nearest(pos, EntityKind::Ore) {
        let ore_pos = entity(ctx, ore)?.position();
        if pos.adjacent(ore_pos) {
            if let Some(miner) = ctx.world.entity_mut(id) {
                miner.resource_count = (miner.resource_count + 1).min(miner.resource_limit);
            }
            destroy(ore, scheduler, ctx);
            let miner = entity(ctx, id)?;
            let description = format!("{} mined ore at {ore_pos}", miner.name);
            ctx.emit(scheduler.now(), SimEventKind::Mined { miner: id, ore }, description);

            let miner = entity(ctx, id)?;
            if miner.is_full() {
                let successor = Entity::miner_full(
                    miner.name.clone(),
                    miner.resource_limit,
                    pos,
                    miner.action_period,
                    miner.animation_period()?,
                    miner.frames().clone(),
                );
                transform(id, successor, scheduler, ctx)?;
                return Ok(());
            }
        } else {
            step_toward(id, ore_pos, Passability::EmptyOnly, scheduler, ctx)?;
        }
    }

    scheduler.schedule_event(id, Action::Activity, period);
    Ok(())
}

fn ore(id: EntityId, scheduler: &mut EventScheduler, ctx: &mut SimContext<'_>) -> SimResult<()> {
    let ore = entity(ctx, id)?;
    let (pos, name, period) = (ore.position(), ore.name.clone(), ore.action_period);
    let rules = ctx.rules;

    let animation = random_between(ctx.rng, rules.blob_animation_min, rules.blob_animation_max);
    let blob = Entity::ore_blob(
        format!("{name}{}", rules.blob_id_suffix),
        pos,
        period / rules.blob_period_scale.max(1),
        animation,
        ctx.frames(EntityKind::OreBlob.sprite_key()),
    );
    transform(id, blob, scheduler, ctx)?;
    Ok(())
}

fn ore_blob(
    id: EntityId,
    scheduler: &mut EventScheduler,
    ctx: &mut SimContext<'_>,
) -> SimResult<()> {
    let blob = entity(ctx, id)?;
    let (pos, period) = (blob.position(), blob.action_period);
    let mut next_period = period;

    if let Some(vein) = ctx.world.find_nearest(pos, EntityKind::Vein) {
        let vein_pos = entity(ctx, vein)?.position();
        if pos.adjacent(vein_pos) {
            destroy(vein, scheduler, ctx);

            let rules = ctx.rules;
            let quake = Entity::quake(
                rules.quake_id.clone(),
                vein_pos,
                rules.quake_action_period,
                rules.quake_animation_period,
                ctx.frames(EntityKind::Quake.sprite_key()),
            );
            spawn(quake, scheduler, ctx)?;
            let description = format!("{} shattered the vein at {vein_pos}", entity(ctx, id)?.name);
            ctx.emit(
                scheduler.now(),
                SimEventKind::Erupted { blob: id, vein },
                description,
            );
            next_period += period;
        } else {
            step_toward(id, vein_pos, Passability::EmptyOrOre, scheduler, ctx)?;
        }
    }

    scheduler.schedule_event(id, Action::Activity, next_period);
    Ok(())
}

fn quake(id: EntityId, scheduler: &mut EventScheduler, ctx: &mut SimContext<'_>) -> SimResult<()> {
    destroy(id, scheduler, ctx);
    Ok(())
}

fn vein(id: EntityId, scheduler: &mut EventScheduler, ctx: &mut SimContext<'_>) -> SimResult<()> {
    let vein = entity(ctx, id)?;
    let (pos, name, period) = (vein.position(), vein.name.clone(), vein.action_period);
    let rules = ctx.rules;

    if let Some(open) = ctx.world.find_open_around(pos, rules.ore_reach) {
        let corrupt = random_between(ctx.rng, rules.ore_corrupt_min, rules.ore_corrupt_max);
        let ore = Entity::ore(
            format!("{}{name}", rules.ore_id_prefix),
            open,
            corrupt,
            ctx.frames(EntityKind::Ore.sprite_key()),
        );
        spawn(ore, scheduler, ctx)?;
    }

    scheduler.schedule_event(id, Action::Activity, period);
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared mutations
// ---------------------------------------------------------------------------

fn random_between(rng: &mut StdRng, min: u64, max: u64) -> u64 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// Place `entity` (its cell is known to be free) and seed its actions.
fn spawn(
    entity: Entity,
    scheduler: &mut EventScheduler,
    ctx: &mut SimContext<'_>,
) -> SimResult<EntityId> {
    let (kind, at) = (entity.kind, entity.position());
    let description = format!("{} ({kind}) spawned at {at}", entity.name);
    let id = ctx.world.add_entity(entity);
    scheduler.schedule_actions(ctx.world, id, ctx.rules)?;

    tracing::debug!(%id, %kind, %at, "spawned");
    ctx.emit(
        scheduler.now(),
        SimEventKind::Spawned {
            entity: id,
            kind,
            at,
        },
        description,
    );
    Ok(id)
}

/// Cancel everything `id` has pending and take it off the grid.
fn destroy(id: EntityId, scheduler: &mut EventScheduler, ctx: &mut SimContext<'_>) {
    scheduler.unschedule_all_events(id);
    let Some((kind, name)) = ctx.world.entity(id).map(|e| (e.kind, e.name.clone())) else {
        return;
    };
    if ctx.world.remove_entity(id) {
        tracing::debug!(%id, %kind, "removed");
        ctx.emit(
            scheduler.now(),
            SimEventKind::Removed { entity: id, kind },
            format!("{name} ({kind}) removed"),
        );
    }
}

/// Replace `id` with `successor` in the same cell.
fn transform(
    id: EntityId,
    successor: Entity,
    scheduler: &mut EventScheduler,
    ctx: &mut SimContext<'_>,
) -> SimResult<EntityId> {
    let from_kind = entity(ctx, id)?.kind;
    let to_kind = successor.kind;
    let name = successor.name.clone();

    destroy(id, scheduler, ctx);
    let to = spawn(successor, scheduler, ctx)?;

    tracing::debug!(from = %id, %to, %from_kind, %to_kind, "transformed");
    ctx.emit(
        scheduler.now(),
        SimEventKind::Transformed {
            from: id,
            to,
            kind: to_kind,
        },
        format!("{name} became {to_kind}"),
    );
    Ok(to)
}

/// Take one step toward `dest`. Ore in the way of a blob is consumed first,
/// so the move itself always lands on an empty cell.
fn step_toward(
    id: EntityId,
    dest: Point,
    rule: Passability,
    scheduler: &mut EventScheduler,
    ctx: &mut SimContext<'_>,
) -> SimResult<()> {
    let from = entity(ctx, id)?.position();
    let next = next_position(ctx.world, from, dest, rule);
    if next == from {
        return Ok(());
    }

    if let Some(occupant) = ctx.world.occupant(next) {
        destroy(occupant, scheduler, ctx);
    }
    if ctx.world.is_occupied(next) {
        return Ok(());
    }

    ctx.world.move_entity(id, next);
    let description = format!("{} moved {from} -> {next}", entity(ctx, id)?.name);
    ctx.emit(
        scheduler.now(),
        SimEventKind::Moved {
            entity: id,
            from,
            to: next,
        },
        description,
    );
    Ok(())
}
