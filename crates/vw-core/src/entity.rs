use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::image::Frames;
use crate::point::Point;

/// Stable handle to an entity in the world's arena.
///
/// Handles are handed out in creation order and never reused, so a handle to
/// a removed entity still resolves (to an off-grid record) instead of aliasing
/// a newer entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of entity kinds. The kind selects the activity rule and
/// whether the entity animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A miner carrying a full load, heading for a blacksmith.
    MinerFull,
    /// A miner looking for ore.
    MinerNotFull,
    /// A piece of ore that eventually corrupts into a blob.
    Ore,
    /// A blob hunting veins; reaching one sets off a quake.
    OreBlob,
    /// A short-lived quake marker.
    Quake,
    /// A vein that periodically spawns ore nearby.
    Vein,
    /// A static drop-off point for full miners.
    Blacksmith,
    /// A static blocker.
    Obstacle,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 8] = [
        Self::MinerFull,
        Self::MinerNotFull,
        Self::Ore,
        Self::OreBlob,
        Self::Quake,
        Self::Vein,
        Self::Blacksmith,
        Self::Obstacle,
    ];

    /// Sprite key used to look up this kind's frames. Both miner kinds share one.
    pub fn sprite_key(&self) -> &'static str {
        match self {
            Self::MinerFull | Self::MinerNotFull => "miner",
            Self::Ore => "ore",
            Self::OreBlob => "blob",
            Self::Quake => "quake",
            Self::Vein => "vein",
            Self::Blacksmith => "blacksmith",
            Self::Obstacle => "obstacle",
        }
    }

    /// Kinds that carry an animation period.
    pub fn is_animated(&self) -> bool {
        matches!(
            self,
            Self::MinerFull | Self::MinerNotFull | Self::OreBlob | Self::Quake
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MinerFull => "miner_full",
            Self::MinerNotFull => "miner_not_full",
            Self::Ore => "ore",
            Self::OreBlob => "ore_blob",
            Self::Quake => "quake",
            Self::Vein => "vein",
            Self::Blacksmith => "blacksmith",
            Self::Obstacle => "obstacle",
        };
        f.write_str(name)
    }
}

/// A positioned simulation object.
///
/// The `position` field mirrors the entity's cell in the occupancy grid and is
/// only written by [`crate::WorldModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// The kind, fixed for the entity's lifetime. Changing kind means a transform.
    pub kind: EntityKind,
    /// Human-readable identifier, e.g. `"vein3"` or `"ore -- vein3"`.
    pub name: String,
    pub(crate) position: Point,
    frames: Frames,
    image_index: usize,
    /// Ore a miner can carry before it has to deliver.
    pub resource_limit: u32,
    /// Ore a miner currently carries.
    pub resource_count: u32,
    /// Delay between activity firings, in simulated milliseconds.
    pub action_period: u64,
    animation_period: u64,
}

impl Entity {
    /// Build an entity from raw parts. Prefer the kind-specific factories.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: EntityKind,
        name: impl Into<String>,
        position: Point,
        frames: Frames,
        resource_limit: u32,
        resource_count: u32,
        action_period: u64,
        animation_period: u64,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            position,
            frames,
            image_index: 0,
            resource_limit,
            resource_count: resource_count.min(resource_limit),
            action_period,
            animation_period,
        }
    }

    /// A static blacksmith.
    pub fn blacksmith(name: impl Into<String>, position: Point, frames: Frames) -> Self {
        Self::new(EntityKind::Blacksmith, name, position, frames, 0, 0, 0, 0)
    }

    /// A miner that is already carrying `resource_limit` ore.
    pub fn miner_full(
        name: impl Into<String>,
        resource_limit: u32,
        position: Point,
        action_period: u64,
        animation_period: u64,
        frames: Frames,
    ) -> Self {
        Self::new(
            EntityKind::MinerFull,
            name,
            position,
            frames,
            resource_limit,
            resource_limit,
            action_period,
            animation_period,
        )
    }

    /// An empty miner.
    pub fn miner_not_full(
        name: impl Into<String>,
        resource_limit: u32,
        position: Point,
        action_period: u64,
        animation_period: u64,
        frames: Frames,
    ) -> Self {
        Self::new(
            EntityKind::MinerNotFull,
            name,
            position,
            frames,
            resource_limit,
            0,
            action_period,
            animation_period,
        )
    }

    /// A static obstacle.
    pub fn obstacle(name: impl Into<String>, position: Point, frames: Frames) -> Self {
        Self::new(EntityKind::Obstacle, name, position, frames, 0, 0, 0, 0)
    }

    /// Ore that corrupts into a blob after `action_period`.
    pub fn ore(name: impl Into<String>, position: Point, action_period: u64, frames: Frames) -> Self {
        Self::new(EntityKind::Ore, name, position, frames, 0, 0, action_period, 0)
    }

    /// An ore blob.
    pub fn ore_blob(
        name: impl Into<String>,
        position: Point,
        action_period: u64,
        animation_period: u64,
        frames: Frames,
    ) -> Self {
        Self::new(
            EntityKind::OreBlob,
            name,
            position,
            frames,
            0,
            0,
            action_period,
            animation_period,
        )
    }

    /// A quake that lives for `action_period` and animates meanwhile.
    pub fn quake(
        name: impl Into<String>,
        position: Point,
        action_period: u64,
        animation_period: u64,
        frames: Frames,
    ) -> Self {
        Self::new(
            EntityKind::Quake,
            name,
            position,
            frames,
            0,
            0,
            action_period,
            animation_period,
        )
    }

    /// A vein that spawns ore every `action_period`.
    pub fn vein(name: impl Into<String>, position: Point, action_period: u64, frames: Frames) -> Self {
        Self::new(EntityKind::Vein, name, position, frames, 0, 0, action_period, 0)
    }

    /// Current cell, or [`Point::OFF_GRID`] once removed.
    pub fn position(&self) -> Point {
        self.position
    }

    /// The frame list this entity cycles through.
    pub fn frames(&self) -> &Frames {
        &self.frames
    }

    /// Index of the frame currently displayed.
    pub fn current_frame(&self) -> usize {
        self.image_index
    }

    /// Step to the next frame, wrapping at the end of the list.
    pub fn next_image(&mut self) {
        self.image_index = (self.image_index + 1) % self.frames.frame_count();
    }

    /// Delay between animation frames. Static kinds have none.
    pub fn animation_period(&self) -> CoreResult<u64> {
        if self.kind.is_animated() {
            Ok(self.animation_period)
        } else {
            Err(CoreError::UnsupportedOperation {
                operation: "animation_period",
                kind: self.kind,
            })
        }
    }

    /// `true` once the miner carries as much as it can.
    pub fn is_full(&self) -> bool {
        self.resource_count >= self.resource_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(count: usize) -> Frames {
        Frames::new("test", count)
    }

    #[test]
    fn miner_factories_set_resource_count() {
        let full = Entity::miner_full("m", 3, Point::new(0, 0), 10, 5, frames(1));
        assert_eq!(full.kind, EntityKind::MinerFull);
        assert_eq!(full.resource_count, 3);
        assert!(full.is_full());

        let empty = Entity::miner_not_full("m", 3, Point::new(0, 0), 10, 5, frames(1));
        assert_eq!(empty.kind, EntityKind::MinerNotFull);
        assert_eq!(empty.resource_count, 0);
        assert!(!empty.is_full());
    }

    #[test]
    fn resource_count_clamped_to_limit() {
        let e = Entity::new(
            EntityKind::MinerNotFull,
            "m",
            Point::new(0, 0),
            frames(1),
            2,
            9,
            1,
            1,
        );
        assert_eq!(e.resource_count, 2);
    }

    #[test]
    fn next_image_wraps() {
        let mut e = Entity::ore_blob("b", Point::new(0, 0), 10, 5, frames(3));
        assert_eq!(e.current_frame(), 0);
        e.next_image();
        e.next_image();
        assert_eq!(e.current_frame(), 2);
        e.next_image();
        assert_eq!(e.current_frame(), 0);
    }

    #[test]
    fn static_kinds_have_no_animation_period() {
        let smith = Entity::blacksmith("s", Point::new(0, 0), frames(1));
        assert_eq!(
            smith.animation_period(),
            Err(CoreError::UnsupportedOperation {
                operation: "animation_period",
                kind: EntityKind::Blacksmith,
            })
        );
        let vein = Entity::vein("v", Point::new(0, 0), 100, frames(1));
        assert!(vein.animation_period().is_err());

        let quake = Entity::quake("q", Point::new(0, 0), 1100, 100, frames(1));
        assert_eq!(quake.animation_period(), Ok(100));
    }

    #[test]
    fn miner_kinds_share_sprite() {
        assert_eq!(EntityKind::MinerFull.sprite_key(), "miner");
        assert_eq!(EntityKind::MinerNotFull.sprite_key(), "miner");
        assert_eq!(EntityKind::OreBlob.to_string(), "ore_blob");
        assert_eq!(EntityId(7).to_string(), "#7");
    }
}
