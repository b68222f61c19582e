use vw_core::{EntityKind, Point, WorldModel};

/// Which occupants a mover may step onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passability {
    /// Only empty cells. Miners move this way.
    EmptyOnly,
    /// Empty cells and cells holding ore, which the mover consumes. Blobs move this way.
    EmptyOrOre,
}

impl Passability {
    /// `true` if a mover with this rule may enter `pos`.
    pub fn allows(self, world: &WorldModel, pos: Point) -> bool {
        if !world.within_bounds(pos) {
            return false;
        }
        match world.occupant(pos).and_then(|id| world.entity(id)) {
            None => true,
            Some(occupant) => self == Self::EmptyOrOre && occupant.kind == EntityKind::Ore,
        }
    }
}

/// One step from `from` toward `dest`.
///
/// Tries the horizontal step first, then the vertical one; returns `from`
/// when neither axis needs moving or both candidate cells are blocked.
pub fn next_position(world: &WorldModel, from: Point, dest: Point, rule: Passability) -> Point {
    let horiz = (dest.x - from.x).signum();
    let candidate = from.offset(horiz, 0);
    if horiz != 0 && rule.allows(world, candidate) {
        return candidate;
    }

    let vert = (dest.y - from.y).signum();
    let candidate = from.offset(0, vert);
    if vert != 0 && rule.allows(world, candidate) {
        return candidate;
    }

    from
}

#[cfg(test)]
mod tests {
    use super::*;
    use vw_core::{Background, Entity, Frames};

    fn world() -> WorldModel {
        WorldModel::new(5, 5, Background::new("grass"))
    }

    fn rock(world: &mut WorldModel, x: i32, y: i32) {
        world.add_entity(Entity::obstacle("rock", Point::new(x, y), Frames::new("obstacle", 1)));
    }

    fn ore(world: &mut WorldModel, x: i32, y: i32) {
        world.add_entity(Entity::ore("ore", Point::new(x, y), 100, Frames::new("ore", 1)));
    }

    #[test]
    fn prefers_horizontal() {
        let w = world();
        let next = next_position(&w, Point::new(0, 0), Point::new(3, 3), Passability::EmptyOnly);
        assert_eq!(next, Point::new(1, 0));
    }

    #[test]
    fn vertical_when_aligned_on_x() {
        let w = world();
        let next = next_position(&w, Point::new(2, 4), Point::new(2, 0), Passability::EmptyOnly);
        assert_eq!(next, Point::new(2, 3));
    }

    #[test]
    fn falls_back_to_vertical_when_blocked() {
        let mut w = world();
        rock(&mut w, 1, 0);
        let next = next_position(&w, Point::new(0, 0), Point::new(3, 3), Passability::EmptyOnly);
        assert_eq!(next, Point::new(0, 1));
    }

    #[test]
    fn stays_when_both_blocked() {
        let mut w = world();
        rock(&mut w, 1, 0);
        rock(&mut w, 0, 1);
        let next = next_position(&w, Point::new(0, 0), Point::new(3, 3), Passability::EmptyOnly);
        assert_eq!(next, Point::new(0, 0));
    }

    #[test]
    fn stays_when_blocked_and_aligned() {
        let mut w = world();
        rock(&mut w, 1, 2);
        let next = next_position(&w, Point::new(0, 2), Point::new(4, 2), Passability::EmptyOnly);
        assert_eq!(next, Point::new(0, 2));
    }

    #[test]
    fn ore_blocks_miners_but_not_blobs() {
        let mut w = world();
        ore(&mut w, 1, 0);
        let miner = next_position(&w, Point::new(0, 0), Point::new(3, 0), Passability::EmptyOnly);
        assert_eq!(miner, Point::new(0, 0));
        let blob = next_position(&w, Point::new(0, 0), Point::new(3, 0), Passability::EmptyOrOre);
        assert_eq!(blob, Point::new(1, 0));
    }

    #[test]
    fn obstacles_block_blobs() {
        let mut w = world();
        rock(&mut w, 1, 0);
        assert!(!Passability::EmptyOrOre.allows(&w, Point::new(1, 0)));
        assert!(!Passability::EmptyOrOre.allows(&w, Point::new(-1, 0)));
    }
}
