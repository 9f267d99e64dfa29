//! Collision detection and resolution
//!
//! Everything is axis-aligned boxes in pixel space. Bullet-vs-terrain
//! resolution is shared by both owners: a bullet resolves against at most
//! one cell per frame, first match in raster order.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::terrain::{Grid, HitEffect};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub min: IVec2,
    pub size: IVec2,
}

impl Aabb {
    pub fn new(min: IVec2, size: IVec2) -> Self {
        Self { min, size }
    }

    pub fn square(min: IVec2, edge: i32) -> Self {
        Self::new(min, IVec2::splat(edge))
    }

    /// Exclusive bottom-right corner
    #[inline]
    pub fn max(&self) -> IVec2 {
        self.min + self.size
    }

    /// Strict overlap; boxes that only share an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max().x
            && self.max().x > other.min.x
            && self.min.y < other.max().y
            && self.max().y > other.min.y
    }
}

/// A bullet striking a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainHit {
    pub cell: usize,
    pub effect: HitEffect,
}

/// Resolve one bullet against the terrain.
///
/// Applies the cell transition, bends the bullet on mirrors and marks it
/// consumed when the effect says so. Returns `None` if nothing was touched.
pub fn resolve_bullet_terrain(bullet: &mut Bullet, grid: &mut Grid) -> Option<TerrainHit> {
    if !bullet.exists {
        return None;
    }
    let aabb = bullet.aabb();

    // Forget the mirror we were inside once we have fully left it
    if let Some(index) = bullet.inside_mirror {
        let still_inside = grid
            .cell(index)
            .is_some_and(|c| c.exists && c.aabb().intersects(&aabb));
        if !still_inside {
            bullet.inside_mirror = None;
        }
    }

    let index = grid.first_bullet_contact(&aabb, bullet.inside_mirror)?;
    let cell = grid.cell_mut(index)?;
    let effect = cell.apply_bullet_hit(bullet.owner);

    match effect {
        HitEffect::Reflected(mirror) => {
            bullet.direction = mirror.reflect(bullet.direction);
            bullet.inside_mirror = Some(index);
        }
        _ if effect.consumes_bullet() => bullet.exists = false,
        _ => {}
    }

    Some(TerrainHit {
        cell: index,
        effect,
    })
}

/// Whether a live bullet overlaps a tank's box
#[inline]
pub fn bullet_hits_box(bullet: &Bullet, target: &Aabb) -> bool {
    bullet.exists && bullet.aabb().intersects(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;
    use crate::consts::*;
    use crate::sim::bullet::Owner;
    use crate::sim::terrain::{CellKind, slot_pos};

    fn bullet_in_slot(col: i32, row: i32, dir: Direction, owner: Owner) -> Bullet {
        Bullet::new(slot_pos(col, row) + IVec2::splat(7), dir, owner)
    }

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::square(IVec2::new(0, 0), 16);
        assert!(a.intersects(&Aabb::square(IVec2::new(15, 15), 2)));
        assert!(!a.intersects(&Aabb::square(IVec2::new(16, 0), 2)));
        assert!(!a.intersects(&Aabb::square(IVec2::new(-2, 5), 2)));
        assert!(a.intersects(&Aabb::square(IVec2::new(-1, 5), 2)));
    }

    #[test]
    fn test_brick_consumes_bullet() {
        let mut grid = Grid::blank(4, 4);
        grid.set_kind(2, 2, CellKind::Brick);
        let mut bullet = bullet_in_slot(2, 2, Direction::Up, Owner::Enemy);

        let hit = resolve_bullet_terrain(&mut bullet, &mut grid).unwrap();
        assert_eq!(hit.effect, HitEffect::Cracked(CellKind::SemiCrackedBrick));
        assert!(!bullet.exists);
        // A consumed bullet cannot hit again
        assert!(resolve_bullet_terrain(&mut bullet, &mut grid).is_none());
    }

    #[test]
    fn test_water_and_forest_ignored() {
        let mut grid = Grid::blank(4, 4);
        grid.set_kind(1, 1, CellKind::Water);
        grid.set_kind(2, 1, CellKind::Forest);
        for col in [1, 2] {
            let mut bullet = bullet_in_slot(col, 1, Direction::Right, Owner::Player);
            assert!(resolve_bullet_terrain(&mut bullet, &mut grid).is_none());
            assert!(bullet.exists);
        }
    }

    #[test]
    fn test_first_match_wins() {
        let mut grid = Grid::blank(4, 4);
        grid.set_kind(1, 1, CellKind::Brick);
        grid.set_kind(2, 1, CellKind::Brick);
        // Straddles the boundary between the two bricks
        let mut bullet = Bullet::new(slot_pos(2, 1) + IVec2::new(-1, 4), Direction::Up, Owner::Player);
        let hit = resolve_bullet_terrain(&mut bullet, &mut grid).unwrap();
        assert_eq!(grid.cell(hit.cell).unwrap().pos, slot_pos(1, 1));
        assert_eq!(grid.cell_at(2, 1).unwrap().kind, CellKind::Brick);
    }

    #[test]
    fn test_mirror_reflects_once_per_pass() {
        let mut grid = Grid::blank(6, 6);
        grid.set_kind(2, 3, CellKind::MirrorNe);
        // Fly up into the mirror from below
        let mut bullet = Bullet::new(
            slot_pos(2, 4) + IVec2::new(7, 0),
            Direction::Up,
            Owner::Player,
        );

        let mut reflections = 0;
        for _ in 0..12 {
            bullet.advance();
            if let Some(hit) = resolve_bullet_terrain(&mut bullet, &mut grid) {
                assert!(matches!(hit.effect, HitEffect::Reflected(_)));
                reflections += 1;
            }
        }
        assert_eq!(reflections, 1);
        assert_eq!(bullet.direction, Direction::Right);
        assert!(bullet.exists);
        assert!(bullet.pos.x >= slot_pos(3, 3).x);
        assert_eq!(grid.cell_at(2, 3).unwrap().hits, 1);
    }

    #[test]
    fn test_bullet_hits_box() {
        let tank = Aabb::square(IVec2::new(50, 50), TANK_SIZE);
        let mut bullet = Bullet::new(IVec2::new(60, 65), Direction::Down, Owner::Enemy);
        assert!(bullet_hits_box(&bullet, &tank));
        bullet.exists = false;
        assert!(!bullet_hits_box(&bullet, &tank));
    }
}
