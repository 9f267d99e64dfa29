//! Terrain grid: destructible and indestructible map tiles
//!
//! Cells are never removed from the grid. Destroyed cells flip `exists` to
//! false and drop out of every collision query and draw pass until a reset.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::bullet::Owner;
use super::collision::Aabb;
use super::rng::RandomSource;
use crate::Direction;
use crate::consts::*;

/// Terrain tile types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Empty,
    Brick,
    Stone,
    Water,
    SemiCrackedBrick,
    CrackedBrick,
    /// Decorative cover; tanks and bullets pass through
    Forest,
    Home,
    MirrorNe,
    MirrorSe,
    PowerUp,
}

impl CellKind {
    /// Kinds picked uniformly for non-empty random slots
    pub const RANDOM_FILL: [CellKind; 5] = [
        CellKind::Brick,
        CellKind::Stone,
        CellKind::Water,
        CellKind::Forest,
        CellKind::PowerUp,
    ];

    /// Tanks cannot drive into these
    pub fn blocks_movement(self) -> bool {
        matches!(
            self,
            CellKind::Brick
                | CellKind::Stone
                | CellKind::Water
                | CellKind::SemiCrackedBrick
                | CellKind::CrackedBrick
                | CellKind::Home
                | CellKind::MirrorNe
                | CellKind::MirrorSe
        )
    }

    /// Bullets resolve against these; everything else is flown over
    pub fn interacts_with_bullets(self) -> bool {
        matches!(
            self,
            CellKind::Brick
                | CellKind::Stone
                | CellKind::SemiCrackedBrick
                | CellKind::CrackedBrick
                | CellKind::Home
                | CellKind::PowerUp
                | CellKind::MirrorNe
                | CellKind::MirrorSe
        )
    }

    pub fn mirror(self) -> Option<Mirror> {
        match self {
            CellKind::MirrorNe => Some(Mirror::NorthEast),
            CellKind::MirrorSe => Some(Mirror::SouthEast),
            _ => None,
        }
    }

    pub fn is_brick(self) -> bool {
        matches!(
            self,
            CellKind::Brick | CellKind::SemiCrackedBrick | CellKind::CrackedBrick
        )
    }
}

/// Diagonal mirror orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mirror {
    /// Runs bottom-left to top-right ("/")
    NorthEast,
    /// Runs top-left to bottom-right ("\")
    SouthEast,
}

impl Mirror {
    /// New heading for a bullet travelling `dir` into this mirror
    pub fn reflect(self, dir: Direction) -> Direction {
        use Direction::*;
        match (self, dir) {
            (Mirror::NorthEast, Up) => Right,
            (Mirror::NorthEast, Right) => Up,
            (Mirror::NorthEast, Down) => Left,
            (Mirror::NorthEast, Left) => Down,
            (Mirror::SouthEast, Up) => Left,
            (Mirror::SouthEast, Left) => Up,
            (Mirror::SouthEast, Down) => Right,
            (Mirror::SouthEast, Right) => Down,
        }
    }
}

/// Outcome of one bullet striking one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitEffect {
    /// Brick degraded one step
    Cracked(CellKind),
    /// Cracked brick knocked out
    Destroyed,
    /// Stone soaked up the shot
    Absorbed,
    /// Base destroyed; the session is lost
    HomeDestroyed,
    /// Player shot a power-up and earns the boost
    PowerUpCollected,
    /// Enemy shot a power-up; it is gone with no boost granted
    PowerUpDestroyed,
    /// Bullet keeps flying with this mirror's reflection applied
    Reflected(Mirror),
    /// Nothing to resolve
    PassThrough,
}

impl HitEffect {
    /// Whether the striking bullet is used up
    pub fn consumes_bullet(self) -> bool {
        !matches!(self, HitEffect::Reflected(_) | HitEffect::PassThrough)
    }
}

/// A single terrain tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Top-left corner in screen pixels
    pub pos: IVec2,
    pub kind: CellKind,
    /// Bullet strikes taken since the last reset
    pub hits: u32,
    pub exists: bool,
    /// Frames left before an uncollected power-up disappears
    #[serde(default)]
    pub lifetime: Option<u32>,
}

impl Cell {
    pub fn new(pos: IVec2, kind: CellKind) -> Self {
        Self {
            pos,
            kind,
            hits: 0,
            exists: true,
            lifetime: None,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::square(self.pos, CELL_SIZE)
    }

    /// Apply one damage/transition step for a bullet fired by `owner`
    pub fn apply_bullet_hit(&mut self, owner: Owner) -> HitEffect {
        if !self.exists || !self.kind.interacts_with_bullets() {
            return HitEffect::PassThrough;
        }
        self.hits += 1;

        match self.kind {
            CellKind::Brick => {
                self.kind = CellKind::SemiCrackedBrick;
                HitEffect::Cracked(self.kind)
            }
            CellKind::SemiCrackedBrick => {
                self.kind = CellKind::CrackedBrick;
                HitEffect::Cracked(self.kind)
            }
            CellKind::CrackedBrick => {
                self.exists = false;
                HitEffect::Destroyed
            }
            CellKind::Stone => HitEffect::Absorbed,
            CellKind::Home => {
                self.exists = false;
                HitEffect::HomeDestroyed
            }
            CellKind::PowerUp => {
                self.exists = false;
                self.lifetime = None;
                match owner {
                    Owner::Player => HitEffect::PowerUpCollected,
                    Owner::Enemy => HitEffect::PowerUpDestroyed,
                }
            }
            CellKind::MirrorNe => HitEffect::Reflected(Mirror::NorthEast),
            CellKind::MirrorSe => HitEffect::Reflected(Mirror::SouthEast),
            CellKind::Empty | CellKind::Water | CellKind::Forest => HitEffect::PassThrough,
        }
    }

    /// Put the cell back to its generated state
    fn restore(&mut self) {
        if self.kind.is_brick() {
            self.kind = CellKind::Brick;
        }
        self.exists = true;
        self.hits = 0;
        self.lifetime = None;
    }
}

/// The terrain map, stored in raster order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    cols: i32,
    rows: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Grid of `cols` x `rows` empty cells; negative dimensions give an empty grid
    pub fn blank(cols: i32, rows: i32) -> Self {
        let (cols, rows) = (cols.max(0), rows.max(0));
        let mut cells = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell::new(slot_pos(col, row), CellKind::Empty));
            }
        }
        Self { cols, rows, cells }
    }

    /// Dimensions that tile the playfield below the HUD strip
    pub fn playfield_dims() -> (i32, i32) {
        (
            SCREEN_WIDTH / CELL_SIZE,
            (SCREEN_HEIGHT - GRID_ORIGIN_Y) / CELL_SIZE,
        )
    }

    /// Procedurally lay out a fresh map covering `width` x `height` pixels
    ///
    /// Slots are always `CELL_SIZE` pixels, so there is no cell-size
    /// parameter; the third argument is the empty-slot probability instead.
    ///
    /// Layout rules, in priority order per slot:
    /// - bottom-left and top-right corners, and anything under a tank spawn: Empty
    /// - four near-corner mirrors
    /// - the first interior slot in raster order: Home
    /// - otherwise Empty with probability `empty_chance`, else a uniform
    ///   pick from `CellKind::RANDOM_FILL`
    pub fn generate<R: RandomSource>(
        width: i32,
        height: i32,
        empty_chance: f32,
        rng: &mut R,
    ) -> Self {
        let cols = width / CELL_SIZE;
        let rows = (height - GRID_ORIGIN_Y) / CELL_SIZE;
        let mut grid = Self::blank(cols, rows);
        let (cols, rows) = (grid.cols, grid.rows);

        let spawns = [
            Aabb::square(IVec2::from(PLAYER_SPAWN), TANK_SIZE),
            Aabb::square(IVec2::from(ENEMY_SPAWN), TANK_SIZE),
        ];
        let mirrors = grid.mirror_slots();
        let mut home_placed = false;

        for row in 0..rows {
            for col in 0..cols {
                let pos = slot_pos(col, row);
                let slot = Aabb::square(pos, CELL_SIZE);

                let kind = if (col == 0 && row == rows - 1)
                    || (col == cols - 1 && row == 0)
                    || spawns.iter().any(|s| s.intersects(&slot))
                {
                    CellKind::Empty
                } else if let Some(&(_, kind)) =
                    mirrors.iter().find(|(at, _)| *at == (col, row))
                {
                    kind
                } else if !home_placed && grid.is_interior(col, row) {
                    home_placed = true;
                    CellKind::Home
                } else if rng.chance(empty_chance) {
                    CellKind::Empty
                } else {
                    rng.pick(&CellKind::RANDOM_FILL)
                };

                grid.cells[(row * cols + col) as usize].kind = kind;
            }
        }

        log::info!("Generated {}x{} terrain grid", cols, rows);
        grid
    }

    /// Fixed near-corner mirror placements
    fn mirror_slots(&self) -> [((i32, i32), CellKind); 4] {
        let (right, bottom) = (self.cols - 2, self.rows - 2);
        [
            ((1, 1), CellKind::MirrorNe),
            ((right, 1), CellKind::MirrorSe),
            ((1, bottom), CellKind::MirrorSe),
            ((right, bottom), CellKind::MirrorNe),
        ]
    }

    fn is_interior(&self, col: i32, row: i32) -> bool {
        col > 0 && row > 0 && col < self.cols - 1 && row < self.rows - 1
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// All cells, destroyed ones included
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells that still take part in collisions and drawing
    pub fn live_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.exists)
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    pub fn cell_at(&self, col: i32, row: i32) -> Option<&Cell> {
        self.index_of(col, row).map(|i| &self.cells[i])
    }

    /// Overwrite a slot's kind (map editing and scenario setup)
    pub fn set_kind(&mut self, col: i32, row: i32, kind: CellKind) {
        if let Some(i) = self.index_of(col, row) {
            self.cells[i] = Cell::new(self.cells[i].pos, kind);
        }
    }

    fn index_of(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols || row >= self.rows {
            return None;
        }
        Some((row * self.cols + col) as usize)
    }

    /// First live cell that stops a tank occupying `aabb`
    pub fn query_blocking(&self, aabb: &Aabb) -> Option<&Cell> {
        self.live_cells()
            .find(|c| c.kind.blocks_movement() && c.aabb().intersects(aabb))
    }

    /// Index of the first live bullet-relevant cell overlapping `aabb`,
    /// ignoring `skip`
    pub fn first_bullet_contact(&self, aabb: &Aabb, skip: Option<usize>) -> Option<usize> {
        self.cells.iter().enumerate().position(|(i, c)| {
            Some(i) != skip
                && c.exists
                && c.kind.interacts_with_bullets()
                && c.aabb().intersects(aabb)
        })
    }

    /// Remove every live power-up under `aabb`, returning how many were taken
    pub fn collect_power_ups(&mut self, aabb: &Aabb) -> u32 {
        let mut taken = 0;
        for cell in self.cells.iter_mut() {
            if cell.exists && cell.kind == CellKind::PowerUp && cell.aabb().intersects(aabb) {
                cell.exists = false;
                cell.lifetime = None;
                taken += 1;
            }
        }
        taken
    }

    /// Start the expiry timer on every placed power-up
    pub fn arm_power_ups(&mut self, lifetime: u32) {
        for cell in self.cells.iter_mut() {
            if cell.exists && cell.kind == CellKind::PowerUp {
                cell.lifetime = Some(lifetime);
            }
        }
    }

    /// Count down power-up lifetimes; returns the number that expired
    pub fn age_power_ups(&mut self) -> u32 {
        let mut expired = 0;
        for cell in self.cells.iter_mut() {
            if !cell.exists {
                continue;
            }
            if let Some(ticks) = cell.lifetime.as_mut() {
                *ticks = ticks.saturating_sub(1);
                if *ticks == 0 {
                    cell.exists = false;
                    cell.lifetime = None;
                    expired += 1;
                    log::debug!("Power-up at {:?} expired", cell.pos);
                }
            }
        }
        expired
    }

    /// Undo all damage while keeping the generated layout
    pub fn restore(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.restore();
        }
    }

    pub fn home_exists(&self) -> bool {
        self.cells
            .iter()
            .any(|c| c.kind == CellKind::Home && c.exists)
    }
}

/// Top-left pixel of the slot at (`col`, `row`)
#[inline]
pub fn slot_pos(col: i32, row: i32) -> IVec2 {
    IVec2::new(col * CELL_SIZE, GRID_ORIGIN_Y + row * CELL_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::{ScriptedSource, SimRng};
    use proptest::prelude::*;

    fn generated(seed: u64) -> Grid {
        let mut rng = SimRng::seeded(seed);
        Grid::generate(SCREEN_WIDTH, SCREEN_HEIGHT, 0.6, &mut rng)
    }

    #[test]
    fn test_generate_too_short_is_empty() {
        let mut rng = ScriptedSource::new();
        let grid = Grid::generate(SCREEN_WIDTH, GRID_ORIGIN_Y - 40, 0.6, &mut rng);
        assert_eq!((grid.cols(), grid.rows()), (SCREEN_WIDTH / CELL_SIZE, 0));
        assert!(grid.cells().is_empty());
        assert!(Grid::blank(-3, 4).cells().is_empty());
    }

    #[test]
    fn test_generate_dimensions() {
        let grid = generated(1);
        assert_eq!((grid.cols(), grid.rows()), Grid::playfield_dims());
        assert_eq!(grid.cells().len(), (grid.cols() * grid.rows()) as usize);
        let last = grid.cells().last().unwrap();
        assert!(last.pos.x + CELL_SIZE <= SCREEN_WIDTH);
        assert!(last.pos.y + CELL_SIZE <= SCREEN_HEIGHT);
    }

    #[test]
    fn test_generate_single_interior_home() {
        for seed in 0..20 {
            let grid = generated(seed);
            let homes: Vec<_> = grid
                .cells()
                .iter()
                .filter(|c| c.kind == CellKind::Home)
                .collect();
            assert_eq!(homes.len(), 1);
            assert_eq!(homes[0].pos, slot_pos(2, 1));
        }
    }

    #[test]
    fn test_generate_fixed_mirrors_and_clear_corners() {
        let grid = generated(3);
        let (c, r) = (grid.cols(), grid.rows());
        assert_eq!(grid.cell_at(1, 1).unwrap().kind, CellKind::MirrorNe);
        assert_eq!(grid.cell_at(c - 2, 1).unwrap().kind, CellKind::MirrorSe);
        assert_eq!(grid.cell_at(1, r - 2).unwrap().kind, CellKind::MirrorSe);
        assert_eq!(grid.cell_at(c - 2, r - 2).unwrap().kind, CellKind::MirrorNe);
        assert_eq!(grid.cell_at(0, r - 1).unwrap().kind, CellKind::Empty);
        assert_eq!(grid.cell_at(c - 1, 0).unwrap().kind, CellKind::Empty);
    }

    #[test]
    fn test_generate_spawns_are_clear() {
        for seed in 0..20 {
            let grid = generated(seed);
            for spawn in [PLAYER_SPAWN, ENEMY_SPAWN] {
                let tank = Aabb::square(IVec2::from(spawn), TANK_SIZE);
                assert!(grid.query_blocking(&tank).is_none(), "seed {seed}");
            }
        }
    }

    #[test]
    fn test_generate_scripted_fill() {
        // First random slot: not empty, pick Stone. Second: empty.
        let mut rng = ScriptedSource::new()
            .with_units([0.9, 0.1])
            .with_indices([1]);
        let grid = Grid::generate(SCREEN_WIDTH, SCREEN_HEIGHT, 0.6, &mut rng);
        assert_eq!(grid.cell_at(0, 0).unwrap().kind, CellKind::Stone);
        assert_eq!(grid.cell_at(1, 0).unwrap().kind, CellKind::Empty);
    }

    #[test]
    fn test_brick_degradation_sequence() {
        let mut cell = Cell::new(IVec2::ZERO, CellKind::Brick);
        assert_eq!(
            cell.apply_bullet_hit(Owner::Player),
            HitEffect::Cracked(CellKind::SemiCrackedBrick)
        );
        assert_eq!(
            cell.apply_bullet_hit(Owner::Enemy),
            HitEffect::Cracked(CellKind::CrackedBrick)
        );
        assert_eq!(cell.apply_bullet_hit(Owner::Player), HitEffect::Destroyed);
        assert!(!cell.exists);
        assert_eq!(cell.apply_bullet_hit(Owner::Player), HitEffect::PassThrough);
        assert_eq!(cell.hits, 3);
    }

    #[test]
    fn test_power_up_owner_matters() {
        let mut a = Cell::new(IVec2::ZERO, CellKind::PowerUp);
        let mut b = a.clone();
        assert_eq!(a.apply_bullet_hit(Owner::Player), HitEffect::PowerUpCollected);
        assert_eq!(b.apply_bullet_hit(Owner::Enemy), HitEffect::PowerUpDestroyed);
        assert!(!a.exists && !b.exists);
    }

    #[test]
    fn test_home_hit_destroys_home() {
        let mut cell = Cell::new(IVec2::ZERO, CellKind::Home);
        let effect = cell.apply_bullet_hit(Owner::Enemy);
        assert_eq!(effect, HitEffect::HomeDestroyed);
        assert!(effect.consumes_bullet());
        assert!(!cell.exists);
    }

    #[test]
    fn test_passable_kinds_do_not_react() {
        for kind in [CellKind::Empty, CellKind::Water, CellKind::Forest] {
            let mut cell = Cell::new(IVec2::ZERO, kind);
            let effect = cell.apply_bullet_hit(Owner::Player);
            assert_eq!(effect, HitEffect::PassThrough);
            assert!(!effect.consumes_bullet());
            assert_eq!(cell.hits, 0);
        }
    }

    #[test]
    fn test_movement_and_bullet_predicates_differ() {
        assert!(CellKind::Water.blocks_movement());
        assert!(!CellKind::Water.interacts_with_bullets());
        assert!(!CellKind::Forest.blocks_movement());
        assert!(!CellKind::Forest.interacts_with_bullets());
        assert!(!CellKind::PowerUp.blocks_movement());
        assert!(CellKind::Stone.blocks_movement() && CellKind::Stone.interacts_with_bullets());
    }

    #[test]
    fn test_query_blocking_skips_destroyed() {
        let mut grid = Grid::blank(4, 4);
        grid.set_kind(1, 1, CellKind::Brick);
        let probe = Aabb::square(slot_pos(1, 1), TANK_SIZE);
        assert!(grid.query_blocking(&probe).is_some());
        grid.cell_mut(5).unwrap().exists = false;
        assert!(grid.query_blocking(&probe).is_none());
        assert!(grid.first_bullet_contact(&probe, None).is_none());
    }

    #[test]
    fn test_power_up_expiry() {
        let mut grid = Grid::blank(3, 3);
        grid.set_kind(1, 1, CellKind::PowerUp);
        grid.arm_power_ups(3);
        assert_eq!(grid.age_power_ups(), 0);
        assert_eq!(grid.age_power_ups(), 0);
        assert_eq!(grid.age_power_ups(), 1);
        assert!(!grid.cell_at(1, 1).unwrap().exists);
    }

    #[test]
    fn test_restore_reverts_damage() {
        let mut grid = Grid::blank(3, 1);
        grid.set_kind(0, 0, CellKind::Brick);
        grid.set_kind(1, 0, CellKind::Home);
        grid.set_kind(2, 0, CellKind::PowerUp);
        for i in 0..3 {
            grid.cell_mut(0).unwrap().apply_bullet_hit(Owner::Player);
            grid.cell_mut(i).unwrap().apply_bullet_hit(Owner::Player);
        }
        grid.restore();
        for (cell, kind) in grid
            .cells()
            .iter()
            .zip([CellKind::Brick, CellKind::Home, CellKind::PowerUp])
        {
            assert!(cell.exists);
            assert_eq!(cell.kind, kind);
            assert_eq!(cell.hits, 0);
        }
    }

    #[test]
    fn test_mirror_tables() {
        use Direction::*;
        assert_eq!(Mirror::NorthEast.reflect(Up), Right);
        assert_eq!(Mirror::NorthEast.reflect(Left), Down);
        assert_eq!(Mirror::SouthEast.reflect(Up), Left);
        assert_eq!(Mirror::SouthEast.reflect(Right), Down);
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_mirrors_are_involutions(dir in any_direction()) {
            for m in [Mirror::NorthEast, Mirror::SouthEast] {
                prop_assert_eq!(m.reflect(m.reflect(dir)), dir);
            }
            // Bouncing off both orientations in turn sends a bullet back the way it came
            prop_assert_eq!(Mirror::SouthEast.reflect(Mirror::NorthEast.reflect(dir)), dir.opposite());
            prop_assert_eq!(Mirror::NorthEast.reflect(Mirror::SouthEast.reflect(dir)), dir.opposite());
        }

        #[test]
        fn prop_mirrors_never_consume(hits in 1usize..50, player in any::<bool>()) {
            let owner = if player { Owner::Player } else { Owner::Enemy };
            for kind in [CellKind::MirrorNe, CellKind::MirrorSe] {
                let mut cell = Cell::new(IVec2::ZERO, kind);
                for _ in 0..hits {
                    prop_assert!(!cell.apply_bullet_hit(owner).consumes_bullet());
                }
                prop_assert!(cell.exists);
                prop_assert_eq!(cell.kind, kind);
            }
        }

        #[test]
        fn prop_stone_absorbs_forever(hits in 1usize..200) {
            let mut cell = Cell::new(IVec2::ZERO, CellKind::Stone);
            for _ in 0..hits {
                prop_assert_eq!(cell.apply_bullet_hit(Owner::Player), HitEffect::Absorbed);
            }
            prop_assert!(cell.exists);
            prop_assert_eq!(cell.hits as usize, hits);
        }

        #[test]
        fn prop_brick_degrades_one_step_per_hit(hits in 0usize..6) {
            let order = [CellKind::Brick, CellKind::SemiCrackedBrick, CellKind::CrackedBrick];
            let mut cell = Cell::new(IVec2::ZERO, CellKind::Brick);
            for _ in 0..hits {
                cell.apply_bullet_hit(Owner::Enemy);
            }
            if hits < 3 {
                prop_assert!(cell.exists);
                prop_assert_eq!(cell.kind, order[hits]);
            } else {
                prop_assert!(!cell.exists);
                prop_assert_eq!(cell.hits, 3);
            }
        }
    }
}
