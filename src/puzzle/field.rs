//! The puzzle board
//!
//! Tiles are stored ordered by place, so `tiles[p].place == p` always holds
//! and indexing by place needs no search. The empty slot's place is cached in
//! `empty_place` and updated by every move.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::layout::BoardLayout;
use super::tile::{Tile, TileId};
use crate::consts::{ANIMATION_DURATION_MS, DEFAULT_WIDTH, MAX_WIDTH, MIN_WIDTH};
use crate::error::{ConfigError, MoveError};
use crate::pick::{PickTarget, RayCaster};

/// Turn a configured width into a usable one
///
/// Fractional widths are rounded down and anything outside
/// `MIN_WIDTH..=MAX_WIDTH` is clamped. The error describes what was
/// changed; the returned width is always usable.
pub fn checked_width(requested: f64) -> (usize, Option<ConfigError>) {
    if !requested.is_finite() {
        return (
            DEFAULT_WIDTH,
            Some(ConfigError::WidthOutOfRange {
                requested,
                min: MIN_WIDTH,
                max: MAX_WIDTH,
                used: DEFAULT_WIDTH,
            }),
        );
    }

    let floored = requested.floor();
    let clamped = floored.clamp(MIN_WIDTH as f64, MAX_WIDTH as f64) as usize;
    if floored != clamped as f64 {
        return (
            clamped,
            Some(ConfigError::WidthOutOfRange {
                requested,
                min: MIN_WIDTH,
                max: MAX_WIDTH,
                used: clamped,
            }),
        );
    }
    if floored != requested {
        return (
            clamped,
            Some(ConfigError::FractionalWidth {
                requested,
                used: clamped,
            }),
        );
    }
    (clamped, None)
}

/// Values `start..start + len` in a seeded uniform random order
fn shuffled_range(start: u32, len: usize, rng: &mut Pcg32) -> Vec<u32> {
    let mut values: Vec<u32> = (0..len as u32).map(|i| i + start).collect();
    for i in (1..values.len()).rev() {
        let j = rng.random_range(0..=i);
        values.swap(i, j);
    }
    values
}

/// Serializable board layout: tile values in place order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: usize,
    pub values: Vec<u32>,
}

/// A move that was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub tile: TileId,
    pub from: usize,
    pub to: usize,
}

/// The sliding-tile board
#[derive(Debug, Clone)]
pub struct PuzzleField {
    layout: BoardLayout,
    tiles: Vec<Tile>,
    empty_place: usize,
    animation_ms: f64,
}

impl PuzzleField {
    /// Shuffle a fresh, solvable board
    ///
    /// `width` comes from configuration; see [`checked_width`] for how bad
    /// values are repaired. Repairs are logged, never fatal.
    pub fn new(width: f64, seed: u64) -> Self {
        let (width, problem) = checked_width(width);
        if let Some(err) = problem {
            log::error!("Wrong field size: {}", err);
        }

        let layout = BoardLayout::new(width);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut values = shuffled_range(1, layout.size() - 1, &mut rng);
        // Empty slot starts bottom-right
        values.push(0);

        let tiles = values
            .iter()
            .enumerate()
            .map(|(place, &value)| Tile::new(value, place, &layout))
            .collect();

        let mut field = Self {
            layout,
            tiles,
            empty_place: layout.size() - 1,
            animation_ms: ANIMATION_DURATION_MS,
        };

        if field.inversion_count() % 2 != 0 {
            // Swapping two non-empty tiles flips the permutation parity
            field.tiles.swap(0, 1);
            field.tiles[0].set_to_place(0, &layout);
            field.tiles[1].set_to_place(1, &layout);
        }
        field.empty_place = field.find_empty();

        log::debug!("Shuffled {}x{} board with seed {}", width, width, seed);
        field
    }

    /// Rebuild a board from a snapshot, rejecting impossible layouts
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, ConfigError> {
        let (width, problem) = checked_width(snapshot.width as f64);
        if let Some(err) = problem {
            return Err(err);
        }

        let layout = BoardLayout::new(width);
        if snapshot.values.len() != layout.size() {
            return Err(ConfigError::TileCount {
                width,
                expected: layout.size(),
                actual: snapshot.values.len(),
            });
        }

        let mut seen = vec![false; layout.size()];
        for &value in &snapshot.values {
            match seen.get_mut(value as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(ConfigError::NotAPermutation(layout.size())),
            }
        }

        let tiles: Vec<Tile> = snapshot
            .values
            .iter()
            .enumerate()
            .map(|(place, &value)| Tile::new(value, place, &layout))
            .collect();

        let mut field = Self {
            layout,
            tiles,
            empty_place: 0,
            animation_ms: ANIMATION_DURATION_MS,
        };
        field.empty_place = field.find_empty();

        if !field.is_solvable() {
            return Err(ConfigError::Unsolvable);
        }
        Ok(field)
    }

    /// Current layout as values in place order
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            width: self.layout.width,
            values: self.tiles.iter().map(|t| t.value).collect(),
        }
    }

    /// Override how long a slide takes to cover its distance
    pub fn set_animation_duration(&mut self, duration_ms: f64) -> Result<(), ConfigError> {
        if !(duration_ms.is_finite() && duration_ms > 0.0) {
            return Err(ConfigError::AnimationDuration(duration_ms));
        }
        self.animation_ms = duration_ms;
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.layout.width
    }

    #[inline]
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn tile_at(&self, place: usize) -> Option<&Tile> {
        self.tiles.get(place)
    }

    #[inline]
    pub fn empty_place(&self) -> usize {
        self.empty_place
    }

    /// Place currently holding `tile`
    pub fn place_of(&self, tile: TileId) -> Option<usize> {
        self.tiles.iter().position(|t| t.id() == tile)
    }

    fn find_empty(&self) -> usize {
        self.tiles
            .iter()
            .position(Tile::is_empty)
            .unwrap_or(self.layout.size() - 1)
    }

    /// Inversions among places `0..size - 1`, the trailing slot excluded
    ///
    /// This is the parity check used at shuffle time, where the empty slot
    /// always sits in that trailing slot.
    pub fn inversion_count(&self) -> usize {
        let size = self.tiles.len();
        let mut disorder = 0;
        for i in 0..size.saturating_sub(2) {
            for j in (i + 1)..(size - 1) {
                if self.tiles[i].value > self.tiles[j].value {
                    disorder += 1;
                }
            }
        }
        disorder
    }

    /// Full solvability test for any empty-slot position
    ///
    /// Odd widths need an even inversion count among numbered tiles. Even
    /// widths need inversions plus the empty slot's row counted from the
    /// bottom (1-based) to be odd.
    pub fn is_solvable(&self) -> bool {
        let numbered: Vec<u32> = self
            .tiles
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| t.value)
            .collect();
        let mut inversions = 0;
        for (i, a) in numbered.iter().enumerate() {
            inversions += numbered[i + 1..].iter().filter(|b| a > b).count();
        }

        let width = self.layout.width;
        if width % 2 == 1 {
            inversions % 2 == 0
        } else {
            let row_from_bottom = width - self.layout.row(self.empty_place);
            (inversions + row_from_bottom) % 2 == 1
        }
    }

    /// Every numbered tile sits at place `value - 1`
    pub fn is_completed(&self) -> bool {
        self.tiles
            .iter()
            .all(|t| t.is_empty() || (t.value - 1) as usize == t.place)
    }

    /// Slide `tile` into the empty slot if they are neighbours
    pub fn try_move(&mut self, tile: TileId) -> Result<Move, MoveError> {
        let place = self.place_of(tile).ok_or(MoveError::UnknownTile(tile.0))?;
        if self.tiles[place].is_empty() {
            return Err(MoveError::EmptySlot);
        }

        let empty = self.empty_place;
        if !self.layout.adjacent(place, empty) {
            return Err(MoveError::NotAdjacent { place, empty });
        }

        self.tiles.swap(place, empty);
        self.tiles[place].move_to(place);
        self.tiles[empty].move_to(empty);
        self.empty_place = place;

        Ok(Move {
            tile,
            from: place,
            to: empty,
        })
    }

    /// Slide `tile` into the empty slot, returning whether it moved
    pub fn move_tile(&mut self, tile: TileId) -> bool {
        self.try_move(tile).is_ok()
    }

    /// Tile under a screen point, as reported by the picking collaborator
    pub fn picked_tile<C: RayCaster + ?Sized>(&self, screen: Vec2, caster: &C) -> Option<TileId> {
        let half_extents = self.layout.tile_half_extents();
        let targets: Vec<PickTarget> = self
            .tiles
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| PickTarget {
                tile: t.id(),
                center: self.layout.to_world(t.position),
                half_extents,
            })
            .collect();
        caster.cast_ray(screen, &targets)
    }

    /// Advance every tile's slide animation
    pub fn animate(&mut self, time: f64) {
        let layout = self.layout;
        for tile in &mut self.tiles {
            tile.animate(time, &layout, self.animation_ms);
        }
    }

    /// Any tile still sliding
    pub fn is_interactive(&self) -> bool {
        self.tiles.iter().any(Tile::is_moving)
    }
}
