//! Game state and core simulation types
//!
//! `GameState` is owned by [`super::Simulation`] and replaced wholesale on
//! init/reset. Renderers get it read-only through a snapshot.

use std::collections::{BTreeSet, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, player_hits_pipe};
use crate::tuning::Tuning;

/// Reserved catalog identifier for the repeatable candle collectible
pub const CANDLE_NAME: &str = "candle";

/// Most entries a catalog keeps; ids are `u16`
pub const MAX_CATALOG_LEN: usize = u16::MAX as usize + 1;

/// Index of an ingredient in the [`IngredientCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IngredientId(pub u16);

/// Index of a decorative logo in the [`LogoCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogoId(pub u16);

/// Ordered, de-duplicated list of the ingredients the cake needs (candles excluded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientCatalog {
    names: Vec<String>,
}

impl Default for IngredientCatalog {
    fn default() -> Self {
        Self::from_names(["flour", "egg", "sugar", "cocoa", "strawberry", "cream"])
    }
}

impl IngredientCatalog {
    /// Build from collaborator-supplied identifiers.
    ///
    /// The reserved `candle` id is dropped (candles are tracked separately),
    /// as are duplicates; first occurrence wins the position. Entries past
    /// [`MAX_CATALOG_LEN`] are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for name in names {
            let name = name.into();
            if name == CANDLE_NAME || seen.contains(&name) {
                continue;
            }
            if out.len() == MAX_CATALOG_LEN {
                log::warn!("Ingredient catalog truncated at {} entries", MAX_CATALOG_LEN);
                break;
            }
            seen.insert(name.clone());
            out.push(name);
        }
        Self { names: out }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: IngredientId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// Ids in catalog order
    pub fn ids(&self) -> impl Iterator<Item = IngredientId> + '_ {
        (0..self.names.len()).map_while(|i| u16::try_from(i).ok().map(IngredientId))
    }

    /// `(id, name)` pairs in catalog order
    pub fn entries(&self) -> impl Iterator<Item = (IngredientId, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map_while(|(i, n)| Some((IngredientId(u16::try_from(i).ok()?), n.as_str())))
    }
}

/// Decorative logos stacked on obstacles. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoCatalog {
    names: Vec<String>,
}

impl Default for LogoCatalog {
    fn default() -> Self {
        Self::from_names(["btc", "eth", "usdt", "ton", "sol", "bnb", "shib", "doge"])
    }
}

impl LogoCatalog {
    /// Entries past [`MAX_CATALOG_LEN`] are dropped
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .take(MAX_CATALOG_LEN)
                .map(Into::into)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: LogoId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// Id of the `index`-th logo, if the catalog has one there
    pub fn id(&self, index: usize) -> Option<LogoId> {
        (index < self.names.len())
            .then(|| u16::try_from(index).ok())
            .flatten()
            .map(LogoId)
    }
}

/// Obstacle geometry, one variant per spawn strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Column spanning the viewport height with a gap at `gap_y..gap_y + gap_height`
    GapPipe {
        width: f32,
        gap_y: f32,
        gap_height: f32,
        /// Decoration stacked top-down above the gap
        logos_top: Vec<LogoId>,
        /// Decoration stacked top-down below the gap
        logos_bottom: Vec<LogoId>,
    },
    /// Square hazard with its top edge at `y`
    PointHazard {
        y: f32,
        size: f32,
        speed: f32,
        logo: Option<LogoId>,
    },
}

/// A scrolling hazard; `x` is its left edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub kind: ObstacleKind,
}

impl Obstacle {
    /// Horizontal extent
    pub fn width(&self) -> f32 {
        match self.kind {
            ObstacleKind::GapPipe { width, .. } => width,
            ObstacleKind::PointHazard { size, .. } => size,
        }
    }

    /// Leftward speed; pipes scroll with the world, hazards carry their own
    pub fn speed(&self, scroll_speed: f32) -> f32 {
        match self.kind {
            ObstacleKind::GapPipe { .. } => scroll_speed,
            ObstacleKind::PointHazard { speed, .. } => speed,
        }
    }

    /// True once the trailing (right) edge has left the viewport
    pub fn is_offscreen(&self) -> bool {
        self.x + self.width() < 0.0
    }

    /// Whether the player hitbox touches this obstacle's solid region
    pub fn hits(&self, player: &Aabb) -> bool {
        match self.kind {
            ObstacleKind::GapPipe {
                width,
                gap_y,
                gap_height,
                ..
            } => player_hits_pipe(player, self.x, width, gap_y, gap_height),
            ObstacleKind::PointHazard { y, size, .. } => {
                Aabb::from_origin_size(self.x, y, size, size).overlaps(player)
            }
        }
    }
}

/// What a collectible represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Ingredient(IngredientId),
    Candle,
}

/// A scrolling pickup; `(x, y)` is its top-left corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub kind: ItemKind,
    /// Leftward speed, matching the obstacle it was spawned with
    pub speed: f32,
    pub collected: bool,
}

impl Collectible {
    pub fn hitbox(&self, size: f32) -> Aabb {
        Aabb::from_origin_size(self.x, self.y, size, size)
    }

    pub fn is_live_candle(&self) -> bool {
        self.kind == ItemKind::Candle && !self.collected
    }
}

/// Collection objective progress for the current session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CakeProgress {
    /// Ingredients collected, each at most once
    pub ingredients: BTreeSet<IngredientId>,
    /// Candles collected, never above the configured count
    pub candles: u32,
}

impl CakeProgress {
    /// Record an ingredient; returns false if it was already collected
    pub fn collect_ingredient(&mut self, id: IngredientId) -> bool {
        self.ingredients.insert(id)
    }

    /// Record a candle up to `limit`; returns false if already at the limit
    pub fn collect_candle(&mut self, limit: u32) -> bool {
        if self.candles < limit {
            self.candles += 1;
            true
        } else {
            false
        }
    }

    /// First catalog ingredient not yet collected
    pub fn next_ingredient(&self, catalog: &IngredientCatalog) -> Option<IngredientId> {
        catalog.ids().find(|id| !self.ingredients.contains(id))
    }

    pub fn all_ingredients(&self, catalog: &IngredientCatalog) -> bool {
        catalog.ids().all(|id| self.ingredients.contains(&id))
    }
}

/// Win-condition debounce
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum WinDebounce {
    /// Condition not holding
    #[default]
    Idle,
    /// Condition has held continuously for `elapsed` seconds
    Debouncing { elapsed: f32 },
    /// Cake revealed
    Triggered,
}

/// Notifications for collaborators (audio, HUD); drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    /// Hit an obstacle or the floor
    Crashed,
    ObstaclePassed { score: u32 },
    IngredientCollected(IngredientId),
    CandleCollected { collected: u32 },
    /// Terminal success transition
    CakeRevealed,
    /// Celebration: the n-th collected ingredient drops into the bowl
    IngredientDropped(usize),
    BowlShake,
    CakeBaked,
}

/// Complete simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub width: f32,
    pub height: f32,
    /// Fixed at a fraction of the width for the whole session
    pub player_x: f32,
    pub player_y: f32,
    /// Vertical speed, positive is falling
    pub velocity: f32,
    pub gravity: f32,
    pub jump_power: f32,
    /// Obstacles fully passed
    pub score: u32,
    pub is_game_over: bool,
    /// Spawn order, left to right
    pub obstacles: Vec<Obstacle>,
    pub obstacle_timer: f32,
    pub obstacle_interval: f32,
    /// Spawn order, left to right
    pub items: Vec<Collectible>,
    pub is_final_cake_shown: bool,
    pub progress: CakeProgress,
    pub win: WinDebounce,
    next_id: u32,
}

impl GameState {
    /// Fresh state at rest for a viewport
    pub fn new(width: f32, height: f32, tuning: &Tuning) -> Self {
        Self {
            width,
            height,
            player_x: (width * tuning.player_x_ratio).round(),
            player_y: (height * 0.5).round(),
            velocity: 0.0,
            gravity: tuning.gravity,
            jump_power: tuning.jump_power,
            score: 0,
            is_game_over: false,
            obstacles: Vec::new(),
            obstacle_timer: 0.0,
            obstacle_interval: tuning.obstacle_interval,
            items: Vec::new(),
            is_final_cake_shown: false,
            progress: CakeProgress::default(),
            win: WinDebounce::Idle,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Either failure or success reached
    pub fn is_terminal(&self) -> bool {
        self.is_game_over || self.is_final_cake_shown
    }

    pub fn player_pos(&self) -> Vec2 {
        Vec2::new(self.player_x, self.player_y)
    }

    pub fn player_hitbox(&self, size: f32) -> Aabb {
        Aabb::centered(self.player_pos(), size)
    }

    /// An uncollected candle is currently scrolling
    pub fn candle_on_field(&self) -> bool {
        self.items.iter().any(Collectible::is_live_candle)
    }

    /// Put the player back at rest and drop everything transient
    pub(crate) fn clear_session(&mut self) {
        self.player_y = (self.height * 0.5).round();
        self.velocity = 0.0;
        self.score = 0;
        self.is_game_over = false;
        self.is_final_cake_shown = false;
        self.obstacles.clear();
        self.items.clear();
        self.obstacle_timer = 0.0;
        self.progress = CakeProgress::default();
        self.win = WinDebounce::Idle;
    }
}
