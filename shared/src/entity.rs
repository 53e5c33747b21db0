//! Per-participant state shared by host and clients.

use serde::{Deserialize, Serialize};

/// Hitbox width of every entity.
pub const ENTITY_WIDTH: f64 = 50.0;
/// Hitbox height of every entity.
pub const ENTITY_HEIGHT: f64 = 100.0;

/// Stable identifier of the connection that owns an entity.
pub type PeerId = String;

/// A 2D vector in screen space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Half-open overlap test; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Movement tunables. Every entity carries its own copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    pub acceleration: f64,
    pub max_speed: f64,
    pub max_jumps: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            acceleration: 4.0,
            max_speed: 1.5,
            max_jumps: 2,
        }
    }
}

/// Horizontal direction requested by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Horizontal {
    Left,
    #[default]
    Neutral,
    Right,
}

impl Horizontal {
    /// Maps to the -1 / 0 / 1 axis value.
    pub fn axis(self) -> i8 {
        match self {
            Horizontal::Left => -1,
            Horizontal::Neutral => 0,
            Horizontal::Right => 1,
        }
    }

    /// Any negative value is left, any positive value is right.
    pub fn from_axis(value: i8) -> Self {
        match value.signum() {
            -1 => Horizontal::Left,
            1 => Horizontal::Right,
            _ => Horizontal::Neutral,
        }
    }
}

/// Input for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputState {
    pub horizontal: Horizontal,
    pub jump: bool,
}

impl InputState {
    pub fn new(horizontal: Horizontal, jump: bool) -> Self {
        Self { horizontal, jump }
    }

    /// Folds a newer input into this one. Direction follows the newest
    /// message; a jump request stays latched until consumed.
    pub fn merge(&mut self, newer: InputState) {
        self.horizontal = newer.horizontal;
        self.jump |= newer.jump;
    }
}

/// One participant in the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: PeerId,
    pub display_name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub input: InputState,
    pub jumps_remaining: u32,
    pub grounded: bool,
    pub tunables: Tunables,
}

impl Entity {
    pub fn new(id: impl Into<PeerId>, display_name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            position,
            velocity: Vec2::ZERO,
            input: InputState::default(),
            jumps_remaining: 0,
            grounded: false,
            tunables: Tunables::default(),
        }
    }

    /// Hitbox at the entity's current position.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, ENTITY_WIDTH, ENTITY_HEIGHT)
    }
}
