//! Axis-aligned geometry for tanks, bullets and tiles
//!
//! Screen convention: origin at the top-left, x grows right, y grows down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// An axis-aligned rectangle (top-left corner + extent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect of the given size centered on a point
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap test. Rects that only share an edge do not intersect,
    /// and empty rects intersect nothing.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.w <= 0.0 || self.h <= 0.0 || other.w <= 0.0 || other.h <= 0.0 {
            return false;
        }
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Playfield bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(ARENA_WIDTH, ARENA_HEIGHT)
    }
}

impl Arena {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Whether a point lies within [0, width] x [0, height]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Clamp a center point so a body with the given half extent stays inside
    pub fn clamp_center(&self, center: Vec2, half: Vec2) -> Vec2 {
        Vec2::new(
            center.x.clamp(half.x, self.width - half.x),
            center.y.clamp(half.y, self.height - half.y),
        )
    }

    /// Fixed player spawn point, bottom center
    pub fn player_spawn(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.height - 56.0)
    }

    /// Area around the player spawn that enemies may not spawn into
    pub fn player_spawn_rect(&self) -> Rect {
        Rect::new(self.center_x() - 52.0, self.height - 112.0, 104.0, 96.0)
    }

    /// Area around the player spawn kept free of obstacles
    pub fn player_safe_zone(&self) -> Rect {
        Rect::new(self.center_x() - 86.0, self.height - 150.0, 172.0, 130.0)
    }

    /// Top band kept free of obstacles so enemies have room to enter
    pub fn enemy_safe_band(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, 84.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 32.0, 32.0);
        let right = Rect::new(32.0, 0.0, 32.0, 32.0);
        let below = Rect::new(0.0, 32.0, 32.0, 32.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
    }

    #[test]
    fn test_empty_rect_intersects_nothing() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let empty = Rect::new(2.0, 2.0, 0.0, 5.0);
        assert!(!a.intersects(&empty));
    }

    #[test]
    fn test_from_center() {
        let r = Rect::from_center(Vec2::new(100.0, 50.0), Vec2::splat(36.0));
        assert_eq!(r.left(), 82.0);
        assert_eq!(r.bottom(), 68.0);
        assert_eq!(r.top(), 32.0);
        assert_eq!(r.right(), 118.0);
    }

    #[test]
    fn test_arena_clamp_and_contains() {
        let arena = Arena::default();
        let half = Vec2::splat(18.0);
        assert_eq!(arena.clamp_center(Vec2::new(-5.0, 9999.0), half), Vec2::new(18.0, 502.0));
        assert!(arena.contains(Vec2::new(0.0, 520.0)));
        assert!(!arena.contains(Vec2::new(-0.1, 10.0)));
        assert!(!arena.contains(Vec2::new(10.0, 520.5)));
    }

    #[test]
    fn test_spawn_inside_safe_zone() {
        let arena = Arena::default();
        let spawn = arena.player_spawn();
        let body = Rect::from_center(spawn, Vec2::splat(36.0));
        for zone in [arena.player_safe_zone(), arena.player_spawn_rect()] {
            assert!(zone.left() <= body.left() && body.right() <= zone.right());
            assert!(zone.top() <= body.top() && body.bottom() <= zone.bottom());
        }
    }
}
