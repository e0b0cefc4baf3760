use glam::Vec2;

/// Normalized pointer state shared with pointer-driven effects.
/// `origin` latches the first observed position; `last` trails by one move.
#[derive(Debug, Clone, Copy)]
pub struct PointerState {
    pub position: Vec2,
    pub last: Vec2,
    pub origin: Vec2,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: Vec2::splat(-1.0),
            last: Vec2::splat(-1.0),
            origin: Vec2::new(-1000.0, -1000.0),
        }
    }
}

impl PointerState {
    pub fn move_to(&mut self, position: Vec2) {
        self.last = self.position;
        self.position = position;
        if self.origin.x <= -999.0 {
            self.origin = position;
        }
    }

    /// Distance covered since the previous move, used as ripple strength.
    pub fn speed(&self) -> f32 {
        self.position.distance(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_tracks_last_and_origin() {
        let mut pointer = PointerState::default();
        pointer.move_to(Vec2::new(0.5, 0.5));
        assert_eq!(pointer.origin, Vec2::new(0.5, 0.5));
        pointer.move_to(Vec2::new(0.8, 0.5));
        assert_eq!(pointer.last, Vec2::new(0.5, 0.5));
        assert_eq!(pointer.position, Vec2::new(0.8, 0.5));
        assert_eq!(pointer.origin, Vec2::new(0.5, 0.5));
        assert!((pointer.speed() - 0.3).abs() < 1e-6);
    }
}
