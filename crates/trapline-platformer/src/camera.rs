use serde::{Deserialize, Serialize};

use trapline_core::geometry::Rect;

use crate::config::WorldConfig;

/// Horizontal scroll state. World x minus `offset_x` is screen x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub offset_x: f32,
}

impl Camera {
    /// Scroll by the player's velocity when they move outward inside the
    /// scroll band at either edge of the view.
    pub fn follow(&mut self, player: &Rect, x_vel: f32, world: &WorldConfig) {
        let band = world.scroll_area_width;
        let near_right = player.right() - self.offset_x >= world.view_width - band;
        let near_left = player.left() - self.offset_x <= band;
        if (near_right && x_vel > 0.0) || (near_left && x_vel < 0.0) {
            self.offset_x += x_vel;
        }
    }

    /// Put the player in the middle of the view.
    pub fn recenter(&mut self, player: &Rect, world: &WorldConfig) {
        self.offset_x = player.center_x() - world.view_width / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldConfig {
        WorldConfig::default()
    }

    #[test]
    fn scrolls_only_inside_band() {
        let mut cam = Camera::default();
        let middle = Rect::new(400.0, 0.0, 64.0, 64.0);
        cam.follow(&middle, 5.0, &world());
        assert_eq!(cam.offset_x, 0.0);

        let right_edge = Rect::new(740.0, 0.0, 64.0, 64.0);
        cam.follow(&right_edge, 5.0, &world());
        assert_eq!(cam.offset_x, 5.0);
    }

    #[test]
    fn moving_inward_does_not_scroll() {
        let mut cam = Camera::default();
        let right_edge = Rect::new(900.0, 0.0, 64.0, 64.0);
        cam.follow(&right_edge, -5.0, &world());
        assert_eq!(cam.offset_x, 0.0);
    }

    #[test]
    fn left_band_scrolls_back() {
        let mut cam = Camera { offset_x: 500.0 };
        let player = Rect::new(650.0, 0.0, 64.0, 64.0);
        cam.follow(&player, -5.0, &world());
        assert_eq!(cam.offset_x, 495.0);
    }

    #[test]
    fn recenter_puts_player_mid_view() {
        let mut cam = Camera { offset_x: 1234.0 };
        cam.recenter(&Rect::new(100.0, 0.0, 64.0, 64.0), &world());
        assert_eq!(cam.offset_x, -368.0);
    }
}
