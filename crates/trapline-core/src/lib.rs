pub mod art;
pub mod events;
pub mod geometry;
pub mod input;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::art::{ArtContext, SpriteSheet};
    use crate::input::InputIntents;

    /// No buttons held.
    pub fn idle() -> InputIntents {
        InputIntents::default()
    }

    /// Hold right.
    pub fn hold_right() -> InputIntents {
        InputIntents {
            right: true,
            ..Default::default()
        }
    }

    /// Hold left.
    pub fn hold_left() -> InputIntents {
        InputIntents {
            left: true,
            ..Default::default()
        }
    }

    /// Press jump this tick.
    pub fn press_jump() -> InputIntents {
        InputIntents {
            jump: true,
            ..Default::default()
        }
    }

    /// Press restart this tick.
    pub fn press_restart() -> InputIntents {
        InputIntents {
            restart: true,
            ..Default::default()
        }
    }

    /// Press next-level this tick.
    pub fn press_next() -> InputIntents {
        InputIntents {
            next_level: true,
            ..Default::default()
        }
    }

    /// Builtin art with a fully opaque square player, so mask tests reduce to
    /// plain rectangle arithmetic.
    pub fn square_player_art(size: u32) -> ArtContext {
        use crate::art::sheets;

        let mut art = ArtContext::builtin();
        for name in [
            sheets::PLAYER_IDLE,
            sheets::PLAYER_RUN,
            sheets::PLAYER_JUMP,
            sheets::PLAYER_DOUBLE_JUMP,
            sheets::PLAYER_FALL,
            sheets::PLAYER_HIT,
        ] {
            let count = art.frame_count(name).max(1);
            art.insert(name, SpriteSheet::uniform(count, size, size, |_, _| true));
        }
        art
    }
}
