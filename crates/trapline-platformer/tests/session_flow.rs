use std::sync::Arc;

use trapline_core::art::ArtContext;
use trapline_core::events::{DeathCause, GameEvent};
use trapline_core::test_helpers::{hold_right, idle, press_restart};
use trapline_core::input::InputIntents;
use trapline_core::time::TickClock;
use trapline_platformer::config::PlatformerConfig;
use trapline_platformer::course_gen::GeneratedLevels;
use trapline_platformer::level::{BuiltinLevels, LevelLayout, LevelSource};
use trapline_platformer::{FrameResult, LevelSession, SessionStatus};

const FLOOR_Y: f32 = 704.0;

fn start(levels: impl LevelSource + Send + 'static) -> (LevelSession, TickClock) {
    let session = LevelSession::new(
        PlatformerConfig::default(),
        Arc::new(ArtContext::builtin()),
        Box::new(levels),
    );
    (session, TickClock::new(60.0))
}

fn run_until(
    session: &mut LevelSession,
    clock: &mut TickClock,
    input: InputIntents,
    limit: usize,
    pred: impl Fn(&FrameResult) -> bool,
) -> Option<FrameResult> {
    (0..limit)
        .map(|_| session.process_tick(&input, clock.advance()))
        .find(|frame| pred(frame))
}

#[test]
fn builtin_level_fire_kills_runner() {
    let (mut session, mut clock) = start(BuiltinLevels::default());
    let death = run_until(&mut session, &mut clock, hold_right(), 600, |f| {
        f.status == SessionStatus::Dead
    })
    .expect("runner should reach the fire");
    assert_eq!(death.death_cause, Some(DeathCause::Fire));
    assert!((FLOOR_Y - death.player_rect.bottom()).abs() < 1.0, "dies on the floor");
    assert!((560.0..680.0).contains(&death.player_rect.x));
    assert!(death.show_restart_prompt);
    assert!(death.camera_offset_x >= 0.0);

    let frame = session.process_tick(&press_restart(), clock.advance());
    assert_eq!(frame.status, SessionStatus::Running);
    assert_eq!((session.player().x, session.player().y), (100.0, 100.0));
}

#[test]
fn generated_course_start_is_safe() {
    let (mut session, mut clock) = start(GeneratedLevels {
        seed: 42,
        ..Default::default()
    });
    for _ in 0..300 {
        let frame = session.process_tick(&idle(), clock.advance());
        assert_eq!(frame.status, SessionStatus::Running);
    }
    assert_eq!(session.level_name(), "generated-42");
    assert!((session.player().bottom() - FLOOR_Y).abs() < 1.0);
}

#[test]
fn toml_level_plays_to_completion() {
    let layout = LevelLayout::from_toml_str(
        r#"
        name = "short"
        spawn = { x = 100.0, y = 640.0 }

        [[object]]
        kind = "block"
        x = 0.0
        y = 704.0

        [[object]]
        kind = "block"
        x = 96.0
        y = 704.0

        [[object]]
        kind = "block"
        x = 192.0
        y = 704.0

        [[object]]
        kind = "block"
        x = 288.0
        y = 704.0

        [[object]]
        kind = "end"
        x = 250.0
        y = 576.0
        "#,
    )
    .unwrap();

    let (mut session, mut clock) = start(vec![layout]);
    let frame = run_until(&mut session, &mut clock, hold_right(), 300, |f| {
        f.status == SessionStatus::LevelComplete
    })
    .expect("runner should reach the end marker");
    assert!(frame.events.contains(&GameEvent::EndReached { object: 4 }));
    assert_eq!(frame.deaths, 0);

    let frame = run_until(&mut session, &mut clock, idle(), 200, |f| f.show_completion_overlay)
        .unwrap();
    assert_eq!(frame.completion.map(|c| c.elapsed_ms), Some(frame.elapsed_ms));
}
