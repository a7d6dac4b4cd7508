use super::*;
use crate::animation::ease::Easing;

#[test]
fn group_extrema_span_every_property() {
    let mut g = TimelineGroup::default();
    assert!(g.is_empty());
    assert_eq!(g.start_time(), None);

    g.opacity.add(Easing::None, 200.0, 400.0, 0.0, 1.0);
    g.position
        .add(Easing::None, 100.0, 150.0, Vec2::ZERO, Vec2::new(1.0, 1.0));
    g.flip_h.add(Easing::None, 900.0, 900.0, true, true);

    assert_eq!(g.command_count(), 3);
    assert_eq!(g.start_time(), Some(100.0));
    assert_eq!(g.end_time(), Some(900.0));
}

#[test]
fn loop_window_multiplies_iteration_length() {
    let mut l = Loop {
        start_time: 1000.0,
        repeat_count: 3,
        ..Loop::default()
    };
    assert_eq!(l.window(), None);
    l.timeline.scale.add(Easing::None, 0.0, 250.0, 1.0, 2.0);
    l.timeline.scale.add(Easing::None, 250.0, 500.0, 2.0, 1.0);
    assert_eq!(l.window(), Some((1000.0, 2500.0)));
}

#[test]
fn trigger_window_covers_relative_commands() {
    let mut t = Trigger {
        name: "HitSoundClap".to_string(),
        start_time: 0.0,
        end_time: 5000.0,
        ..Trigger::default()
    };
    t.timeline.opacity.add(Easing::None, 0.0, 300.0, 1.0, 0.0);
    assert_eq!(t.window(), (0.0, 5300.0));
}

#[test]
fn check_windows_reports_backwards_commands() {
    let mut g = TimelineGroup::default();
    g.rotation.add(Easing::None, 10.0, 5.0, 0.0, 1.0);
    assert!(g.check_windows().is_err());
}
