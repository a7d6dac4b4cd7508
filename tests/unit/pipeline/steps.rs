use super::*;
use crate::animation::ease::Easing;
use crate::foundation::core::{Layer, Origin};
use crate::scene::element::Element;
use crate::scene::script::Group;

fn ctx_with(groups: Vec<Group>) -> StepContext {
    StepContext {
        groups,
        ..StepContext::default()
    }
}

fn only_sprite(ctx: &StepContext) -> &Sprite {
    ctx.groups[0].elements[0].sprite().unwrap()
}

#[test]
fn filter_drops_hidden_and_mismatched_targets() {
    let mut visible = Group::new("visible");
    visible.target = Some("normal".to_string());
    let mut hidden = Group::new("hidden");
    hidden.visible = false;
    let mut other = Group::new("other");
    other.target = Some("insane".to_string());
    let any = Group::new("any");
    let groups = vec![visible, hidden, other, any];

    let mut ctx = ctx_with(groups.clone());
    FilterStep::new(Some("normal".to_string()), false)
        .pre_generate(&mut ctx)
        .unwrap();
    let names: Vec<_> = ctx.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["visible", "any"]);

    let mut ctx = ctx_with(groups);
    FilterStep::new(None, true).pre_generate(&mut ctx).unwrap();
    assert_eq!(ctx.groups.len(), 4);
}

#[test]
fn widescreen_shifts_positions_and_x_values() {
    let mut g = Group::new("G");
    let s = g.create_sprite(
        "a.png",
        Layer::Background,
        Origin::Centre,
        Vec2::new(500.0, 200.0),
    );
    s.move_(
        Easing::None,
        0.0,
        100.0,
        Vec2::new(500.0, 200.0),
        Vec2::new(600.0, 300.0),
    );
    s.move_y(Easing::None, 0.0, 100.0, 10.0, 20.0);
    s.start_loop(0.0, 2).unwrap();
    s.move_x(Easing::None, 0.0, 100.0, 107.0, 207.0);
    s.end_group().unwrap();
    let mut ctx = ctx_with(vec![g]);

    WidescreenStep::default().post_process(&mut ctx).unwrap();

    let s = only_sprite(&ctx);
    assert_eq!(s.initial_position, Vec2::new(393.0, 200.0));
    let m = &s.timeline.position.commands()[0];
    assert_eq!(m.start_value, Vec2::new(393.0, 200.0));
    assert_eq!(m.end_value, Vec2::new(493.0, 300.0));
    assert_eq!(s.timeline.y.commands()[0].start_value, 10.0);
    let mx = &s.loops[0].timeline.x.commands()[0];
    assert_eq!((mx.start_value, mx.end_value), (0.0, 100.0));
}

#[test]
fn widescreen_custom_offset_moves_both_axes() {
    let mut g = Group::new("G");
    let s = g.create_sprite(
        "a.png",
        Layer::Background,
        Origin::Centre,
        Vec2::new(100.0, 100.0),
    );
    s.move_(
        Easing::None,
        0.0,
        100.0,
        Vec2::new(100.0, 100.0),
        Vec2::new(200.0, 50.0),
    );
    s.move_y(Easing::None, 0.0, 100.0, 10.0, 20.0);
    let mut ctx = ctx_with(vec![g]);

    WidescreenStep::new(Vec2::new(20.0, 5.0))
        .post_process(&mut ctx)
        .unwrap();

    let s = only_sprite(&ctx);
    assert_eq!(s.initial_position, Vec2::new(80.0, 95.0));
    let m = &s.timeline.position.commands()[0];
    assert_eq!(m.end_value, Vec2::new(180.0, 45.0));
    let my = &s.timeline.y.commands()[0];
    assert_eq!((my.start_value, my.end_value), (5.0, 15.0));
}

#[test]
fn precision_rounds_each_family_with_its_own_digits() {
    let mut g = Group::new("G");
    let s = g.create_sprite(
        "a.png",
        Layer::Background,
        Origin::Centre,
        Vec2::new(1.23456, 2.0),
    );
    s.move_x(Easing::None, 0.0, 1.0, 123.45678, 0.0);
    s.scale(Easing::None, 0.0, 1.0, 1.23456, 1.0);
    s.fade(Easing::None, 0.0, 1.0, 0.123456, 1.0);
    s.rotate(Easing::None, 0.0, 1.0, 3.14159, 0.0);
    s.start_trigger("Passing", 0.0, 10.0, 0).unwrap();
    s.move_(
        Easing::None,
        0.0,
        1.0,
        Vec2::new(0.555, 0.0),
        Vec2::new(0.0, 0.0),
    );
    s.end_group().unwrap();
    let mut ctx = ctx_with(vec![g]);

    PrecisionStep::new(2, 1, 3).post_process(&mut ctx).unwrap();

    let s = only_sprite(&ctx);
    assert_eq!(s.initial_position, Vec2::new(1.23, 2.0));
    assert_eq!(s.timeline.x.commands()[0].start_value, 123.46);
    assert_eq!(s.timeline.scale.commands()[0].start_value, 1.23);
    assert_eq!(s.timeline.opacity.commands()[0].start_value, 0.1);
    assert_eq!(s.timeline.rotation.commands()[0].start_value, 3.142);
    assert_eq!(
        s.triggers[0].timeline.position.commands()[0].start_value,
        Vec2::new(0.56, 0.0)
    );
}

#[test]
fn steps_leave_samples_and_videos_alone() {
    let mut g = Group::new("G");
    g.add(crate::scene::element::Sample {
        path: "hit.wav".to_string(),
        layer: Layer::Background,
        start_time: 12.345,
        volume: 55.5,
    });
    let mut ctx = ctx_with(vec![g.clone()]);
    WidescreenStep::default().post_process(&mut ctx).unwrap();
    PrecisionStep::new(0, 0, 0).post_process(&mut ctx).unwrap();
    assert_eq!(ctx.groups, vec![g]);
    assert!(matches!(ctx.groups[0].elements[0], Element::Sample(_)));
}
