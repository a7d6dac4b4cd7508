use super::*;

#[test]
fn extrema_ignore_insertion_order() {
    let mut tl = Timeline::<f64>::default();
    tl.add(Easing::None, 500.0, 900.0, 0.0, 1.0);
    tl.add(Easing::None, 100.0, 200.0, 1.0, 0.0);
    assert_eq!(tl.start_time(), Some(100.0));
    assert_eq!(tl.end_time(), Some(900.0));
    assert_eq!(tl.len(), 2);

    let empty = Timeline::<f64>::default();
    assert!(empty.is_empty());
    assert_eq!(empty.start_time(), None);
    assert_eq!(empty.value_at(10.0), None);
}

#[test]
fn sorted_is_stable_for_equal_windows() {
    let mut tl = Timeline::<f64>::default();
    tl.add(Easing::None, 0.0, 10.0, 1.0, 1.0);
    tl.add(Easing::None, 0.0, 10.0, 2.0, 2.0);
    tl.add(Easing::None, 0.0, 5.0, 3.0, 3.0);
    let values: Vec<f64> = tl.sorted().iter().map(|c| c.start_value).collect();
    assert_eq!(values, vec![3.0, 1.0, 2.0]);
}

#[test]
fn value_at_holds_and_interpolates() {
    let mut tl = Timeline::<f64>::default();
    tl.add(Easing::None, 100.0, 200.0, 0.0, 1.0);
    tl.add(Easing::None, 300.0, 300.0, 0.5, 0.5);
    assert_eq!(tl.value_at(0.0), Some(0.0));
    assert_eq!(tl.value_at(150.0), Some(0.5));
    assert_eq!(tl.value_at(250.0), Some(1.0));
    assert_eq!(tl.value_at(1000.0), Some(0.5));
}

#[test]
fn vector_and_flag_values() {
    let cmd = Command {
        easing: Easing::None,
        start_time: 0.0,
        end_time: 100.0,
        start_value: Vec2::new(0.0, 0.0),
        end_value: Vec2::new(100.0, 50.0),
    };
    assert_eq!(cmd.value_at(50.0), Vec2::new(50.0, 25.0));

    let flag = Command {
        easing: Easing::None,
        start_time: 0.0,
        end_time: 100.0,
        start_value: true,
        end_value: true,
    };
    assert!(flag.value_at(50.0));
}

#[test]
fn backwards_window_is_a_format_violation() {
    let mut tl = Timeline::<f64>::default();
    tl.add(Easing::None, 1000.0, 1000.0, 0.0, 1.0);
    assert!(tl.check_windows().is_ok());
    tl.add(Easing::None, 1000.0, 900.0, 0.0, 1.0);
    assert!(matches!(
        tl.check_windows(),
        Err(StoryError::FormatViolation(_))
    ));
}
