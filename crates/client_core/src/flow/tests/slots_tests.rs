use super::*;

fn image(name: &str) -> ImageRef {
    ImageRef::from_url(format!("http://img/{name}"))
}

#[test]
fn completion_requires_every_slot() {
    for required in 1..=4 {
        let mut slots = ImageSlots::new(required, TransformRange::MULTI_SLOT);
        for index in 0..required {
            assert!(!slots.is_complete(), "{index} of {required}");
            assert!(slots.select(index));
            slots.fill_current(image(&index.to_string()), Orientation::Unknown);
        }
        assert!(slots.is_complete());
        assert_eq!(slots.filled_count(), required);
    }
}

#[test]
fn images_come_back_in_slot_order() {
    let mut slots = ImageSlots::new(3, TransformRange::MULTI_SLOT);
    slots.select(2);
    slots.fill_current(image("c"), Orientation::Portrait);
    slots.select(0);
    slots.fill_current(image("a"), Orientation::Portrait);
    slots.select(1);
    slots.fill_current(image("b"), Orientation::Portrait);
    assert_eq!(slots.images(), vec![image("a"), image("b"), image("c")]);

    assert!(slots.clear(1));
    assert!(!slots.clear(7));
    assert_eq!(slots.images(), vec![image("a"), image("c")]);
    assert!(!slots.is_complete());
}

#[test]
fn selection_stays_in_bounds() {
    let mut slots = ImageSlots::new(2, TransformRange::MULTI_SLOT);
    assert!(!slots.select(2));
    slots.select_next();
    slots.select_next();
    assert_eq!(slots.current_index(), 1);
    slots.select_previous();
    slots.select_previous();
    assert_eq!(slots.current_index(), 0);
    assert_eq!(ImageSlots::new(0, TransformRange::MULTI_SLOT).len(), 1);
}

#[test]
fn nudges_edit_only_filled_selected_slot() {
    let mut slots = ImageSlots::new(2, TransformRange::MULTI_SLOT);
    slots.nudge_current(Nudge::Right);
    assert_eq!(slots.current().transform, TransformRange::MULTI_SLOT.reset());

    slots.fill_current(image("a"), Orientation::Unknown);
    slots.nudge_current(Nudge::Right);
    assert_eq!(slots.current().transform.x, 10.0);
    assert_eq!(slots.get(1).map(|slot| slot.transform.x), Some(0.0));

    slots.reset_current();
    assert_eq!(slots.current().transform, TransformRange::MULTI_SLOT.reset());
}

#[test]
fn film_frames_pan_along_their_long_edge() {
    let mut slots = ImageSlots::new(3, TransformRange::ABSOLUTE);
    slots.fill_current(image("wide"), Orientation::Landscape);
    slots.nudge_current(Nudge::Left);
    assert_eq!(slots.current().transform, TransformState::new(40.0, 50.0, 1.0));

    slots.select(1);
    slots.fill_current(image("tall"), Orientation::Portrait);
    slots.nudge_current(Nudge::Left);
    assert_eq!(slots.current().transform, TransformState::new(50.0, 40.0, 1.0));
}

#[test]
fn restore_clamps_saved_transforms() {
    let slots = ImageSlots::restore(
        2,
        TransformRange::ABSOLUTE,
        &[image("a"), image("b"), image("extra")],
        &[TransformState::new(-5.0, 150.0, 9.0)],
    );
    assert_eq!(slots.len(), 2);
    assert!(slots.is_complete());
    assert_eq!(
        slots.transforms(),
        vec![
            TransformState::new(0.0, 100.0, 3.0),
            TransformRange::ABSOLUTE.reset()
        ]
    );
}
