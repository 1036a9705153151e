//! Tests for collapsing delivered messages into replay pointers.

use siphon_core::{Delivered, DeliveredMessagePointer, MessagePointer};

#[test]
fn test_single_message_pointer() {
    let delivered = Delivered::Message(MessagePointer::single(7, 1));
    assert_eq!(
        delivered.pointer(),
        Some(DeliveredMessagePointer::One(MessagePointer::single(7, 1)))
    );
}

#[test]
fn test_batch_collapses_groups_to_heads() {
    let delivered = Delivered::Batch(vec![
        Delivered::Group(vec![MessagePointer::single(7, 1), MessagePointer::single(7, 2)]),
        Delivered::Message(MessagePointer::single(7, 3)),
    ]);

    let Some(DeliveredMessagePointer::Many(pointers)) = delivered.pointer() else {
        panic!("Expected a multi-message pointer");
    };
    assert_eq!(pointers.len(), 2);
    assert!(pointers[0].is_group);
    assert_eq!(pointers[0].message_id, 1);
    assert!(!pointers[1].is_group);
}

#[test]
fn test_empty_delivery_has_no_pointer() {
    assert_eq!(Delivered::Batch(vec![]).pointer(), None);
    assert_eq!(Delivered::Group(vec![]).pointer(), None);
}

#[test]
fn test_trailing_caption_is_not_recorded() {
    let delivered = Delivered::Batch(vec![
        Delivered::Group(vec![MessagePointer::single(7, 1), MessagePointer::single(7, 2)]),
        Delivered::Caption(MessagePointer::single(7, 3)),
    ]);

    let Some(DeliveredMessagePointer::Many(pointers)) = delivered.pointer() else {
        panic!("Expected a multi-message pointer");
    };
    assert_eq!(pointers, vec![MessagePointer { chat_id: 7, message_id: 1, is_group: true }]);
    assert_eq!(Delivered::Caption(MessagePointer::single(7, 3)).pointer(), None);
}
