//! Integration tests for the xit-core key tables and checks.
//!
//! These tests exercise the public API the way the harness does: look up the
//! pairs for a layout, translate each code to the keycode the server will
//! report, and run the keysym check against a resolved value.

use xit_core::{
    domain::check::{check_keysym, AssertionFailure},
    keymap::{
        keysym::{XK_y, XK_z},
        layout::multimedia_keys,
        linux_input::{x11_keycode, KEY_Y},
    },
    LayoutTable,
};

#[test]
fn test_every_builtin_pair_has_a_core_keycode() {
    let table = LayoutTable::builtin();
    for layout in table.layouts() {
        for pair in table.pairs(layout) {
            assert!(
                x11_keycode(pair.code).is_some(),
                "{layout}: code {} has no core keycode",
                pair.code
            );
        }
    }
    for pair in multimedia_keys() {
        assert!(x11_keycode(pair.code).is_some());
    }
}

#[test]
fn test_german_key_y_resolves_to_z() {
    // Arrange
    let table = LayoutTable::builtin();
    let keycode = x11_keycode(KEY_Y).expect("KEY_Y fits a core keycode");
    let expected = table.keysym_for("de", KEY_Y).expect("de maps KEY_Y");

    // Act: the server resolved the German layout's keysym
    let german = check_keysym(keycode, expected, XK_z);
    // ... and a server stuck on US would report y instead
    let stuck_on_us = check_keysym(keycode, expected, XK_y);

    // Assert
    assert_eq!(german, Ok(()));
    assert_eq!(
        stuck_on_us,
        Err(AssertionFailure::KeysymMismatch {
            keycode,
            expected: XK_z,
            actual: XK_y,
        })
    );
}

#[test]
fn test_layouts_disagree_only_on_expected_keys() {
    let table = LayoutTable::builtin();
    let us = table.pairs("us");
    let de = table.pairs("de");

    let differing: Vec<u16> = us
        .iter()
        .zip(de)
        .filter(|(a, b)| a.keysym != b.keysym)
        .map(|(a, _)| a.code)
        .collect();

    assert_eq!(differing, vec![KEY_Y]);
}
