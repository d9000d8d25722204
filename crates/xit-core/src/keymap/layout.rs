//! Per-layout key tables: which keysym a physical key must produce.
//!
//! A [`LayoutTable`] maps an XKB layout name (`"us"`, `"de"`, `"fr"`) to an
//! ordered list of [`KeyPair`]s.  The keyboard test replays every pair for the
//! active layout in registration order, then the layout-independent
//! [`multimedia_keys`] sequence.
//!
//! The interesting rows are the ones where layouts disagree about the same
//! physical key: `KEY_Y` is `y` on a US QWERTY layout but `z` on German
//! QWERTZ, and `KEY_Q`/`KEY_W` become `a`/`z` on French AZERTY.

use super::keysym::{
    Keysym, XF86XK_AudioLowerVolume, XF86XK_AudioMute, XF86XK_AudioNext, XF86XK_AudioPlay,
    XF86XK_AudioPrev, XF86XK_AudioRaiseVolume, XK_a, XK_e, XK_q, XK_r, XK_t, XK_w, XK_y, XK_z,
};
use super::linux_input::{
    KEY_E, KEY_MUTE, KEY_NEXTSONG, KEY_PLAYPAUSE, KEY_PREVIOUSSONG, KEY_Q, KEY_R, KEY_T,
    KEY_VOLUMEDOWN, KEY_VOLUMEUP, KEY_W, KEY_Y,
};

/// A physical key code and the keysym it must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPair {
    /// Linux input-event key code (`KEY_*`).
    pub code: u16,
    /// Expected keysym at index 0 of the resulting X keycode.
    pub keysym: Keysym,
}

impl KeyPair {
    pub const fn new(code: u16, keysym: Keysym) -> Self {
        Self { code, keysym }
    }
}

/// Ordered mapping from layout name to its key pairs.
///
/// Layouts keep the order in which they were first inserted; pairs within a
/// layout keep their insertion order, duplicates included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutTable {
    entries: Vec<(String, Vec<KeyPair>)>,
}

impl LayoutTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table exercised by the keyboard layout tests.
    pub fn builtin() -> Self {
        let mut table = Self::new();

        // US, QWERTY => qwerty
        table.extend(
            "us",
            [
                KeyPair::new(KEY_Q, XK_q),
                KeyPair::new(KEY_W, XK_w),
                KeyPair::new(KEY_E, XK_e),
                KeyPair::new(KEY_R, XK_r),
                KeyPair::new(KEY_T, XK_t),
                KeyPair::new(KEY_Y, XK_y),
            ],
        );
        // German, QWERTY => qwertz
        table.extend(
            "de",
            [
                KeyPair::new(KEY_Q, XK_q),
                KeyPair::new(KEY_W, XK_w),
                KeyPair::new(KEY_E, XK_e),
                KeyPair::new(KEY_R, XK_r),
                KeyPair::new(KEY_T, XK_t),
                KeyPair::new(KEY_Y, XK_z),
            ],
        );
        // French, QWERTY => azerty
        table.extend(
            "fr",
            [
                KeyPair::new(KEY_Q, XK_a),
                KeyPair::new(KEY_W, XK_z),
                KeyPair::new(KEY_E, XK_e),
                KeyPair::new(KEY_R, XK_r),
                KeyPair::new(KEY_T, XK_t),
                KeyPair::new(KEY_Y, XK_y),
            ],
        );

        table
    }

    /// Appends `pair` to the end of `layout`'s list, creating the layout if needed.
    pub fn insert(&mut self, layout: &str, pair: KeyPair) {
        match self.entries.iter_mut().find(|(name, _)| name == layout) {
            Some((_, pairs)) => pairs.push(pair),
            None => self.entries.push((layout.to_string(), vec![pair])),
        }
    }

    /// Appends every pair in `pairs` to `layout`, in order.
    pub fn extend(&mut self, layout: &str, pairs: impl IntoIterator<Item = KeyPair>) {
        for pair in pairs {
            self.insert(layout, pair);
        }
    }

    /// Returns the pairs registered for `layout`; empty if the layout is unknown.
    pub fn pairs(&self, layout: &str) -> &[KeyPair] {
        self.entries
            .iter()
            .find(|(name, _)| name == layout)
            .map(|(_, pairs)| pairs.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates over the layout names in insertion order.
    pub fn layouts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Looks up the expected keysym for `code` under `layout`.
    ///
    /// When a code is registered more than once the first entry wins.
    pub fn keysym_for(&self, layout: &str, code: u16) -> Option<Keysym> {
        self.pairs(layout)
            .iter()
            .find(|pair| pair.code == code)
            .map(|pair| pair.keysym)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Multimedia keys, checked after the layout keys for every layout.
pub fn multimedia_keys() -> [KeyPair; 6] {
    [
        KeyPair::new(KEY_MUTE, XF86XK_AudioMute),
        KeyPair::new(KEY_VOLUMEUP, XF86XK_AudioRaiseVolume),
        KeyPair::new(KEY_VOLUMEDOWN, XF86XK_AudioLowerVolume),
        KeyPair::new(KEY_PLAYPAUSE, XF86XK_AudioPlay),
        KeyPair::new(KEY_NEXTSONG, XF86XK_AudioNext),
        KeyPair::new(KEY_PREVIOUSSONG, XF86XK_AudioPrev),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registers_us_de_fr_in_order() {
        let table = LayoutTable::builtin();
        let layouts: Vec<&str> = table.layouts().collect();
        assert_eq!(layouts, vec!["us", "de", "fr"]);
    }

    #[test]
    fn test_builtin_layouts_have_six_pairs_each() {
        let table = LayoutTable::builtin();
        for layout in ["us", "de", "fr"] {
            assert_eq!(table.pairs(layout).len(), 6, "layout {layout}");
        }
    }

    #[test]
    fn test_key_y_differs_between_us_and_de() {
        let table = LayoutTable::builtin();
        assert_eq!(table.keysym_for("us", KEY_Y), Some(XK_y));
        assert_eq!(table.keysym_for("de", KEY_Y), Some(XK_z));
    }

    #[test]
    fn test_french_layout_is_azerty() {
        let table = LayoutTable::builtin();
        assert_eq!(table.keysym_for("fr", KEY_Q), Some(XK_a));
        assert_eq!(table.keysym_for("fr", KEY_W), Some(XK_z));
    }

    #[test]
    fn test_unknown_layout_has_no_pairs() {
        let table = LayoutTable::builtin();
        assert!(table.pairs("dvorak").is_empty());
        assert_eq!(table.keysym_for("dvorak", KEY_Q), None);
    }

    #[test]
    fn test_duplicate_codes_keep_insertion_order() {
        // Arrange
        let mut table = LayoutTable::new();
        table.insert("xx", KeyPair::new(KEY_Q, XK_q));
        table.insert("yy", KeyPair::new(KEY_W, XK_w));
        table.insert("xx", KeyPair::new(KEY_Q, XK_a));

        // Act
        let pairs = table.pairs("xx");

        // Assert
        assert_eq!(pairs, &[KeyPair::new(KEY_Q, XK_q), KeyPair::new(KEY_Q, XK_a)]);
        assert_eq!(table.keysym_for("xx", KEY_Q), Some(XK_q));
        assert_eq!(table.layouts().collect::<Vec<_>>(), vec!["xx", "yy"]);
    }

    #[test]
    fn test_multimedia_keys_order_is_fixed() {
        let codes: Vec<u16> = multimedia_keys().iter().map(|p| p.code).collect();
        assert_eq!(
            codes,
            vec![
                KEY_MUTE,
                KEY_VOLUMEUP,
                KEY_VOLUMEDOWN,
                KEY_PLAYPAUSE,
                KEY_NEXTSONG,
                KEY_PREVIOUSSONG
            ]
        );
    }
}
