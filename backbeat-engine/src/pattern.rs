//! Genre-conditioned drum and bass patterns.
//!
//! A bar is 16 slots (sixteenth notes). For a given [`Classification`] and [`Slot`]
//! the generator returns a [`TriggerSet`]: which voices fire, how hard, and at what
//! pitch for the bass. Pure and allocation-free; the only state is the slot the
//! caller passes in.

use core::fmt;

/// Slots in one bar.
pub const SLOTS_PER_BAR: u8 = 16;

/// Snare velocity outside rock.
pub const SNARE_VELOCITY: f32 = 0.5;
/// Fixed bass gain; the bass envelope starts here and falls linearly to zero.
pub const BASS_GAIN: f32 = 0.15;
/// The slot-8 bass note relative to the root.
pub const BASS_SHIFT_RATIO: f32 = 0.75;

const ELECTRONIC_KEYWORDS: [&str; 4] = ["Techno", "Electronic", "Dance", "House"];
const ROCK_KEYWORDS: [&str; 2] = ["Rock", "Metal"];
const LOFI_KEYWORDS: [&str; 1] = ["Lo-fi"];

// --------------------------------- Classification --------------------------------

/// Bass root note. Chosen from the keywords alone, independent of the kick pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum BassRoot {
    /// E1, for labels with a rock keyword.
    E1,
    /// D2, for labels with a lofi keyword and no rock keyword.
    D2,
    /// A1 otherwise.
    #[default]
    A1,
}

impl BassRoot {
    /// Rock keyword first, then lofi, then A1.
    pub fn of(label: &str) -> Self {
        if has_any(label, &ROCK_KEYWORDS) {
            Self::E1
        } else if has_any(label, &LOFI_KEYWORDS) {
            Self::D2
        } else {
            Self::A1
        }
    }

    #[inline]
    pub fn hz(self) -> f32 {
        match self {
            Self::E1 => 41.20,
            Self::D2 => 73.42,
            Self::A1 => 55.0,
        }
    }
}

#[inline]
fn has_any(label: &str, keys: &[&str]) -> bool {
    keys.iter().any(|k| label.contains(k))
}

/// Genre bucket derived from a free-text label.
///
/// Electronic labels may also name a rock or lofi keyword ("Techno Rock"); those
/// keywords still pick the bass root, so the electronic bucket carries it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    Electronic(BassRoot),
    Rock,
    Lofi,
    #[default]
    Default,
}

impl Classification {
    /// Classify a genre label by keyword membership.
    ///
    /// Keyword sets overlap ("Electronic Rock"), so they are checked in a fixed order:
    /// electronic, rock, lofi. Anything else, including the empty label, is `Default`.
    pub fn of(label: &str) -> Self {
        if has_any(label, &ELECTRONIC_KEYWORDS) {
            Self::Electronic(BassRoot::of(label))
        } else if has_any(label, &ROCK_KEYWORDS) {
            Self::Rock
        } else if has_any(label, &LOFI_KEYWORDS) {
            Self::Lofi
        } else {
            Self::Default
        }
    }

    #[inline]
    pub fn is_electronic(self) -> bool {
        matches!(self, Self::Electronic(_))
    }

    /// Bass root: E1 for rock, D2 for lofi, keyword-chosen for electronic, A1 otherwise.
    #[inline]
    pub fn bass_root(self) -> BassRoot {
        match self {
            Self::Electronic(root) => root,
            Self::Rock => BassRoot::E1,
            Self::Lofi => BassRoot::D2,
            Self::Default => BassRoot::A1,
        }
    }

    #[inline]
    pub fn bass_root_hz(self) -> f32 {
        self.bass_root().hz()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Electronic(_) => "electronic",
            Self::Rock => "rock",
            Self::Lofi => "lofi",
            Self::Default => "default",
        })
    }
}

// ------------------------------------- Slot --------------------------------------

/// Position within a bar, always in `0..16`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    pub const FIRST: Slot = Slot(0);

    /// `None` if `index` is outside the bar.
    #[inline]
    pub fn new(index: u8) -> Option<Self> {
        (index < SLOTS_PER_BAR).then_some(Self(index))
    }

    #[inline] pub fn index(self) -> u8 { self.0 }

    /// The following slot, wrapping 15 -> 0.
    #[inline]
    pub fn next(self) -> Self {
        Self((self.0 + 1) % SLOTS_PER_BAR)
    }

    /// Every slot of one bar in order.
    pub fn bar() -> impl Iterator<Item = Slot> {
        (0..SLOTS_PER_BAR).map(Slot)
    }
}

// ------------------------------------ Voices -------------------------------------

/// One independently triggered sound source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Voice {
    Kick,
    Snare,
    ClosedHat,
    OpenHat,
    Bass,
}

impl Voice {
    pub const COUNT: usize = 5;
    pub const ALL: [Voice; Voice::COUNT] =
        [Voice::Kick, Voice::Snare, Voice::ClosedHat, Voice::OpenHat, Voice::Bass];

    #[inline]
    fn index(self) -> usize {
        match self {
            Voice::Kick => 0,
            Voice::Snare => 1,
            Voice::ClosedHat => 2,
            Voice::OpenHat => 3,
            Voice::Bass => 4,
        }
    }
}

/// A single voice firing on a slot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Trigger {
    pub voice: Voice,
    /// Envelope start level in `0..=1`.
    pub velocity: f32,
    /// Oscillator pitch; only the bass carries one.
    pub pitch_hz: Option<f32>,
}

impl Trigger {
    #[inline]
    fn hit(voice: Voice, velocity: f32) -> Self {
        Self { voice, velocity, pitch_hz: None }
    }

    #[inline]
    fn bass(freq_hz: f32) -> Self {
        Self { voice: Voice::Bass, velocity: BASS_GAIN, pitch_hz: Some(freq_hz) }
    }
}

/// The voices firing on one slot, at most one trigger per voice.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TriggerSet {
    slots: [Option<Trigger>; Voice::COUNT],
}

impl TriggerSet {
    #[inline]
    fn insert(&mut self, t: Trigger) {
        self.slots[t.voice.index()] = Some(t);
    }

    #[inline]
    pub fn get(&self, voice: Voice) -> Option<&Trigger> {
        self.slots[voice.index()].as_ref()
    }

    #[inline]
    pub fn contains(&self, voice: Voice) -> bool {
        self.get(voice).is_some()
    }

    /// Triggers in voice order (kick, snare, closed hat, open hat, bass).
    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

// ----------------------------------- Generator -----------------------------------

/// Trigger set for `slot` under `class`.
pub fn triggers(class: Classification, slot: Slot) -> TriggerSet {
    use Classification as C;

    let s = slot.index();
    let mut set = TriggerSet::default();

    let kick = match class {
        C::Electronic(_) => (s % 4 == 0).then_some(0.8),
        C::Rock => matches!(s, 0 | 6 | 8 | 14).then_some(0.9),
        C::Lofi => matches!(s, 0 | 9).then_some(0.6),
        C::Default => matches!(s, 0 | 8).then_some(0.7),
    };
    if let Some(v) = kick {
        set.insert(Trigger::hit(Voice::Kick, v));
    }

    if matches!(s, 4 | 12) {
        let v = if class == C::Rock { 0.9 } else { SNARE_VELOCITY };
        set.insert(Trigger::hit(Voice::Snare, v));
    }

    if s % 2 == 0 {
        let v = if class.is_electronic() { 0.15 } else { 0.2 };
        set.insert(Trigger::hit(Voice::ClosedHat, v));
    }
    if class.is_electronic() && s % 4 == 2 {
        set.insert(Trigger::hit(Voice::OpenHat, 0.3));
    }

    let root = class.bass_root_hz();
    match s {
        0 => set.insert(Trigger::bass(root)),
        8 => set.insert(Trigger::bass(root * BASS_SHIFT_RATIO)),
        _ => {}
    }

    set
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ELECTRONIC: Classification = Classification::Electronic(BassRoot::A1);

    fn slots_with(class: Classification, voice: Voice) -> Vec<u8> {
        Slot::bar()
            .filter(|s| triggers(class, *s).contains(voice))
            .map(Slot::index)
            .collect()
    }

    #[test]
    fn classification_follows_keyword_priority() {
        assert_eq!(Classification::of("Drum and Bass Techno"), ELECTRONIC);
        assert_eq!(Classification::of("Acoustic Rock"), Classification::Rock);
        assert_eq!(Classification::of("Chill Lo-fi Beats"), Classification::Lofi);
        assert_eq!(Classification::of("Bollywood Pop"), Classification::Default);
        assert_eq!(Classification::of("Electronic Rock"), Classification::Electronic(BassRoot::E1));
        assert_eq!(Classification::of("Lo-fi Metal"), Classification::Rock);
        assert_eq!(Classification::of(""), Classification::Default);
    }

    #[test]
    fn slot_wraps_after_fifteen() {
        let mut s = Slot::FIRST;
        let mut seen = Vec::new();
        for _ in 0..34 {
            seen.push(s.index());
            s = s.next();
        }
        let expected: Vec<u8> = (0..34).map(|i| (i % 16) as u8).collect();
        assert_eq!(seen, expected);
        assert!(Slot::new(16).is_none());
        assert_eq!(Slot::new(15).map(Slot::index), Some(15));
    }

    #[test]
    fn electronic_is_four_on_the_floor() {
        assert_eq!(slots_with(ELECTRONIC, Voice::Kick), vec![0, 4, 8, 12]);
        assert_eq!(slots_with(ELECTRONIC, Voice::OpenHat), vec![2, 6, 10, 14]);
        let hat = triggers(ELECTRONIC, Slot::FIRST);
        assert_eq!(hat.get(Voice::ClosedHat).map(|t| t.velocity), Some(0.15));
    }

    #[test]
    fn rock_kick_and_backbeat() {
        assert_eq!(slots_with(Classification::Rock, Voice::Kick), vec![0, 6, 8, 14]);
        assert_eq!(slots_with(Classification::Rock, Voice::Snare), vec![4, 12]);
        for s in [4, 12] {
            let set = triggers(Classification::Rock, Slot::new(s).unwrap());
            assert_eq!(set.get(Voice::Snare).unwrap().velocity, 0.9);
        }
        assert!(slots_with(Classification::Rock, Voice::OpenHat).is_empty());
    }

    #[test]
    fn lofi_and_default_kicks() {
        assert_eq!(slots_with(Classification::Lofi, Voice::Kick), vec![0, 9]);
        assert_eq!(slots_with(Classification::Default, Voice::Kick), vec![0, 8]);
        let set = triggers(Classification::Lofi, Slot::new(9).unwrap());
        assert_eq!(set.get(Voice::Kick).unwrap().velocity, 0.6);
        let set = triggers(Classification::Default, Slot::new(4).unwrap());
        assert_eq!(set.get(Voice::Snare).unwrap().velocity, SNARE_VELOCITY);
    }

    #[test]
    fn closed_hats_on_every_even_slot() {
        for class in [ELECTRONIC, Classification::Rock, Classification::Lofi, Classification::Default] {
            assert_eq!(slots_with(class, Voice::ClosedHat), vec![0, 2, 4, 6, 8, 10, 12, 14]);
        }
    }

    #[test]
    fn bass_shift_is_three_quarters_of_root() {
        for class in [ELECTRONIC, Classification::Rock, Classification::Lofi, Classification::Default] {
            let root = triggers(class, Slot::FIRST).get(Voice::Bass).and_then(|t| t.pitch_hz).unwrap();
            let shifted = triggers(class, Slot::new(8).unwrap()).get(Voice::Bass).and_then(|t| t.pitch_hz).unwrap();
            assert_eq!(root, class.bass_root_hz());
            assert_eq!(shifted, root * 0.75);
            assert_eq!(slots_with(class, Voice::Bass), vec![0, 8]);
        }
    }

    #[test]
    fn mixed_labels_keep_the_keyword_bass_root() {
        let root_of = |label: &str| {
            triggers(Classification::of(label), Slot::FIRST).get(Voice::Bass).and_then(|t| t.pitch_hz)
        };
        assert_eq!(root_of("Techno Rock"), Some(41.20));
        assert_eq!(root_of("Lo-fi House"), Some(73.42));
        assert_eq!(root_of("Heavy Metal Dance"), Some(41.20));
        assert_eq!(root_of("Rock Lo-fi Techno"), Some(41.20));
        assert_eq!(root_of("Deep House"), Some(55.0));

        // The kick still follows the electronic pattern.
        let class = Classification::of("Lo-fi House");
        assert_eq!(class, Classification::Electronic(BassRoot::D2));
        assert_eq!(slots_with(class, Voice::Kick), vec![0, 4, 8, 12]);
        let shifted = triggers(class, Slot::new(8).unwrap()).get(Voice::Bass).and_then(|t| t.pitch_hz);
        assert_eq!(shifted, Some(73.42 * 0.75));
    }

    #[test]
    fn coincident_voices_fire_together() {
        let set = triggers(Classification::Rock, Slot::FIRST);
        assert_eq!(set.len(), 3);
        let voices: Vec<Voice> = set.iter().map(|t| t.voice).collect();
        assert_eq!(voices, vec![Voice::Kick, Voice::ClosedHat, Voice::Bass]);
        assert!(triggers(Classification::Default, Slot::new(1).unwrap()).is_empty());
    }
}
