//! Reactions - the fixed reaction set, per-message counters, counter deltas,
//! and the per-viewer reaction state machine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the six reaction symbols a viewer may apply to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReactionKind {
    MindBlown,
    Fire,
    Hundred,
    Flex,
    Dash,
    Heart,
}

impl ReactionKind {
    /// Number of reaction slots
    pub const COUNT: usize = 6;

    /// All reactions in display order
    pub const ALL: [Self; Self::COUNT] = [
        Self::MindBlown,
        Self::Fire,
        Self::Hundred,
        Self::Flex,
        Self::Dash,
        Self::Heart,
    ];

    /// Counter slot for this reaction
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire name (camelCase)
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MindBlown => "mindBlown",
            Self::Fire => "fire",
            Self::Hundred => "hundred",
            Self::Flex => "flex",
            Self::Dash => "dash",
            Self::Heart => "heart",
        }
    }

    /// Emoji rendered for this reaction
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::MindBlown => "🤯",
            Self::Fire => "🔥",
            Self::Hundred => "💯",
            Self::Flex => "💪",
            Self::Dash => "💨",
            Self::Heart => "❤️",
        }
    }

    /// Counter column in the messages table
    pub const fn column(self) -> &'static str {
        match self {
            Self::MindBlown => "react_mind_blown",
            Self::Fire => "react_fire",
            Self::Hundred => "react_hundred",
            Self::Flex => "react_flex",
            Self::Dash => "react_dash",
            Self::Heart => "react_heart",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReactionKind {
    type Err = String;

    /// Accepts the wire name, its snake_case form, or the emoji itself
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.as_str().eq_ignore_ascii_case(normalized)
                    || kind.column().trim_start_matches("react_") == normalized
                    || kind.emoji() == normalized
                    || kind.emoji().trim_end_matches('\u{FE0F}') == normalized
            })
            .ok_or_else(|| format!("Invalid reaction: {s}"))
    }
}

// ============================================================================
// Counters
// ============================================================================

/// Aggregate reaction counters of one message, one slot per [`ReactionKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "CountsRepr", into = "CountsRepr")]
pub struct ReactionCounts([u64; ReactionKind::COUNT]);

impl ReactionCounts {
    /// All counters at zero
    pub const fn new() -> Self {
        Self([0; ReactionKind::COUNT])
    }

    /// Build from raw slots in [`ReactionKind::ALL`] order
    pub const fn from_slots(slots: [u64; ReactionKind::COUNT]) -> Self {
        Self(slots)
    }

    /// Raw slots in [`ReactionKind::ALL`] order
    pub const fn slots(&self) -> [u64; ReactionKind::COUNT] {
        self.0
    }

    #[inline]
    pub fn get(&self, kind: ReactionKind) -> u64 {
        self.0[kind.index()]
    }

    #[inline]
    pub fn set(&mut self, kind: ReactionKind, value: u64) {
        self.0[kind.index()] = value;
    }

    /// Builder-style setter
    pub fn with(mut self, kind: ReactionKind, value: u64) -> Self {
        self.set(kind, value);
        self
    }

    /// Iterate `(kind, count)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (ReactionKind, u64)> + '_ {
        ReactionKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// Sum of all six counters
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Apply the reaction part of a delta, flooring every counter at zero
    pub fn apply(&mut self, delta: &CounterDelta) {
        for kind in ReactionKind::ALL {
            let change = delta.reaction_delta(kind);
            let slot = &mut self.0[kind.index()];
            *slot = if change >= 0 {
                slot.saturating_add(change.unsigned_abs())
            } else {
                slot.saturating_sub(change.unsigned_abs())
            };
        }
    }

    /// Return a copy with the delta applied
    #[must_use]
    pub fn applied(mut self, delta: &CounterDelta) -> Self {
        self.apply(delta);
        self
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountsRepr {
    #[serde(default)]
    mind_blown: u64,
    #[serde(default)]
    fire: u64,
    #[serde(default)]
    hundred: u64,
    #[serde(default)]
    flex: u64,
    #[serde(default)]
    dash: u64,
    #[serde(default)]
    heart: u64,
}

impl From<CountsRepr> for ReactionCounts {
    fn from(r: CountsRepr) -> Self {
        Self([r.mind_blown, r.fire, r.hundred, r.flex, r.dash, r.heart])
    }
}

impl From<ReactionCounts> for CountsRepr {
    fn from(c: ReactionCounts) -> Self {
        let [mind_blown, fire, hundred, flex, dash, heart] = c.0;
        Self {
            mind_blown,
            fire,
            hundred,
            flex,
            dash,
            heart,
        }
    }
}

// ============================================================================
// Deltas
// ============================================================================

/// Atomic change to a message's counters.
///
/// The store applies this as "add N" to each counter (reaction counters are
/// floored at zero), never as "set to V". Only touched slots are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "DeltaRepr", into = "DeltaRepr")]
pub struct CounterDelta {
    pub views: u64,
    reactions: [i64; ReactionKind::COUNT],
}

impl CounterDelta {
    /// Empty delta
    pub const fn new() -> Self {
        Self {
            views: 0,
            reactions: [0; ReactionKind::COUNT],
        }
    }

    /// A single view increment
    pub const fn view() -> Self {
        Self {
            views: 1,
            reactions: [0; ReactionKind::COUNT],
        }
    }

    /// A single reaction change
    pub fn reaction(kind: ReactionKind, amount: i64) -> Self {
        Self::new().with_reaction(kind, amount)
    }

    /// Builder-style: add `amount` to the given reaction slot
    pub fn with_reaction(mut self, kind: ReactionKind, amount: i64) -> Self {
        self.reactions[kind.index()] = self.reactions[kind.index()].saturating_add(amount);
        self
    }

    #[inline]
    pub fn reaction_delta(&self, kind: ReactionKind) -> i64 {
        self.reactions[kind.index()]
    }

    /// Check if applying this delta would change nothing
    pub fn is_empty(&self) -> bool {
        self.views == 0 && self.reactions.iter().all(|d| *d == 0)
    }

    /// Non-zero reaction slots
    pub fn touched(&self) -> impl Iterator<Item = (ReactionKind, i64)> + '_ {
        ReactionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.reaction_delta(kind)))
            .filter(|(_, d)| *d != 0)
    }

    /// Accumulate another delta into this one
    pub fn merge(&mut self, other: &CounterDelta) {
        self.views = self.views.saturating_add(other.views);
        for (slot, d) in self.reactions.iter_mut().zip(other.reactions) {
            *slot = slot.saturating_add(d);
        }
    }

    /// Remove a previously merged delta
    pub fn unmerge(&mut self, other: &CounterDelta) {
        self.views = self.views.saturating_sub(other.views);
        for (slot, d) in self.reactions.iter_mut().zip(other.reactions) {
            *slot = slot.saturating_sub(d);
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DeltaRepr {
    #[serde(default, skip_serializing_if = "is_zero")]
    views: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    reactions: BTreeMap<ReactionKind, i64>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &u64) -> bool {
    *v == 0
}

impl From<DeltaRepr> for CounterDelta {
    fn from(r: DeltaRepr) -> Self {
        r.reactions
            .into_iter()
            .fold(Self { views: r.views, ..Self::new() }, |acc, (kind, d)| {
                acc.with_reaction(kind, d)
            })
    }
}

impl From<CounterDelta> for DeltaRepr {
    fn from(d: CounterDelta) -> Self {
        Self {
            views: d.views,
            reactions: d.touched().collect(),
        }
    }
}

// ============================================================================
// Per-viewer state machine
// ============================================================================

/// A viewer's reaction on one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReactionState {
    #[default]
    Unreacted,
    ReactedWith(ReactionKind),
}

/// Result of a toggle: the next state and the counter change it implies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionTransition {
    pub next: ReactionState,
    pub delta: CounterDelta,
}

impl ReactionState {
    /// Recover state from a persisted marker
    pub fn from_stored(stored: Option<ReactionKind>) -> Self {
        stored.map_or(Self::Unreacted, Self::ReactedWith)
    }

    /// Active reaction, if any
    pub fn current(&self) -> Option<ReactionKind> {
        match self {
            Self::Unreacted => None,
            Self::ReactedWith(kind) => Some(*kind),
        }
    }

    /// Press `kind`: same symbol un-reacts, another symbol switches, none reacts
    pub fn toggle(self, kind: ReactionKind) -> ReactionTransition {
        match self {
            Self::ReactedWith(current) if current == kind => ReactionTransition {
                next: Self::Unreacted,
                delta: CounterDelta::reaction(kind, -1),
            },
            Self::ReactedWith(other) => ReactionTransition {
                next: Self::ReactedWith(kind),
                delta: CounterDelta::reaction(other, -1).with_reaction(kind, 1),
            },
            Self::Unreacted => ReactionTransition {
                next: Self::ReactedWith(kind),
                delta: CounterDelta::reaction(kind, 1),
            },
        }
    }
}
