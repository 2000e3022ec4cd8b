// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display status bits, blend modes, and pending-update flags.

use core::ops::{BitAnd, BitOr, BitOrAssign};

/// Three independently togglable display bits.
///
/// A node is drawn only when all three bits are set on the node and every
/// ancestor (see [`Scene::global_display_status`]).
///
/// [`Scene::global_display_status`]: super::Scene::global_display_status
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayStatus(u8);

impl DisplayStatus {
    /// The node contributes draw instructions.
    pub const RENDERABLE: Self = Self(0b001);
    /// The node and its subtree are visible.
    pub const VISIBLE: Self = Self(0b010);
    /// The node has not been culled.
    pub const NOT_CULLED: Self = Self(0b100);
    /// All bits set.
    pub const ALL: Self = Self(0b111);
    /// No bits set.
    pub const NONE: Self = Self(0);

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns whether every bit in `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns a copy with the bits in `other` set or cleared.
    #[inline]
    #[must_use]
    pub const fn with(self, other: Self, on: bool) -> Self {
        if on {
            Self(self.0 | other.0)
        } else {
            Self(self.0 & !other.0)
        }
    }
}

impl Default for DisplayStatus {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitAnd for DisplayStatus {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl core::fmt::Debug for DisplayStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "DisplayStatus(renderable={}, visible={}, culled={})",
            self.contains(Self::RENDERABLE),
            self.contains(Self::VISIBLE),
            !self.contains(Self::NOT_CULLED),
        )
    }
}

/// Blend mode used when compositing a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Use the nearest ancestor's explicit blend mode.
    #[default]
    Inherit,
    /// Standard source-over alpha compositing.
    Normal,
    /// Additive blend.
    Add,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
    /// Erase the destination where the source is opaque.
    Erase,
}

impl BlendMode {
    /// Resolves `Inherit` against the parent's resolved mode.
    #[inline]
    #[must_use]
    pub const fn resolve(self, parent: Self) -> Self {
        match self {
            Self::Inherit => parent,
            other => other,
        }
    }
}

/// Which inherited visual properties need recomputation on the next update
/// pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct UpdateFlags(u8);

impl UpdateFlags {
    pub(crate) const NONE: Self = Self(0);
    pub(crate) const COLOR: Self = Self(0b0001);
    pub(crate) const BLEND: Self = Self(0b0010);
    pub(crate) const VISIBLE: Self = Self(0b0100);
    pub(crate) const ALL: Self = Self(0b1111);

    #[inline]
    pub(crate) const fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub(crate) const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for UpdateFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for UpdateFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
