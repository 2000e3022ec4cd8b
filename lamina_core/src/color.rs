// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed tint colors.
//!
//! Tints are accepted as `0xRRGGBB` and stored as `0xBBGGRR`, the channel
//! order GPU vertex attributes read them in. Combined color-alpha values
//! append an 8-bit alpha in the top byte (`0xAABBGGRR`).

/// Opaque white in BGR order (identical in RGB order).
pub const WHITE_BGR: u32 = 0x00FF_FFFF;

/// Converts `0xRRGGBB` to `0xBBGGRR`.
#[inline]
#[must_use]
pub const fn rgb_to_bgr(rgb: u32) -> u32 {
    ((rgb & 0xFF) << 16) | (rgb & 0xFF00) | ((rgb >> 16) & 0xFF)
}

/// Converts `0xBBGGRR` back to `0xRRGGBB`.
#[inline]
#[must_use]
pub const fn bgr_to_rgb(bgr: u32) -> u32 {
    rgb_to_bgr(bgr)
}

/// Multiplies two packed colors channel by channel.
///
/// White on either side is the identity and takes a fast path.
#[must_use]
pub const fn multiply_colors(local: u32, parent: u32) -> u32 {
    if local == WHITE_BGR {
        return parent;
    }
    if parent == WHITE_BGR {
        return local;
    }
    let c0 = ((local >> 16) & 0xFF) * ((parent >> 16) & 0xFF) / 255;
    let c1 = ((local >> 8) & 0xFF) * ((parent >> 8) & 0xFF) / 255;
    let c2 = (local & 0xFF) * (parent & 0xFF) / 255;
    (c0 << 16) | (c1 << 8) | c2
}

/// Packs a BGR color with an alpha in `0.0..=1.0` into `0xAABBGGRR`.
#[must_use]
pub fn pack_color_alpha(bgr: u32, alpha: f32) -> u32 {
    let alpha = clamp_alpha(alpha);
    #[expect(
        clippy::cast_possible_truncation,
        reason = "alpha is clamped to 0.0..=1.0 so the product fits in a byte"
    )]
    let a = (alpha * 255.0) as u32;
    (bgr & 0x00FF_FFFF) | (a << 24)
}

/// Clamps an alpha value to `0.0..=1.0`.
#[inline]
#[must_use]
pub fn clamp_alpha(alpha: f32) -> f32 {
    alpha.clamp(0.0, 1.0)
}
