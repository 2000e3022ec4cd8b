// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene construction options.

/// Options fixed when a [`Scene`](crate::Scene) is created.
///
/// Use one of the presets, optionally adjusting individual fields:
///
/// ```
/// use lamina_core::SceneConfig;
///
/// let config = SceneConfig {
///     initial_capacity: 1024,
///     ..SceneConfig::new()
/// };
/// assert!(config.sort_on_collect);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneConfig {
    /// Number of node slots reserved up front.
    pub initial_capacity: usize,
    /// Sort dirty, sortable child lists during instruction collection.
    ///
    /// When off, callers sort explicitly with
    /// [`Scene::sort_children`](crate::Scene::sort_children).
    pub sort_on_collect: bool,
    /// Log a warning when a render layer holds a node that has no parent.
    pub warn_on_detached_layer_children: bool,
}

impl SceneConfig {
    /// Default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_capacity: 64,
            sort_on_collect: true,
            warn_on_detached_layer_children: true,
        }
    }

    /// Like [`new`](Self::new) but without warnings for detached layer
    /// members, for scenes that attach nodes before parenting them.
    #[must_use]
    pub const fn quiet() -> Self {
        Self {
            warn_on_detached_layer_children: false,
            ..Self::new()
        }
    }

    /// A configuration for large scenes.
    #[must_use]
    pub const fn large() -> Self {
        Self {
            initial_capacity: 4096,
            ..Self::new()
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}
