// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis constraints, start thresholds, and scroll disambiguation.

use kurbo::{Point, Vec2};

/// Axis constraint of a draggable.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AxisConstraint {
    /// Only horizontal movement is reported; `y` stays at the start position.
    pub horizontal_only: bool,
    /// Only vertical movement is reported; `x` stays at the start position.
    pub vertical_only: bool,
}

impl AxisConstraint {
    /// Project `raw` onto the allowed axis through `start`.
    ///
    /// ```
    /// use kurbo::Point;
    /// use understory_dnd::geometry::AxisConstraint;
    ///
    /// let h = AxisConstraint { horizontal_only: true, vertical_only: false };
    /// let start = Point::new(10.0, 10.0);
    /// assert_eq!(h.constrain(start, Point::new(30.0, 99.0)), Point::new(30.0, 10.0));
    /// ```
    pub fn constrain(self, start: Point, raw: Point) -> Point {
        let mut p = raw;
        if self.horizontal_only {
            p.y = start.y;
        }
        if self.vertical_only {
            p.x = start.x;
        }
        p
    }

    /// Returns true if a touch movement by `delta` reads as a scroll along the
    /// blocked axis rather than a drag.
    ///
    /// Without a constraint nothing is ever a scroll.
    pub fn is_scroll(self, delta: Vec2) -> bool {
        if self.horizontal_only {
            delta.y.abs() > delta.x.abs()
        } else if self.vertical_only {
            delta.x.abs() > delta.y.abs()
        } else {
            false
        }
    }
}

/// Returns true once `current` is at least `min_distance` away from `start`.
pub fn reached_start_distance(start: Point, current: Point, min_distance: f64) -> bool {
    start.distance(current) >= min_distance
}
