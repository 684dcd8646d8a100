// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pie/donut geometry for a category distribution.
//!
//! Angles are degrees measured clockwise from 12 o'clock. Points use screen
//! coordinates (y grows downwards). Nothing here knows about colors or SVG: a
//! segment carries a palette index and [`ArcPath`] carries the points and flags
//! a renderer needs to draw it.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{ArcSegment, DistributionEntry};

const FULL_TURN: f64 = 360.0;

/// Slice up to `max_segments` entries (in distribution order) into contiguous
/// arcs proportional to their share of the positive spend.
///
/// Entries whose total is zero or negative get no arc and do not count towards
/// the cap. Entries past the cap are left out and leave a gap at the end of the
/// circle; they are not merged into an "other" slice. No positive spend yields
/// no arcs.
pub fn build_arcs(
    entries: &[DistributionEntry],
    max_segments: usize,
    palette_size: usize,
) -> Vec<ArcSegment> {
    let drawable: Vec<&DistributionEntry> =
        entries.iter().filter(|e| e.total > Decimal::ZERO).collect();
    let positive_sum: Decimal = drawable.iter().map(|e| e.total).sum();
    if positive_sum <= Decimal::ZERO {
        return Vec::new();
    }
    let full = Decimal::from(360);
    let shown = drawable.len().min(max_segments);

    let mut cursor = Decimal::ZERO;
    let mut arcs: Vec<ArcSegment> = drawable[..shown]
        .iter()
        .enumerate()
        .map(|(rank, e)| {
            let start = cursor;
            let sweep = e
                .total
                .checked_mul(full)
                .and_then(|v| v.checked_div(positive_sum))
                .unwrap_or(Decimal::ZERO);
            cursor += sweep;
            ArcSegment {
                category_id: e.category_id,
                start_angle_deg: start.to_f64().unwrap_or(0.0),
                end_angle_deg: cursor.to_f64().unwrap_or(0.0).min(FULL_TURN),
                color_index: rank.checked_rem(palette_size).unwrap_or(0),
            }
        })
        .collect();

    // Closes the circle exactly when no drawable entry was cut off.
    if shown == drawable.len() {
        if let Some(last) = arcs.last_mut() {
            last.end_angle_deg = FULL_TURN;
        }
    }
    arcs
}

/// Category whose arc covers `angle_deg`, after normalizing it into `[0, 360)`.
pub fn hit_test(arcs: &[ArcSegment], angle_deg: f64) -> Option<i64> {
    if !angle_deg.is_finite() {
        return None;
    }
    let mut a = angle_deg.rem_euclid(FULL_TURN);
    if a >= FULL_TURN {
        a = 0.0;
    }
    arcs.iter().find(|s| s.contains(a)).map(|s| s.category_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Start/end points of one slice on the outer ring, and on the inner ring for a
/// donut.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcPath {
    pub category_id: i64,
    pub outer_start: Point,
    pub outer_end: Point,
    pub inner_start: Option<Point>,
    pub inner_end: Option<Point>,
    /// Sweep greater than 180 degrees.
    pub large_arc: bool,
    /// The slice covers the whole circle; start and end points coincide.
    pub full_circle: bool,
}

/// Where the chart sits on screen. `inner_radius` of zero draws a pie.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartFrame {
    pub cx: f64,
    pub cy: f64,
    pub outer_radius: f64,
    pub inner_radius: f64,
}

impl ChartFrame {
    pub fn pie(cx: f64, cy: f64, radius: f64) -> Self {
        Self {
            cx,
            cy,
            outer_radius: radius,
            inner_radius: 0.0,
        }
    }

    pub fn donut(cx: f64, cy: f64, outer_radius: f64, inner_radius: f64) -> Self {
        Self {
            cx,
            cy,
            outer_radius,
            inner_radius,
        }
    }

    pub fn point_at(&self, angle_deg: f64, radius: f64) -> Point {
        let rad = angle_deg.to_radians();
        Point {
            x: self.cx + radius * rad.sin(),
            y: self.cy - radius * rad.cos(),
        }
    }

    pub fn arc_path(&self, segment: &ArcSegment) -> ArcPath {
        let sweep = segment.sweep();
        let donut = self.inner_radius > 0.0;
        ArcPath {
            category_id: segment.category_id,
            outer_start: self.point_at(segment.start_angle_deg, self.outer_radius),
            outer_end: self.point_at(segment.end_angle_deg, self.outer_radius),
            inner_start: donut.then(|| self.point_at(segment.start_angle_deg, self.inner_radius)),
            inner_end: donut.then(|| self.point_at(segment.end_angle_deg, self.inner_radius)),
            large_arc: sweep > 180.0,
            full_circle: sweep >= FULL_TURN - 1e-9,
        }
    }

    /// Polar angle of a pointer position, or `None` when it falls outside the
    /// ring (beyond the outer radius or inside the donut hole).
    pub fn angle_at(&self, x: f64, y: f64) -> Option<f64> {
        let dx = x - self.cx;
        let dy = y - self.cy;
        let dist = dx.hypot(dy);
        if dist > self.outer_radius || dist < self.inner_radius {
            return None;
        }
        Some(dx.atan2(-dy).to_degrees().rem_euclid(FULL_TURN))
    }

    /// Category under a pointer position.
    pub fn hit_test_point(&self, arcs: &[ArcSegment], x: f64, y: f64) -> Option<i64> {
        self.angle_at(x, y).and_then(|a| hit_test(arcs, a))
    }
}
