//! Floor-plan geometry: the pure rules behind the office layout editor.
//!
//! Everything here is a plain function over in-memory values so the
//! snapping, containment, and naming rules can be tested without a
//! database. The ORM layer calls into this module when creating or moving
//! zones and assets.

use crate::models::Zone;

/// Logical canvas size, in layout units.
pub const CANVAS_W: i32 = 600;
pub const CANVAS_H: i32 = 480;

/// Grid cell size; every placement snaps to multiples of this.
pub const SNAP: i32 = 20;

/// A drag smaller than this (after snapping) is discarded rather than
/// becoming a zone.
pub const MIN_ZONE_SIZE: i32 = 40;

/// Mouse displacement below this threshold counts as a click, not a move.
pub const DRAG_THRESHOLD: i32 = 5;

/// Sentinel label when all 26 letters are taken.
const LABEL_EXHAUSTED: &str = "X";

/// Snaps a coordinate to the nearest grid line.
pub fn snap(v: i32) -> i32 {
    // Round-half-up in both directions, matching f64::round semantics.
    let q = (f64::from(v) / f64::from(SNAP)).round() as i32;
    q * SNAP
}

/// An axis-aligned rectangle in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Normalizes a zone-draw drag into a rectangle, whichever corner the drag
/// started from. Returns `None` when the result is under the minimum zone
/// size (the drag is discarded).
pub fn normalized_rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Rect> {
    let rect = Rect {
        x: x0.min(x1),
        y: y0.min(y1),
        w: (x1 - x0).abs(),
        h: (y1 - y0).abs(),
    };
    if rect.w >= MIN_ZONE_SIZE && rect.h >= MIN_ZONE_SIZE {
        Some(rect)
    } else {
        None
    }
}

/// Inclusive point-in-rectangle test against a zone's stored coordinates.
pub fn point_in_zone(x: i32, y: i32, zone: &Zone) -> bool {
    x >= zone.coord_x
        && x <= zone.coord_x + zone.coord_w
        && y >= zone.coord_y
        && y <= zone.coord_y + zone.coord_h
}

/// Finds the zone containing a point. Zones may overlap; the first match
/// wins, so the caller's ordering decides ties.
pub fn zone_at_point(x: i32, y: i32, zones: &[Zone]) -> Option<i32> {
    zones.iter().find(|z| point_in_zone(x, y, z)).map(|z| z.id)
}

/// Whether a mouse displacement counts as a drag rather than a click.
pub fn is_drag(dx: i32, dy: i32) -> bool {
    dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD
}

/// Next auto-generated desk name: scan existing `D-NN` names, take the
/// highest numeric suffix, add one, zero-pad to two digits. Max-plus-one,
/// not gap-fill: a deleted desk's number is never reused.
pub fn next_desk_name<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(parse_desk_number)
        .max()
        .unwrap_or(0);
    format!("D-{:02}", max + 1)
}

fn parse_desk_number(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("D-")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Next zone label: the first unused letter A..Z. Gap-fill, in contrast
/// with desk names (deleting zone B frees the label B for the next zone).
pub fn next_zone_label<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = existing.into_iter().collect();
    for letter in b'A'..=b'Z' {
        let candidate = (letter as char).to_string();
        if !taken.iter().any(|l| *l == candidate) {
            return candidate;
        }
    }
    LABEL_EXHAUSTED.to_string()
}
