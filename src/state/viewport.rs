//! Viewport tracking for the rendered preview
//!
//! Watches the heading anchors of the preview and reports which one entered
//! the observation band, a horizontal strip placed a fraction of the viewport
//! below the top edge. The host delivers visibility changes in batches
//! (intersection callbacks) or raw geometry; either way the tracker decides
//! which heading becomes active.
//!
//! When several headings enter the band in the same batch, the topmost one
//! wins; equal tops fall back to batch order.

use crate::config::OutlineConfig;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Observation band as fractions of the viewport height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBand {
    /// Cut from the top edge
    pub top_margin: f32,
    /// Cut from the bottom edge
    pub bottom_margin: f32,
}

impl ViewportBand {
    pub fn from_config(config: &OutlineConfig) -> Self {
        Self {
            top_margin: config.band_top,
            bottom_margin: config.band_bottom,
        }
    }

    /// Band edges in pixels for a viewport of the given height
    pub fn bounds(&self, viewport_height: f32) -> (f32, f32) {
        let top = viewport_height * self.top_margin;
        let bottom = viewport_height * (1.0 - self.bottom_margin);
        (top, bottom.max(top))
    }

    /// Whether an element spanning `top..bottom` touches the band
    pub fn intersects(&self, top: f32, bottom: f32, viewport_height: f32) -> bool {
        let (band_top, band_bottom) = self.bounds(viewport_height);
        top <= band_bottom && bottom >= band_top
    }
}

impl Default for ViewportBand {
    fn default() -> Self {
        Self::from_config(&OutlineConfig::default())
    }
}

/// Position of a rendered heading relative to the viewport top
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingGeometry {
    pub id: String,
    pub top: f32,
    pub bottom: f32,
}

/// One visibility change delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub id: String,
    pub is_intersecting: bool,
    /// Element top relative to the viewport, used to break ties
    pub top: f32,
}

/// Scroll geometry of a scrollable pane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f32, scroll_height: f32, client_height: f32) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Distance the pane can scroll
    fn scroll_range(&self) -> f32 {
        self.scroll_height - self.client_height
    }
}

/// Preview scroll offset that keeps it at the same relative position as
/// the editor.
///
/// Returns `None` when the editor cannot scroll or the metrics are not
/// finite, in which case the preview stays where it is.
pub fn sync_scroll(editor: &ScrollMetrics, preview: &ScrollMetrics) -> Option<f32> {
    let editor_range = editor.scroll_range();
    if !(editor_range > 0.0) || !editor.scroll_top.is_finite() {
        return None;
    }

    let ratio = (editor.scroll_top / editor_range).clamp(0.0, 1.0);
    let offset = ratio * preview.scroll_range().max(0.0);
    offset.is_finite().then_some(offset)
}

/// Tracks which observed heading is in view
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    band: ViewportBand,

    /// Anchors currently subscribed
    observed: HashSet<String>,

    /// Observed anchors currently inside the band
    intersecting: HashSet<String>,
}

impl ViewportTracker {
    pub fn new(band: ViewportBand) -> Self {
        Self {
            band,
            observed: HashSet::new(),
            intersecting: HashSet::new(),
        }
    }

    pub fn band(&self) -> ViewportBand {
        self.band
    }

    /// Replace all subscriptions with the given anchors.
    ///
    /// Intersection history is dropped too, so a heading already inside the
    /// band counts as entering it again on the next report.
    pub fn observe<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.observed = ids.into_iter().map(Into::into).collect();
        self.intersecting.clear();
        log::debug!("Observing {} heading anchors", self.observed.len());
    }

    /// Drop every subscription
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.intersecting.clear();
    }

    pub fn is_observing(&self, id: &str) -> bool {
        self.observed.contains(id)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Process one batch of visibility changes.
    ///
    /// Returns the id that should become active, if any heading entered the
    /// band in this batch.
    pub fn on_intersections(&mut self, batch: &[IntersectionEntry]) -> Option<String> {
        let mut entered: Vec<&IntersectionEntry> = Vec::new();

        for entry in batch {
            if !self.observed.contains(&entry.id) {
                continue;
            }
            if entry.is_intersecting {
                if self.intersecting.insert(entry.id.clone()) {
                    entered.push(entry);
                }
            } else {
                self.intersecting.remove(&entry.id);
            }
        }

        entered
            .into_iter()
            .min_by(|a, b| a.top.partial_cmp(&b.top).unwrap_or(Ordering::Equal))
            .map(|entry| entry.id.clone())
    }

    /// Derive visibility changes from element geometry and process them
    pub fn measure(&mut self, geometry: &[HeadingGeometry], viewport_height: f32) -> Option<String> {
        let batch: Vec<IntersectionEntry> = geometry
            .iter()
            .filter(|g| self.observed.contains(&g.id))
            .filter_map(|g| {
                let now = self.band.intersects(g.top, g.bottom, viewport_height);
                let before = self.intersecting.contains(&g.id);
                (now != before).then(|| IntersectionEntry {
                    id: g.id.clone(),
                    is_intersecting: now,
                    top: g.top,
                })
            })
            .collect();

        self.on_intersections(&batch)
    }
}
