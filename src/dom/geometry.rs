//! # Vertical geometry: layout rects and the viewport.
//!
//! The document model is headless, so layout comes from the host: it assigns
//! each element a [`Rect`] in document coordinates (via
//! [`Document::set_rect`](super::Document::set_rect)) and reports the current
//! [`Viewport`] with every scroll.
//!
//! ## Rules
//! - All values are vertical only. Horizontal position plays no role in
//!   pagination, so it is not modeled.
//! - `Rect::top` is measured from the top of the document, not the screen.
//! - An element the host never laid out has a zero rect and is treated as
//!   not rendered.

/// Vertical extent of one element, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Distance from the document top to the element top.
    pub top: f64,
    /// Rendered height. Zero means the element takes no space (hidden).
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Bottom edge (`top + height`).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// True if the element occupies any vertical space.
    #[inline]
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.height > 0.0
    }
}

/// The host's scroll window over the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Scroll offset: distance from the document top to the viewport top.
    pub scroll_top: f64,
    /// Visible height of the window.
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_top: f64, height: f64) -> Self {
        Self { scroll_top, height }
    }

    /// Bottom edge of the visible window (`scroll_top + height`).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.scroll_top + self.height
    }

    /// Cheap reveal check: the element is rendered and the viewport bottom
    /// has passed its top edge.
    ///
    /// This is intentionally approximate. An element already scrolled past
    /// still counts as revealed, and occlusion is ignored; the check only has
    /// to answer "has the reader reached this yet", and a sentinel is consumed
    /// the first time it does.
    #[inline]
    #[must_use]
    pub fn reveals(&self, rect: &Rect) -> bool {
        rect.is_rendered() && self.bottom() > rect.top
    }
}
