//! The insight category palette as data.
//!
//! Each entry pairs a category with the generator that produces it. The
//! table is kept in ascending priority order; adding a category means adding
//! an [`InsightKind`] variant and a row here.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::context::InsightInputs;
use crate::generators::{diagnostics, impact, resources, score, web_vitals};
use crate::insight::{Insight, InsightKind};

/// Produces the insights of one category from the shared inputs.
pub type Generator = fn(&InsightInputs<'_>) -> Vec<Insight>;

#[derive(Clone, Copy)]
pub struct PaletteEntry {
    pub kind: InsightKind,
    pub generate: Generator,
}

impl PaletteEntry {
    #[must_use]
    pub const fn new(kind: InsightKind, generate: Generator) -> Self {
        Self { kind, generate }
    }

    #[must_use]
    pub const fn priority(&self) -> u8 {
        self.kind.priority()
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.kind.label()
    }

    #[must_use]
    pub fn is_muted(&self, muted: &BTreeSet<String>) -> bool {
        muted.contains(self.kind.key())
    }

    #[must_use]
    pub const fn info(&self) -> CategoryInfo {
        CategoryInfo {
            kind: self.kind,
            label: self.kind.label(),
            priority: self.kind.priority(),
        }
    }
}

impl fmt::Debug for PaletteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteEntry")
            .field("kind", &self.kind)
            .field("priority", &self.priority())
            .finish_non_exhaustive()
    }
}

/// Presentation metadata for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub label: &'static str,
    pub priority: u8,
}

/// Every category, most urgent first.
pub const PALETTE: [PaletteEntry; 16] = [
    PaletteEntry::new(InsightKind::BusinessImpact, impact::business_impact),
    PaletteEntry::new(InsightKind::Score, score::score),
    PaletteEntry::new(InsightKind::ScoreTrend, score::score_trend),
    PaletteEntry::new(InsightKind::LayoutShift, web_vitals::layout_shift),
    PaletteEntry::new(InsightKind::InputDelay, web_vitals::input_delay),
    PaletteEntry::new(InsightKind::LargestPaint, web_vitals::largest_paint),
    PaletteEntry::new(InsightKind::TimeToInteractive, web_vitals::time_to_interactive),
    PaletteEntry::new(InsightKind::Resources, resources::resources),
    PaletteEntry::new(InsightKind::WeightByType, resources::weight_by_type),
    PaletteEntry::new(InsightKind::BootupTime, web_vitals::bootup_time),
    PaletteEntry::new(InsightKind::RenderBlocking, diagnostics::render_blocking),
    PaletteEntry::new(InsightKind::FontDisplay, diagnostics::font_display),
    PaletteEntry::new(InsightKind::BlockingTime, web_vitals::blocking_time),
    PaletteEntry::new(InsightKind::ThirdParty, diagnostics::third_party),
    PaletteEntry::new(InsightKind::DocumentWrite, diagnostics::document_write),
    PaletteEntry::new(InsightKind::Redirects, diagnostics::redirects),
];

/// The full palette with labels and priorities, regardless of mute state.
#[must_use]
pub fn palette() -> Vec<CategoryInfo> {
    PALETTE.iter().map(PaletteEntry::info).collect()
}
