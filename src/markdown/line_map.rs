//! Estimated rendered height per source line
//!
//! A cheap structural heuristic used by line-aware scroll mapping. Each
//! source line is classified and assigned a weight in abstract height
//! units; the estimate stores the cumulative units preceding every line.

// ─────────────────────────────────────────────────────────────────────────────
// Line Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Structural class of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// ATX heading (`# Title`)
    Heading,
    /// Code fence delimiter (```` ``` ````)
    Fence,
    /// Empty or whitespace-only line
    Blank,
    /// Anything else
    Ordinary,
}

impl LineKind {
    /// Classify a single line (without its trailing newline).
    pub fn classify(line: &str) -> Self {
        if line.starts_with('#') {
            LineKind::Heading
        } else if line.starts_with("```") {
            LineKind::Fence
        } else if line.trim().is_empty() {
            LineKind::Blank
        } else {
            LineKind::Ordinary
        }
    }

    /// Estimated height units this line occupies once rendered.
    pub fn weight(self) -> u32 {
        match self {
            LineKind::Heading => 2,
            LineKind::Fence | LineKind::Blank | LineKind::Ordinary => 1,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Height Estimate
// ─────────────────────────────────────────────────────────────────────────────

/// Cumulative estimated height for each 0-based source line.
///
/// `offset(i)` is the number of units rendered before line `i`; `total()`
/// is the height of the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHeightEstimate {
    /// `offsets[i]` = units before line `i`; one extra entry holds the total
    offsets: Vec<u32>,
}

impl Default for LineHeightEstimate {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl LineHeightEstimate {
    /// Build the estimate for `text`. Empty text still has one line.
    pub fn from_text(text: &str) -> Self {
        let mut offsets = Vec::with_capacity(text.len() / 32 + 2);
        let mut running = 0u32;
        for line in text.split('\n') {
            offsets.push(running);
            running = running.saturating_add(LineKind::classify(line).weight());
        }
        offsets.push(running);
        Self { offsets }
    }

    /// Number of source lines covered.
    pub fn line_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Units preceding `line` (clamped to the last line).
    pub fn offset(&self, line: usize) -> u32 {
        self.offsets[line.min(self.line_count() - 1)]
    }

    /// Total estimated height of the document.
    pub fn total(&self) -> u32 {
        self.offsets[self.line_count()]
    }

    /// Line whose estimated span contains `units`.
    pub fn line_at_offset(&self, units: f32) -> usize {
        if !(units > 0.0) {
            return 0;
        }
        // First line whose start lies beyond `units`, minus one.
        let idx = self.offsets[..self.line_count()].partition_point(|&o| (o as f32) <= units);
        idx.saturating_sub(1)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_lines() {
        assert_eq!(LineKind::classify("# Title"), LineKind::Heading);
        assert_eq!(LineKind::classify("###"), LineKind::Heading);
        assert_eq!(LineKind::classify("```rust"), LineKind::Fence);
        assert_eq!(LineKind::classify(""), LineKind::Blank);
        assert_eq!(LineKind::classify("   \t"), LineKind::Blank);
        assert_eq!(LineKind::classify("text"), LineKind::Ordinary);
        assert_eq!(LineKind::classify("  # indented"), LineKind::Ordinary);
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let estimate = LineHeightEstimate::from_text("");
        assert_eq!(estimate.line_count(), 1);
        assert_eq!(estimate.offset(0), 0);
        assert_eq!(estimate.total(), 1);
    }

    #[test]
    fn test_cumulative_offsets() {
        let estimate = LineHeightEstimate::from_text("# Title\n\ntext\n```\ncode\n```");
        assert_eq!(estimate.line_count(), 6);
        assert_eq!(estimate.offset(0), 0);
        assert_eq!(estimate.offset(1), 2);
        assert_eq!(estimate.offset(2), 3);
        assert_eq!(estimate.offset(3), 4);
        assert_eq!(estimate.offset(5), 6);
        assert_eq!(estimate.total(), 7);
    }

    #[test]
    fn test_offset_clamps_past_end() {
        let estimate = LineHeightEstimate::from_text("a\nb");
        assert_eq!(estimate.offset(99), estimate.offset(1));
    }

    #[test]
    fn test_line_at_offset() {
        let estimate = LineHeightEstimate::from_text("# Title\nbody\nmore");
        assert_eq!(estimate.line_at_offset(0.0), 0);
        assert_eq!(estimate.line_at_offset(1.5), 0);
        assert_eq!(estimate.line_at_offset(2.0), 1);
        assert_eq!(estimate.line_at_offset(3.2), 2);
        assert_eq!(estimate.line_at_offset(100.0), 2);
        assert_eq!(estimate.line_at_offset(f32::NAN), 0);
    }
}
