// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw style values and the enumerated properties the box model cares about.
//!
//! Style maps hold raw strings keyed by camel-case property name
//! (`marginLeft`, `borderTopWidth`, …), exactly as the host's resolver hands
//! them over. This module parses the handful of value shapes the core needs:
//! pixel lengths, percentages, and the keyword sets for `display`, `float`,
//! `clear`, and `position`.

/// Computed `display` value (subset relevant to flow classification).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Display {
    /// Block-level box.
    Block,
    /// Inline box.
    Inline,
    /// Inline-level block container.
    InlineBlock,
    /// Table container (treated as block-level).
    Table,
    /// Table row.
    TableRow,
    /// Table cell.
    TableCell,
    /// Not rendered.
    None,
}

impl Display {
    /// Parse a raw `display` value; unknown keywords fall back to `Block`.
    #[must_use]
    pub fn from_css(value: &str) -> Self {
        match value {
            "inline" => Self::Inline,
            "inline-block" | "inline-flex" | "inline-table" => Self::InlineBlock,
            "table" => Self::Table,
            "table-row" => Self::TableRow,
            "table-cell" => Self::TableCell,
            "none" => Self::None,
            _ => Self::Block,
        }
    }

    /// Whether this display generates a block-level box.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(self, Self::Block | Self::Table | Self::TableRow)
    }

    /// Whether this display generates an inline-level box.
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock)
    }
}

/// Computed `float` value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Float {
    /// Not floated.
    None,
    /// Floated to the left edge.
    Left,
    /// Floated to the right edge.
    Right,
}

impl Float {
    /// Parse a raw `float` value; unknown keywords mean not floated.
    #[must_use]
    pub fn from_css(value: &str) -> Self {
        match value {
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::None,
        }
    }
}

/// Computed `clear` value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Clear {
    /// Does not clear.
    None,
    /// Clears left floats.
    Left,
    /// Clears right floats.
    Right,
    /// Clears floats on both sides.
    Both,
}

impl Clear {
    /// Parse a raw `clear` value; unknown keywords mean no clearance.
    #[must_use]
    pub fn from_css(value: &str) -> Self {
        match value {
            "left" => Self::Left,
            "right" => Self::Right,
            "both" => Self::Both,
            _ => Self::None,
        }
    }

    /// Whether this clearance terminates floats on the given side.
    #[must_use]
    pub const fn clears(self, float: Float) -> bool {
        match self {
            Self::None => false,
            Self::Both => matches!(float, Float::Left | Float::Right),
            Self::Left => matches!(float, Float::Left),
            Self::Right => matches!(float, Float::Right),
        }
    }
}

/// Computed `position` value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Position {
    /// Normal flow.
    Static,
    /// Normal flow, offset afterwards.
    Relative,
    /// Out of flow, positioned against an ancestor.
    Absolute,
    /// Out of flow, positioned against the viewport.
    Fixed,
    /// In flow until scrolled, then pinned.
    Sticky,
}

impl Position {
    /// Parse a raw `position` value; unknown keywords fall back to `Static`.
    #[must_use]
    pub fn from_css(value: &str) -> Self {
        match value {
            "relative" => Self::Relative,
            "absolute" => Self::Absolute,
            "fixed" => Self::Fixed,
            "sticky" => Self::Sticky,
            _ => Self::Static,
        }
    }
}

/// Parse a raw length value into logical pixels.
///
/// Accepts `"12px"`, bare numbers, and percentages resolved against
/// `percent_base`. `auto`, empty strings, and unparseable values yield
/// `None`; callers decide the fallback (usually `0.0`).
#[must_use]
pub fn parse_length(value: &str, percent_base: f64) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() || value == "auto" || value == "none" {
        return None;
    }
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f64>().ok().map(|p| p / 100.0 * percent_base);
    }
    let number = value.strip_suffix("px").unwrap_or(value);
    number.trim().parse::<f64>().ok()
}

/// The percentage component of a raw value, if it is a percentage.
///
/// `"50%"` yields `Some(50.0)`; anything else yields `None`. Used by the
/// `block_static` predicate, which sums percentage widths without resolving
/// them against a base.
#[must_use]
pub fn percent_of(value: &str) -> Option<f64> {
    value
        .trim()
        .strip_suffix('%')
        .and_then(|p| p.trim().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_parse_px_and_bare_numbers() {
        assert_eq!(parse_length("12px", 0.0), Some(12.0));
        assert_eq!(parse_length(" 7.5 ", 0.0), Some(7.5));
        assert_eq!(parse_length("-4px", 0.0), Some(-4.0));
    }

    #[test]
    fn lengths_resolve_percent_against_base() {
        assert_eq!(parse_length("50%", 200.0), Some(100.0));
        assert_eq!(percent_of("50%"), Some(50.0));
        assert_eq!(percent_of("50px"), None);
    }

    #[test]
    fn auto_and_garbage_yield_none() {
        assert_eq!(parse_length("auto", 100.0), None);
        assert_eq!(parse_length("", 100.0), None);
        assert_eq!(parse_length("thin", 100.0), None);
    }

    #[test]
    fn display_classes() {
        assert!(Display::from_css("table").is_block_level());
        assert!(Display::from_css("inline-block").is_inline_level());
        assert_eq!(Display::from_css("who-knows"), Display::Block);
    }

    #[test]
    fn clear_matches_sides() {
        assert!(Clear::Both.clears(Float::Left));
        assert!(Clear::Both.clears(Float::Right));
        assert!(Clear::Left.clears(Float::Left));
        assert!(!Clear::Left.clears(Float::Right));
        assert!(!Clear::None.clears(Float::Left));
    }
}
