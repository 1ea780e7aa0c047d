//! Two-bar engulfing reversal patterns
//!
//! Each flag at index i compares bar i with bar i - 1 only, so index 0 is
//! never flagged.

use crate::models::{Bar, PatternFlags};

/// Bearish bar followed by a bullish bar whose body strictly contains it
pub fn is_bullish_engulfing(prev: &Bar, curr: &Bar) -> bool {
    prev.is_bearish()
        && curr.is_bullish()
        && curr.close > prev.open
        && curr.open < prev.close
}

/// Bullish bar followed by a bearish bar whose body strictly contains it
pub fn is_bearish_engulfing(prev: &Bar, curr: &Bar) -> bool {
    prev.is_bullish()
        && curr.is_bearish()
        && curr.close < prev.open
        && curr.open > prev.close
}

/// Flag engulfing patterns across the whole series
pub fn detect_patterns(bars: &[Bar]) -> PatternFlags {
    let mut flags = PatternFlags {
        bullish_engulfing: vec![false; bars.len()],
        bearish_engulfing: vec![false; bars.len()],
    };

    for (i, pair) in bars.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);
        flags.bullish_engulfing[i + 1] = is_bullish_engulfing(prev, curr);
        flags.bearish_engulfing[i + 1] = is_bearish_engulfing(prev, curr);
    }

    flags
}
