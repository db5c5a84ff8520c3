//! Fixed-capacity label formatting.

use core::fmt::Write;

use heapless::String;

use crate::grouper::LifeHistoryEvent;

/// Fits any `i32` plus sign.
pub type NumberText = String<12>;

/// Fits `"+<i32> [<i32>]"`.
pub type HistoryCell = String<28>;

/// Plain decimal, e.g. `"40"`, `"-3"`.
pub fn number(value: i32) -> NumberText {
    let mut s = NumberText::new();
    let _ = write!(s, "{}", value);
    s
}

/// Signed delta for the ghost label: `"+3"`, `"-2"`, `"0"`.
pub fn signed_delta(delta: i32) -> NumberText {
    let mut s = NumberText::new();
    if delta > 0 {
        let _ = write!(s, "+{}", delta);
    } else {
        let _ = write!(s, "{}", delta);
    }
    s
}

/// One history table cell: `"+5 [25]"`, `"-3 [17]"`.
pub fn history_cell(event: &LifeHistoryEvent) -> HistoryCell {
    let mut s = HistoryCell::new();
    let _ = s.push_str(&signed_delta(event.net_life_change));
    let _ = write!(s, " [{}]", event.life_total);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(number(40).as_str(), "40");
        assert_eq!(number(-3).as_str(), "-3");
        assert_eq!(number(i32::MIN).as_str(), "-2147483648");
    }

    #[test]
    fn deltas_carry_sign() {
        assert_eq!(signed_delta(3).as_str(), "+3");
        assert_eq!(signed_delta(-2).as_str(), "-2");
        assert_eq!(signed_delta(0).as_str(), "0");
    }

    #[test]
    fn cells() {
        let up = LifeHistoryEvent {
            net_life_change: 5,
            life_total: 25,
            player_id: 0,
        };
        let down = LifeHistoryEvent {
            net_life_change: -3,
            life_total: 17,
            player_id: 1,
        };
        let flat = LifeHistoryEvent {
            net_life_change: 0,
            life_total: 20,
            player_id: 2,
        };
        assert_eq!(history_cell(&up).as_str(), "+5 [25]");
        assert_eq!(history_cell(&down).as_str(), "-3 [17]");
        assert_eq!(history_cell(&flat).as_str(), "0 [20]");

        let extreme = LifeHistoryEvent {
            net_life_change: i32::MIN,
            life_total: i32::MIN,
            player_id: 0,
        };
        assert_eq!(history_cell(&extreme).len(), 11 + 2 + 11 + 1);
    }
}
