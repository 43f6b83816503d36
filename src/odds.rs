//! Three-way odds derivation.
//!
//! Maps the rating gap between two teams onto a coarse three-bucket
//! odds tuple. This is a classifier, not a pricing model: no margin,
//! no historical form, no live odds movement.

use rust_decimal_macros::dec;

use crate::types::{Odds, Team};

/// Rating gap (inclusive) within which a fixture is priced as even.
const EVEN_MATCH_GAP: i32 = 1;

/// Derive the odds tuple for a fixture from the two teams' ratings.
///
/// Pure and deterministic: no I/O, no shared state, freely callable from
/// concurrent tasks. With `diff = home.rating - away.rating`:
/// - `|diff| <= 1`: even match, odds (2.0, 4.0, 3.0)
/// - `diff > 1`: home favored, odds (2.0, 3.0, 5.0)
/// - `diff < -1`: away favored, odds (5.0, 4.0, 3.0)
///
/// The two favored buckets are not mirror images: the favorite pays 2.0
/// at home but 3.0 away, and the draw price moves with it. Only the
/// longshot price (5.0) is shared.
pub fn compute_odds(home: &Team, away: &Team) -> Odds {
    let diff = home.rating - away.rating;

    if diff.abs() <= EVEN_MATCH_GAP {
        Odds {
            home_win: dec!(2.0),
            draw: dec!(4.0),
            away_win: dec!(3.0),
        }
    } else if diff > EVEN_MATCH_GAP {
        Odds {
            home_win: dec!(2.0),
            draw: dec!(3.0),
            away_win: dec!(5.0),
        }
    } else {
        Odds {
            home_win: dec!(5.0),
            draw: dec!(4.0),
            away_win: dec!(3.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
