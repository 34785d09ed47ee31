//! Move-quality degradation.
//!
//! With probability `p` the engine's answer is swapped for a different legal
//! move chosen uniformly from the oracle's move list. The replacement is
//! always legal, only worse.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::oracle::{MoveOracle, OracleError};
use crate::types::Position;

/// The `from+to` part of a long-algebraic move.
fn square_pair(mv: &str) -> &str {
    mv.get(..4).unwrap_or(mv)
}

/// Legal `from+to` pairs of `position` other than `best`, in oracle order.
///
/// Promotions to different pieces share a pair and appear once.
pub fn blunder_candidates(
    oracle: &dyn MoveOracle,
    position: &Position,
    best: &str,
) -> Result<Vec<String>, OracleError> {
    let best = square_pair(best);
    let mut candidates: Vec<String> = Vec::new();
    for legal in oracle.legal_moves(position)? {
        let pair = legal.square_pair();
        if pair != best && !candidates.contains(&pair) {
            candidates.push(pair);
        }
    }
    Ok(candidates)
}

/// Decide the move actually played.
///
/// Draws once from `rng`; below `probability` a candidate replaces `best`.
/// With no candidate, or when the oracle cannot read the position, `best` is
/// returned verbatim.
pub fn choose_move<R: Rng + ?Sized>(
    oracle: &dyn MoveOracle,
    position: &Position,
    best: &str,
    probability: f64,
    rng: &mut R,
) -> String {
    let draw: f64 = rng.gen();
    if draw >= probability {
        return best.to_string();
    }

    let candidates = match blunder_candidates(oracle, position, best) {
        Ok(candidates) => candidates,
        Err(e) => {
            log::warn!("cannot degrade engine move {best}: {e}");
            return best.to_string();
        }
    };

    match candidates.choose(rng) {
        Some(blunder) => {
            log::debug!("blunder injected: {blunder} instead of {best} (draw {draw:.3} < {probability})");
            blunder.clone()
        }
        None => best.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::oracle::ShakmatyOracle;

    // Black king on h8 can only step to g8.
    const ONLY_MOVE: &str = "7k/8/6K1/8/8/8/8/R7 b - - 0 1";

    #[test]
    fn test_candidates_exclude_best() {
        let candidates =
            blunder_candidates(&ShakmatyOracle, &Position::start(), "e2e4").unwrap();
        assert_eq!(candidates.len(), 19);
        assert!(!candidates.contains(&"e2e4".to_string()));
    }

    #[test]
    fn test_promotions_collapse_to_one_pair() {
        let pos = Position::new("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let candidates = blunder_candidates(&ShakmatyOracle, &pos, "a1b1").unwrap();
        let promo = candidates.iter().filter(|c| c.as_str() == "a7a8").count();
        assert_eq!(promo, 1);
    }

    #[test]
    fn test_best_with_promotion_suffix_is_excluded() {
        let pos = Position::new("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let candidates = blunder_candidates(&ShakmatyOracle, &pos, "a7a8q").unwrap();
        assert!(!candidates.contains(&"a7a8".to_string()));
    }

    #[test]
    fn test_zero_probability_never_degrades() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let mv = choose_move(&ShakmatyOracle, &Position::start(), "e2e4", 0.0, &mut rng);
            assert_eq!(mv, "e2e4");
        }
    }

    #[test]
    fn test_certain_blunder_is_legal_and_different() {
        let mut rng = StdRng::seed_from_u64(42);
        let legal = blunder_candidates(&ShakmatyOracle, &Position::start(), "").unwrap();
        for _ in 0..50 {
            let mv = choose_move(&ShakmatyOracle, &Position::start(), "e2e4", 1.0, &mut rng);
            assert_ne!(mv, "e2e4");
            assert!(legal.contains(&mv));
        }
    }

    #[test]
    fn test_only_move_is_kept() {
        let pos = Position::new(ONLY_MOVE);
        let legal = ShakmatyOracle.legal_moves(&pos).unwrap();
        assert_eq!(legal.len(), 1);
        let only = legal[0].square_pair();

        let mut rng = StdRng::seed_from_u64(3);
        let mv = choose_move(&ShakmatyOracle, &pos, &only, 1.0, &mut rng);
        assert_eq!(mv, only);
    }

    #[test]
    fn test_unreadable_position_falls_back() {
        let mut rng = StdRng::seed_from_u64(9);
        let mv = choose_move(&ShakmatyOracle, &Position::new("nonsense"), "e2e4", 1.0, &mut rng);
        assert_eq!(mv, "e2e4");
    }
}
