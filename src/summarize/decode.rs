//! Greedy token selection with a minimum output length.

/// Pick the next token greedily.
///
/// While fewer than `min_tokens` tokens have been generated the `eos` token
/// is masked out, so generation cannot stop early. Ties resolve to the lowest
/// token id, which keeps decoding deterministic. Returns `None` for empty
/// logits.
pub fn select_next_token(
    logits: &[f32],
    generated: usize,
    min_tokens: usize,
    eos: u32,
) -> Option<u32> {
    let mask_eos = generated < min_tokens;

    logits
        .iter()
        .enumerate()
        .filter(|&(id, logit)| !(mask_eos && id as u32 == eos) && !logit.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (id, &logit)| match best {
            Some((_, best_logit)) if best_logit >= logit => best,
            _ => Some((id, logit)),
        })
        .map(|(id, _)| id as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EOS: u32 = 1;

    #[test]
    fn picks_highest_logit() {
        assert_eq!(select_next_token(&[0.1, 0.2, 3.0, 0.5], 0, 0, EOS), Some(2));
    }

    #[test]
    fn eos_masked_before_minimum() {
        let logits = [0.0, 9.0, 2.0, 1.0];
        assert_eq!(select_next_token(&logits, 5, 30, EOS), Some(2));
    }

    #[test]
    fn eos_allowed_once_minimum_reached() {
        let logits = [0.0, 9.0, 2.0, 1.0];
        assert_eq!(select_next_token(&logits, 30, 30, EOS), Some(EOS));
    }

    #[test]
    fn ties_resolve_to_lowest_id() {
        assert_eq!(select_next_token(&[1.0, 0.0, 5.0, 5.0], 0, 0, EOS), Some(2));
    }

    #[test]
    fn nan_logits_are_ignored() {
        assert_eq!(select_next_token(&[f32::NAN, 0.5, 0.7], 0, 0, EOS), Some(2));
    }

    #[test]
    fn empty_logits_yield_none() {
        assert_eq!(select_next_token(&[], 0, 0, EOS), None);
    }

    #[test]
    fn only_eos_available_while_masked_yields_none() {
        assert_eq!(select_next_token(&[f32::NAN, 4.0], 0, 10, EOS), None);
    }
}
