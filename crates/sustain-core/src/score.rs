//! Aggregate sustainability score.

/// Score a source file from its suggestion count.
///
/// Base score of 100 minus 2 points per suggestion, with a floor of 0.
pub fn sustainability_score(suggestion_count: usize) -> u8 {
    let penalty = suggestion_count.saturating_mul(2);
    100u8.saturating_sub(penalty.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_code_scores_full_marks() {
        assert_eq!(sustainability_score(0), 100);
    }

    #[test]
    fn each_suggestion_costs_two_points() {
        assert_eq!(sustainability_score(1), 98);
        assert_eq!(sustainability_score(10), 80);
    }

    #[test]
    fn score_floors_at_zero() {
        assert_eq!(sustainability_score(50), 0);
        assert_eq!(sustainability_score(51), 0);
        assert_eq!(sustainability_score(usize::MAX), 0);
    }
}
