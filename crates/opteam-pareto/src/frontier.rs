//! The set of non-dominated lineups found so far.
//!
//! Invariant: no member dominates another and no two members field the same
//! player set. Members with identical scores but different players coexist.

use opteam_core::Lineup;

/// Result of offering a lineup to the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Insertion {
    /// The lineup was added; `evicted` members it dominates were removed.
    Accepted { evicted: usize },
    /// A member already fields the same 11 players.
    Duplicate,
    /// A member dominates the lineup.
    Dominated,
}

#[derive(Debug, Clone, Default)]
pub struct ParetoFrontier {
    lineups: Vec<Lineup>,
}

impl ParetoFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a frontier by inserting each lineup in order.
    pub fn from_lineups(lineups: impl IntoIterator<Item = Lineup>) -> Self {
        let mut frontier = Self::new();
        for lineup in lineups {
            frontier.insert(lineup);
        }
        frontier
    }

    /// Offers `candidate` to the frontier.
    ///
    /// An accepted candidate is appended, then every member dominated by
    /// another member is removed in a single pass.
    pub fn insert(&mut self, candidate: Lineup) -> Insertion {
        if self.lineups.iter().any(|p| p.has_same_players(&candidate)) {
            return Insertion::Duplicate;
        }
        if self.lineups.iter().any(|p| p.dominates(&candidate)) {
            return Insertion::Dominated;
        }

        self.lineups.push(candidate);
        let dominated: Vec<bool> = self
            .lineups
            .iter()
            .map(|q| self.lineups.iter().any(|p| p.dominates(q)))
            .collect();
        let before = self.lineups.len();
        let mut flags = dominated.into_iter();
        self.lineups.retain(|_| !flags.next().unwrap_or(false));
        let evicted = before - self.lineups.len();

        debug_assert!(self.is_consistent());
        Insertion::Accepted { evicted }
    }

    #[must_use]
    pub fn lineups(&self) -> &[Lineup] {
        &self.lineups
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lineups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lineups.is_empty()
    }

    #[must_use]
    pub fn into_lineups(self) -> Vec<Lineup> {
        self.lineups
    }

    /// Members by descending rating, then descending chemistry.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Lineup> {
        let mut sorted: Vec<&Lineup> = self.lineups.iter().collect();
        sorted.sort_by(|a, b| {
            b.rating_total()
                .cmp(&a.rating_total())
                .then(b.chemistry().cmp(&a.chemistry()))
        });
        sorted
    }

    /// Checks the frontier invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.lineups.iter().enumerate().all(|(i, p)| {
            self.lineups
                .iter()
                .enumerate()
                .all(|(j, q)| i == j || (!p.dominates(q) && !p.has_same_players(q)))
        })
    }
}

#[cfg(test)]
mod tests {
    use opteam_core::{ChemistryRules, Formation, LINEUP_SIZE, Player, PlayerRecord};
    use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
    use rand_pcg::Pcg32;

    use super::*;

    fn cm(id: u32, rating: i64, nation: &str) -> Player {
        Player::try_from(PlayerRecord {
            id,
            rating,
            nation: nation.to_owned(),
            league: format!("L{id}"),
            club: format!("C{id}"),
            positions: vec!["CM".to_owned()],
            ..PlayerRecord::default()
        })
        .unwrap()
    }

    fn lineup(players: &[&Player]) -> Lineup {
        let formation = Formation::new("cm", ["CM"; LINEUP_SIZE]).unwrap();
        Lineup::evaluate(&formation, players, &ChemistryRules::default()).unwrap()
    }

    /// 11 players rated 84 with ids from `first_id`, nations arranged so
    /// that chemistry is 20.
    fn squad_84_20(first_id: u32) -> Vec<Player> {
        let nations = ["A", "A", "A", "A", "A", "B", "B", "B", "B", "B", "C"];
        nations
            .iter()
            .zip(first_id..)
            .map(|(nation, id)| cm(id, 84, nation))
            .collect()
    }

    #[test]
    fn test_equal_scores_with_disjoint_players_coexist() {
        let first = squad_84_20(1);
        let second = squad_84_20(100);
        let first = lineup(&first.iter().collect::<Vec<_>>());
        let second = lineup(&second.iter().collect::<Vec<_>>());
        assert!((first.rating() - 84.0).abs() < 1e-9);
        assert_eq!(first.chemistry(), 20);

        let mut frontier = ParetoFrontier::new();
        assert_eq!(frontier.insert(first), Insertion::Accepted { evicted: 0 });
        assert_eq!(frontier.insert(second), Insertion::Accepted { evicted: 0 });
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_same_players_are_a_duplicate() {
        let players = squad_84_20(1);
        let mut refs: Vec<&Player> = players.iter().collect();
        let forward = lineup(&refs);
        refs.reverse();
        let backward = lineup(&refs);

        let mut frontier = ParetoFrontier::from_lineups([forward]);
        assert_eq!(frontier.insert(backward), Insertion::Duplicate);
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_dominated_candidate_is_rejected_and_dominating_candidate_evicts() {
        let weak: Vec<Player> = (1..=11).map(|id| cm(id, 80, "A")).collect();
        let strong: Vec<Player> = (20..=30).map(|id| cm(id, 85, "A")).collect();
        let other: Vec<Player> = (40..=50)
            .map(|id| cm(id, 82, &format!("N{id}")))
            .collect();
        let weak = lineup(&weak.iter().collect::<Vec<_>>());
        let strong = lineup(&strong.iter().collect::<Vec<_>>());
        let other = lineup(&other.iter().collect::<Vec<_>>());

        let mut frontier = ParetoFrontier::new();
        frontier.insert(weak.clone());
        frontier.insert(other);
        assert_eq!(frontier.len(), 2);

        assert_eq!(
            frontier.insert(strong.clone()),
            Insertion::Accepted { evicted: 2 }
        );
        assert_eq!(frontier.lineups(), std::slice::from_ref(&strong));
        assert_eq!(frontier.insert(weak), Insertion::Dominated);
        assert_eq!(frontier.into_lineups(), vec![strong]);
    }

    #[test]
    fn test_sorted_by_descending_rating() {
        let high: Vec<Player> = (1..=11)
            .map(|id| cm(id, 90, &format!("N{id}")))
            .collect();
        let low: Vec<Player> = (20..=30).map(|id| cm(id, 70, "A")).collect();
        let frontier = ParetoFrontier::from_lineups([
            lineup(&low.iter().collect::<Vec<_>>()),
            lineup(&high.iter().collect::<Vec<_>>()),
        ]);
        let ratings: Vec<u32> = frontier
            .sorted()
            .iter()
            .map(|l| l.rating_total())
            .collect();
        assert_eq!(ratings, vec![990, 770]);
    }

    #[test]
    fn test_random_insertions_keep_invariant() {
        let mut rng = Pcg32::seed_from_u64(42);
        let nations = ["A", "B", "C", "D"];
        let pool: Vec<Player> = (1..=30)
            .map(|id| {
                let nation = nations.choose(&mut rng).unwrap();
                cm(id, rng.random_range(60..=99), nation)
            })
            .collect();

        let mut frontier = ParetoFrontier::new();
        let mut offered = vec![];
        for _ in 0..300 {
            let players: Vec<&Player> = pool.choose_multiple(&mut rng, LINEUP_SIZE).collect();
            let candidate = lineup(&players);
            offered.push(candidate.clone());
            frontier.insert(candidate);
            assert!(frontier.is_consistent());
        }

        // every offered lineup is either on the frontier or beaten by a member
        for candidate in &offered {
            assert!(
                frontier
                    .lineups()
                    .iter()
                    .any(|p| p.dominates(candidate) || p.has_same_players(candidate))
            );
        }
    }
}
