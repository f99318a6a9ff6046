//! Fixtures shared by the solver-backed tests.

use std::collections::BTreeSet;

use opteam_core::{ChemistryRules, Formation, Lineup, Player, PlayerCatalog, PlayerId, PlayerRecord};

/// A 4-4-2 squad with a spare centre midfielder and a spare striker.
///
/// The rating/chemistry trade-off is between striker 11 (nation B, keeps the
/// nation B group at tier 2) and striker 12 (higher rating, no links).
pub(crate) fn catalog() -> PlayerCatalog {
    let rows: [(u32, &str, i64, &str, &str, &str); 13] = [
        (1, "GK", 80, "A", "L1", "C1"),
        (2, "LB", 80, "A", "L1", "C2"),
        (3, "CB", 80, "A", "L1", "C3"),
        (4, "CB", 80, "A", "L2", "C4"),
        (5, "RB", 80, "A", "L2", "C5"),
        (6, "LM", 80, "B", "L2", "C6"),
        (7, "CM", 80, "B", "L3", "C7"),
        (8, "CM", 80, "B", "L3", "C8"),
        (9, "RM", 80, "B", "L3", "C9"),
        (10, "ST", 80, "B", "L4", "C10"),
        (11, "ST", 80, "B", "L4", "C11"),
        (12, "ST", 88, "D", "L5", "C12"),
        (13, "CM", 76, "A", "L1", "C1"),
    ];
    let records = rows
        .into_iter()
        .map(|(id, position, rating, nation, league, club)| PlayerRecord {
            id,
            name: format!("Player {id}"),
            rating,
            nation: nation.to_owned(),
            league: league.to_owned(),
            club: club.to_owned(),
            positions: vec![position.to_owned()],
            ..PlayerRecord::default()
        });
    let (catalog, rejected) = PlayerCatalog::from_records(records);
    assert!(rejected.is_empty());
    catalog
}

/// Every valid assignment of catalog players to the formation's slots.
pub(crate) fn enumerate(
    catalog: &PlayerCatalog,
    formation: &Formation,
    rules: &ChemistryRules,
) -> Vec<Lineup> {
    fn fill<'a>(
        players: &'a [Player],
        formation: &Formation,
        rules: &ChemistryRules,
        chosen: &mut Vec<&'a Player>,
        out: &mut Vec<Lineup>,
    ) {
        let slot = chosen.len();
        let Some(position) = formation.positions().get(slot) else {
            out.push(Lineup::evaluate(formation, chosen, rules).unwrap());
            return;
        };
        for player in players {
            if player.can_play_at(position) && chosen.iter().all(|p| p.id() != player.id()) {
                chosen.push(player);
                fill(players, formation, rules, chosen, out);
                chosen.pop();
            }
        }
    }

    let mut out = vec![];
    fill(catalog.players(), formation, rules, &mut vec![], &mut out);
    out
}

/// Player sets of every lineup not dominated by another one.
pub(crate) fn pareto_sets(lineups: &[Lineup]) -> BTreeSet<BTreeSet<PlayerId>> {
    lineups
        .iter()
        .filter(|q| !lineups.iter().any(|p| p.dominates(q)))
        .map(Lineup::player_ids)
        .collect()
}
