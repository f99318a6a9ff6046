//! Linear encoding of the tiered chemistry rules.
//!
//! For every category value `j` observed in the pool and every tier `m` whose
//! threshold is reachable at all, a binary `g[j,m]` is created:
//!
//! ```text
//! threshold[m] * g[j,m] <= sum_{i in j} weight_i * sum_k x[i,k]
//! sum_m g[j,m] <= 1
//! ```
//!
//! `g[j,m]` can only be 1 when the weighted headcount of assigned players
//! meets the threshold. Nothing forces it to 1; the objective pushes the
//! highest reachable tier up.
//!
//! Chemistry then flows from tiers to players to slots:
//!
//! ```text
//! ch[i]  <= sum over i's three groups of sum_m m * g[j,m]     ch[i] in [0, 3]
//! pc[k]  <= 3 * (1 - x[i,k]) + ch[i]     for every eligible (i, k)
//! fc[k]  <= pc[k] + 3 * sum_{special i} x[i,k]                 fc[k] in [0, 3]
//! ```
//!
//! `ch`, `pc` and `fc` are continuous: all their bounds are integral once the
//! binaries are fixed, so they take integral values wherever the objective
//! pushes them. Reported chemistry is never read from them.

use opteam_core::{Category, ChemistryRules, FormationPool, MAX_CHEMISTRY};

use crate::{
    assignment::AssignmentVars,
    model::{LinearExpr, MilpModel, Relation, VarId},
};

/// Tier indicators of one category value.
#[derive(Debug, Clone)]
pub struct TierGroup {
    pub category: Category,
    pub value: String,
    /// `(tier, g[j,tier])` for every reachable tier.
    pub indicators: Vec<(u32, VarId)>,
}

/// Chemistry variables of one formation pool.
#[derive(Debug, Clone)]
pub struct ChemistryVars {
    groups: Vec<TierGroup>,
    player_chemistry: Vec<VarId>,
    position_chemistry: Vec<VarId>,
    final_chemistry: Vec<VarId>,
}

impl ChemistryVars {
    /// Adds the chemistry variables and constraints for `pool` to `model`.
    pub fn build(
        model: &mut MilpModel,
        pool: &FormationPool<'_>,
        assignment: &AssignmentVars,
        rules: &ChemistryRules,
    ) -> Self {
        let max = f64::from(MAX_CHEMISTRY);
        let players = pool.players();

        // tier points available to each player, summed over its three groups
        let mut potential = vec![LinearExpr::new(); players.len()];
        let mut groups = vec![];
        for category in Category::ALL {
            let thresholds = rules.thresholds(category);
            for (value, members) in pool.category_groups(category) {
                let capacity: u32 = members
                    .iter()
                    .map(|i| players[*i].headcount_weight(category))
                    .sum();
                let reachable: Vec<(u32, u32)> = thresholds
                    .tiers()
                    .filter(|(_, threshold)| *threshold <= capacity)
                    .collect();
                if reachable.is_empty() {
                    continue;
                }

                let mut headcount = LinearExpr::new();
                for i in &members {
                    let weight = f64::from(players[*i].headcount_weight(category));
                    headcount.add_scaled(&assignment.selected(*i), weight);
                }

                let mut indicators = vec![];
                let mut at_most_one = LinearExpr::new();
                for (tier, threshold) in reachable {
                    let g = model.binary(format!("g[{category}:{value},{tier}]"));
                    let mut unlock = LinearExpr::new().with_term(g, f64::from(threshold));
                    unlock.add_scaled(&headcount, -1.0);
                    model.add_constraint(unlock, Relation::LessEq, 0.0);
                    at_most_one.add_term(g, 1.0);
                    for i in &members {
                        potential[*i].add_term(g, f64::from(tier));
                    }
                    indicators.push((tier, g));
                }
                model.add_constraint(at_most_one, Relation::LessEq, 1.0);
                groups.push(TierGroup {
                    category,
                    value: value.to_owned(),
                    indicators,
                });
            }
        }

        let player_chemistry: Vec<VarId> = players
            .iter()
            .zip(potential)
            .map(|(player, potential)| {
                let ch = model.continuous(format!("ch[{}]", player.id()), 0.0, max);
                let mut bound = LinearExpr::new().with_term(ch, 1.0);
                bound.add_scaled(&potential, -1.0);
                model.add_constraint(bound, Relation::LessEq, 0.0);
                ch
            })
            .collect();

        let slot_count = pool.formation().positions().len();
        let mut position_chemistry = Vec::with_capacity(slot_count);
        let mut final_chemistry = Vec::with_capacity(slot_count);
        for slot in 0..slot_count {
            let pc = model.continuous(format!("pc[{slot}]"), 0.0, max);
            let fc = model.continuous(format!("fc[{slot}]"), 0.0, max);

            let mut relaxed = LinearExpr::new()
                .with_term(fc, 1.0)
                .with_term(pc, -1.0);
            for (player, x) in assignment.slot_vars(slot) {
                // pc + 3x - ch <= 3
                let bound = LinearExpr::new()
                    .with_term(pc, 1.0)
                    .with_term(*x, max)
                    .with_term(player_chemistry[*player], -1.0);
                model.add_constraint(bound, Relation::LessEq, max);
                if players[*player].has_forced_max_chemistry() {
                    relaxed.add_term(*x, -max);
                }
            }
            model.add_constraint(relaxed, Relation::LessEq, 0.0);

            position_chemistry.push(pc);
            final_chemistry.push(fc);
        }

        Self {
            groups,
            player_chemistry,
            position_chemistry,
            final_chemistry,
        }
    }

    #[must_use]
    pub fn groups(&self) -> &[TierGroup] {
        &self.groups
    }

    #[must_use]
    pub fn player_chemistry(&self, player: usize) -> VarId {
        self.player_chemistry[player]
    }

    #[must_use]
    pub fn position_chemistry(&self, slot: usize) -> VarId {
        self.position_chemistry[slot]
    }

    #[must_use]
    pub fn final_chemistry(&self, slot: usize) -> VarId {
        self.final_chemistry[slot]
    }

    /// Sum of the final chemistry of every slot.
    #[must_use]
    pub fn total_expr(&self) -> LinearExpr {
        self.final_chemistry.iter().map(|fc| (*fc, 1.0)).collect()
    }
}

#[cfg(test)]
mod tests {
    use opteam_core::{Formation, LINEUP_SIZE, PlayerCatalog, PlayerRecord};

    use super::*;
    use crate::solver::{MicroLpSolver, MilpSolver, SolveOutcome};

    fn record(id: u32, nation: &str, league: &str, club: &str) -> PlayerRecord {
        PlayerRecord {
            id,
            rating: 80,
            nation: nation.to_owned(),
            league: league.to_owned(),
            club: club.to_owned(),
            positions: vec!["CM".to_owned()],
            ..PlayerRecord::default()
        }
    }

    fn all_cm() -> Formation {
        Formation::new("cm", ["CM"; LINEUP_SIZE]).unwrap()
    }

    fn build(
        catalog: &PlayerCatalog,
        formation: &Formation,
    ) -> (MilpModel, AssignmentVars, ChemistryVars) {
        let pool = catalog.pool(formation).unwrap();
        let mut model = MilpModel::new();
        let assignment = AssignmentVars::build(&mut model, &pool);
        let chemistry =
            ChemistryVars::build(&mut model, &pool, &assignment, &ChemistryRules::default());
        model.set_objective(chemistry.total_expr());
        (model, assignment, chemistry)
    }

    fn solve(model: &MilpModel) -> crate::solver::Solution {
        match MicroLpSolver.solve(model).unwrap() {
            SolveOutcome::Optimal(solution) => solution,
            SolveOutcome::Infeasible => panic!("expected an optimal solution"),
        }
    }

    #[test]
    fn test_unreachable_groups_are_absent() {
        // every value is unique, so no tier can ever be unlocked
        let records = (1..=11).map(|id| {
            record(id, &format!("N{id}"), &format!("L{id}"), &format!("C{id}"))
        });
        let (catalog, _) = PlayerCatalog::from_records(records);
        let formation = all_cm();
        let (model, _, chemistry) = build(&catalog, &formation);
        assert!(chemistry.groups().is_empty());

        let solution = solve(&model);
        assert!(solution.objective().abs() < 1e-6);
    }

    #[test]
    fn test_reachable_tiers_only() {
        // 5 players of nation A: tiers 1 (2) and 2 (5) reachable, not 3 (8)
        let records = (1..=11).map(|id| {
            let nation = if id <= 5 { "A".to_owned() } else { format!("N{id}") };
            record(id, &nation, &format!("L{id}"), &format!("C{id}"))
        });
        let (catalog, _) = PlayerCatalog::from_records(records);
        let formation = all_cm();
        let (model, _, chemistry) = build(&catalog, &formation);

        assert_eq!(chemistry.groups().len(), 1);
        let group = &chemistry.groups()[0];
        assert_eq!(group.category, Category::Nation);
        assert_eq!(group.value, "A");
        let tiers: Vec<u32> = group.indicators.iter().map(|(tier, _)| *tier).collect();
        assert_eq!(tiers, vec![1, 2]);

        let solution = solve(&model);
        // five nation-A players at tier 2
        assert!((solution.objective() - 10.0).abs() < 1e-6);
        let active: usize = group
            .indicators
            .iter()
            .filter(|(_, g)| solution.is_set(*g))
            .count();
        assert_eq!(active, 1);
        assert!(solution.is_set(group.indicators[1].1));
    }

    #[test]
    fn test_icon_slot_has_max_chemistry() {
        let mut records: Vec<PlayerRecord> = (1..=10)
            .map(|id| record(id, &format!("N{id}"), &format!("L{id}"), &format!("C{id}")))
            .collect();
        records.push(PlayerRecord {
            is_icon: true,
            rating: 95,
            ..record(11, "X", "Y", "Z")
        });
        let (catalog, _) = PlayerCatalog::from_records(records);
        let formation = all_cm();
        let pool = catalog.pool(&formation).unwrap();
        let (model, assignment, chemistry) = build(&catalog, &formation);

        let solution = solve(&model);
        let slots = assignment.decode(&solution).unwrap();
        let icon_slot = slots
            .iter()
            .position(|player| pool.player(*player).has_forced_max_chemistry())
            .unwrap();
        let fc = solution.value(chemistry.final_chemistry(icon_slot));
        assert!((fc - 3.0).abs() < 1e-6);
        // position chemistry never exceeds the assigned player's chemistry
        for (slot, player) in slots.iter().enumerate() {
            let pc = solution.value(chemistry.position_chemistry(slot));
            let ch = solution.value(chemistry.player_chemistry(*player));
            assert!(pc <= ch + 1e-6);
        }
        assert!((solution.objective() - 3.0).abs() < 1e-6);
        assert!(model.is_satisfied_by(solution.values(), 1e-6));
    }

    #[test]
    fn test_hero_counts_double_for_league() {
        // hero + 1 mate in league L reach 3 heads: league tier 1 for the mate
        let mut records: Vec<PlayerRecord> = (1..=10)
            .map(|id| record(id, &format!("N{id}"), &format!("L{id}"), &format!("C{id}")))
            .collect();
        records[0].league = "L".to_owned();
        records.push(PlayerRecord {
            is_hero: true,
            ..record(11, "X", "L", "Z")
        });
        let (catalog, _) = PlayerCatalog::from_records(records);
        let formation = all_cm();
        let (model, _, _) = build(&catalog, &formation);

        let solution = solve(&model);
        // hero forced to 3, mate gets league tier 1
        assert!((solution.objective() - 4.0).abs() < 1e-6);
    }
}
