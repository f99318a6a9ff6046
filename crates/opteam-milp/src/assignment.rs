//! Assignment variables and constraints.
//!
//! One binary `x[i,k]` is created per eligible `(player i, slot k)` pair of a
//! [`FormationPool`]. Ineligible pairs have no variable at all. The
//! constraints are:
//!
//! ```text
//! sum_i x[i,k] == 1   for every slot k
//! sum_k x[i,k] <= 1   for every pool player i
//! ```

use opteam_core::{FormationPool, LINEUP_SIZE};

use crate::{
    model::{LinearExpr, MilpModel, Relation, VarId},
    solver::{Solution, SolverError},
};

/// Assignment variables of one formation pool.
#[derive(Debug, Clone)]
pub struct AssignmentVars {
    /// `(player, var)` per slot.
    by_slot: Vec<Vec<(usize, VarId)>>,
    /// `(slot, var)` per pool player.
    by_player: Vec<Vec<(usize, VarId)>>,
}

impl AssignmentVars {
    /// Adds the assignment variables and constraints for `pool` to `model`.
    pub fn build(model: &mut MilpModel, pool: &FormationPool<'_>) -> Self {
        let slot_count = pool.formation().positions().len();
        let mut by_slot = vec![vec![]; slot_count];
        let mut by_player = vec![vec![]; pool.players().len()];

        for pair in pool.eligibility() {
            let player = pool.player(pair.player);
            let var = model.binary(format!("x[{},{}]", player.id(), pair.slot));
            by_slot[pair.slot].push((pair.player, var));
            by_player[pair.player].push((pair.slot, var));
        }

        for vars in &by_slot {
            let expr = vars.iter().map(|(_, var)| (*var, 1.0)).collect();
            model.add_constraint(expr, Relation::Eq, 1.0);
        }
        for vars in by_player.iter().filter(|vars| vars.len() > 1) {
            let expr = vars.iter().map(|(_, var)| (*var, 1.0)).collect();
            model.add_constraint(expr, Relation::LessEq, 1.0);
        }

        Self { by_slot, by_player }
    }

    /// `(player, var)` pairs that can fill `slot`.
    #[must_use]
    pub fn slot_vars(&self, slot: usize) -> &[(usize, VarId)] {
        &self.by_slot[slot]
    }

    /// `(slot, var)` pairs that `player` can fill.
    #[must_use]
    pub fn player_vars(&self, player: usize) -> &[(usize, VarId)] {
        &self.by_player[player]
    }

    /// 1 if `player` is in the lineup, 0 otherwise.
    #[must_use]
    pub fn selected(&self, player: usize) -> LinearExpr {
        self.by_player[player]
            .iter()
            .map(|(_, var)| (*var, 1.0))
            .collect()
    }

    /// Sum of the ratings of the assigned players.
    #[must_use]
    pub fn rating_expr(&self, pool: &FormationPool<'_>) -> LinearExpr {
        self.by_player
            .iter()
            .enumerate()
            .flat_map(|(player, vars)| {
                let rating = f64::from(pool.player(player).rating());
                vars.iter().map(move |(_, var)| (*var, rating))
            })
            .collect()
    }

    /// Reads the pool player index assigned to each slot.
    pub fn decode(&self, solution: &Solution) -> Result<Vec<usize>, SolverError> {
        let mut players = Vec::with_capacity(LINEUP_SIZE);
        for (slot, vars) in self.by_slot.iter().enumerate() {
            let mut assigned = vars
                .iter()
                .filter(|(_, var)| solution.is_set(*var))
                .map(|(player, _)| *player);
            match (assigned.next(), assigned.next()) {
                (Some(player), None) => players.push(player),
                (None, _) => {
                    return Err(SolverError::Inconsistent {
                        message: format!("slot {slot} has no assigned player"),
                    });
                }
                (Some(_), Some(_)) => {
                    return Err(SolverError::Inconsistent {
                        message: format!("slot {slot} has several assigned players"),
                    });
                }
            }
        }
        Ok(players)
    }
}
