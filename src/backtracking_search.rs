//! This module implements grid-filling using recursive backtracking search. Before searching we
//! make every slot node- and arc-consistent; after each tentative choice we re-establish arc
//! consistency (maintaining arc consistency, or MAC). Slots are chosen by fewest remaining
//! options and then by most crossings, and words by how few options they rule out for crossing
//! slots.

use instant::{Duration, Instant};
use log::{debug, trace};
use std::cmp::Reverse;

use crate::arc_consistency::{
    enforce_node_consistency, establish_arc_consistency, incoming_arcs, SlotArc,
};
use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};
use crate::CHECK_INVARIANTS;

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// Which arcs to check after each tentative choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Start from the arcs pointing at the slot that was just filled.
    #[default]
    Scoped,

    /// Start from every arc in the grid.
    Global,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FillOptions {
    pub propagation: Propagation,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// How many times we picked a slot to fill.
    pub states: u64,

    /// How many tentative choices we had to undo.
    pub backtracks: u64,

    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FillFailure {
    #[error("no complete, consistent fill exists for this grid and word list")]
    Unsatisfiable,
}

/// Does the assignment (indexed by slot id) give every slot a word?
pub fn assignment_complete(config: &GridConfig, assignment: &[Option<WordId>]) -> bool {
    assignment.len() == config.slot_count() && assignment.iter().all(Option::is_some)
}

/// Does every assigned word fit its slot, and do assigned words agree wherever their slots cross?
/// This checks every assigned slot on each call.
pub fn is_consistent(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &[Option<WordId>],
) -> bool {
    let assigned_word = |slot_id: SlotId| assignment.get(slot_id).copied().flatten();

    for slot_config in &config.slot_configs {
        let Some(word_id) = assigned_word(slot_config.id) else {
            continue;
        };
        let word = &word_list.words[word_id];

        if word.len() != slot_config.length {
            return false;
        }

        for (cell_idx, crossing) in slot_config.crossings.iter().enumerate() {
            let Some(crossing) = crossing else {
                continue;
            };
            let Some(other_word_id) = assigned_word(crossing.other_slot_id) else {
                continue;
            };

            let other_glyph = word_list.words[other_word_id]
                .glyphs
                .get(crossing.other_slot_cell);
            if word.glyphs.get(cell_idx) != other_glyph {
                return false;
            }
        }
    }

    true
}

/// Choose the unassigned slot with the fewest remaining options, breaking ties first by number of
/// crossings (more is better) and then by slot id. Returns `None` once every slot is assigned.
pub fn select_unassigned_slot(
    config: &GridConfig,
    domains: &Domains,
    assignment: &[Option<WordId>],
) -> Option<SlotId> {
    config
        .slot_configs
        .iter()
        .filter(|slot_config| assignment[slot_config.id].is_none())
        .min_by_key(|slot_config| {
            (
                domains.len(slot_config.id),
                Reverse(slot_config.neighbors.len()),
            )
        })
        .map(|slot_config| slot_config.id)
}

/// Return the slot's remaining options, ordered by how many options each one would rule out for
/// crossing slots that are still unassigned (fewest first). Ties keep word id order.
pub fn order_domain_values(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    assignment: &[Option<WordId>],
    slot_id: SlotId,
) -> Vec<WordId> {
    let slot_config = &config.slot_configs[slot_id];
    let mut options: Vec<WordId> = domains.iter(slot_id).collect();

    options.sort_by_cached_key(|&word_id| {
        let word = &word_list.words[word_id];

        slot_config
            .crossings
            .iter()
            .enumerate()
            .filter_map(|(cell_idx, crossing)| Some((cell_idx, crossing.as_ref()?)))
            .filter(|(_, crossing)| assignment[crossing.other_slot_id].is_none())
            .map(|(cell_idx, crossing)| {
                let glyph = word.glyphs.get(cell_idx);

                domains
                    .iter(crossing.other_slot_id)
                    .filter(|&other_word_id| {
                        word_list.words[other_word_id]
                            .glyphs
                            .get(crossing.other_slot_cell)
                            != glyph
                    })
                    // bit_set::Iter under-reports its size_hint upper bound, which
                    // Filter::count trusts.
                    .fold(0, |count, _| count + 1)
            })
            .sum::<usize>()
    });

    options
}

/// The state of a single fill operation: the domain store and the assignment built up so far.
#[derive(Debug)]
pub struct Filler<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    options: FillOptions,
    domains: Domains,
    assignment: Vec<Option<WordId>>,
    statistics: Statistics,
}

impl<'a> Filler<'a> {
    /// Start with every word as an option for every slot and nothing assigned.
    pub fn new(
        config: &'a GridConfig,
        word_list: &'a WordList,
        options: FillOptions,
    ) -> Filler<'a> {
        Filler {
            config,
            word_list,
            options,
            domains: Domains::new(config.slot_count(), word_list.len()),
            assignment: vec![None; config.slot_count()],
            statistics: Statistics::default(),
        }
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    pub fn assignment(&self) -> &[Option<WordId>] {
        &self.assignment
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn enforce_node_consistency(&mut self) {
        enforce_node_consistency(self.config, self.word_list, &mut self.domains);
    }

    pub fn establish_arc_consistency(&mut self, arcs: Option<Vec<SlotArc>>) -> bool {
        establish_arc_consistency(self.config, self.word_list, &mut self.domains, arcs)
    }

    /// Enforce node and arc consistency, then search for a complete assignment.
    pub fn solve(&mut self) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();

        self.enforce_node_consistency();
        let consistent = self.establish_arc_consistency(None);

        // Nothing before this point is ever undone.
        self.domains.commit();

        debug!(
            "Initial consistency pass done: {} slots, options per slot {:?}",
            self.config.slot_count(),
            (0..self.config.slot_count())
                .map(|slot_id| self.domains.len(slot_id))
                .collect::<Vec<_>>()
        );

        let found = consistent && self.backtrack();
        self.statistics.duration = start.elapsed();

        debug!("Search finished (found: {found}): {:?}", self.statistics);

        if !found {
            return Err(FillFailure::Unsatisfiable);
        }

        let choices = self
            .assignment
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word_id)| Some(Choice { slot_id, word_id: (*word_id)? }))
            .collect();

        Ok(FillSuccess {
            statistics: self.statistics.clone(),
            choices,
        })
    }

    /// Extend the current assignment to a complete one if possible. On failure the assignment
    /// and domains are left as they were on entry.
    fn backtrack(&mut self) -> bool {
        if assignment_complete(self.config, &self.assignment) {
            return true;
        }

        let Some(slot_id) = select_unassigned_slot(self.config, &self.domains, &self.assignment)
        else {
            return true;
        };
        self.statistics.states += 1;

        let ordered_options = order_domain_values(
            self.config,
            self.word_list,
            &self.domains,
            &self.assignment,
            slot_id,
        );

        ordered_options
            .into_iter()
            .any(|word_id| self.try_choice(slot_id, word_id))
    }

    /// Tentatively fill `slot_id` with `word_id`, propagate, and recurse. If that doesn't lead to a
    /// complete assignment, undo the choice and every domain change made under it.
    fn try_choice(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.assignment[slot_id] = Some(word_id);
        if !is_consistent(self.config, self.word_list, &self.assignment) {
            self.assignment[slot_id] = None;
            return false;
        }

        trace!(
            "Trying {} in slot {}",
            self.word_list.words[word_id].string,
            slot_id
        );

        let checkpoint = self.domains.checkpoint();
        let snapshot = CHECK_INVARIANTS.then(|| self.domains.snapshot());

        self.domains.retain(slot_id, |option| option == word_id);
        let arcs = match self.options.propagation {
            Propagation::Scoped => Some(incoming_arcs(self.config, slot_id)),
            Propagation::Global => None,
        };

        if self.establish_arc_consistency(arcs) && self.backtrack() {
            return true;
        }

        self.statistics.backtracks += 1;
        self.domains.rollback(checkpoint);
        self.assignment[slot_id] = None;

        if let Some(snapshot) = snapshot {
            if snapshot != self.domains.snapshot() {
                panic!("Domains not restored after backtracking slot {slot_id}");
            }
        }

        false
    }
}

/// Search for a valid fill for the given grid, using the default options.
pub fn find_fill(config: &GridConfig, word_list: &WordList) -> Result<FillSuccess, FillFailure> {
    find_fill_with_options(config, word_list, FillOptions::default())
}

/// Search for a valid fill for the given grid.
pub fn find_fill_with_options(
    config: &GridConfig,
    word_list: &WordList,
    options: FillOptions,
) -> Result<FillSuccess, FillFailure> {
    Filler::new(config, word_list, options).solve()
}
