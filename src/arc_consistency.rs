//! This module implements node consistency (every candidate fits its slot's length) and arc
//! consistency (every candidate agrees with at least one candidate of each crossing slot) using
//! AC-3.

use log::trace;
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::WordList;

/// A directed constraint to check: the first slot's candidates need support from the second's.
pub type SlotArc = (SlotId, SlotId);

/// Remove every candidate whose length doesn't match its slot. This never fails; an emptied
/// domain is picked up by the arc consistency pass that follows.
pub fn enforce_node_consistency(config: &GridConfig, word_list: &WordList, domains: &mut Domains) {
    for slot_config in &config.slot_configs {
        let removed = domains.retain(slot_config.id, |word_id| {
            word_list.words[word_id].len() == slot_config.length
        });

        trace!(
            "Node consistency removed {} options from slot {}, leaving {}",
            removed,
            slot_config.id,
            domains.len(slot_config.id)
        );
    }
}

/// Every arc in the grid, i.e. (x, y) for each slot x and each neighbor y of x.
pub fn all_arcs(config: &GridConfig) -> Vec<SlotArc> {
    config
        .slot_configs
        .iter()
        .flat_map(|slot_config| {
            slot_config
                .neighbors
                .iter()
                .map(move |&neighbor| (slot_config.id, neighbor))
        })
        .collect()
}

/// The arcs that might stop holding when `slot_id`'s domain shrinks: (z, slot_id) for each of its
/// neighbors z.
pub fn incoming_arcs(config: &GridConfig, slot_id: SlotId) -> Vec<SlotArc> {
    config
        .neighbors(slot_id)
        .iter()
        .map(|&neighbor| (neighbor, slot_id))
        .collect()
}

/// Make slot `x` arc consistent with slot `y`, removing every candidate for `x` that has no
/// candidate for `y` with the same letter where they cross. Returns whether anything was
/// removed; slots that don't cross are left alone.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return false;
    };

    let supported_glyphs: HashSet<char> = domains
        .iter(y)
        .filter_map(|word_id| word_list.words[word_id].glyphs.get(y_cell).copied())
        .collect();

    let removed = domains.retain(x, |word_id| {
        word_list.words[word_id]
            .glyphs
            .get(x_cell)
            .is_some_and(|glyph| supported_glyphs.contains(glyph))
    });

    removed > 0
}

/// FIFO queue of arcs waiting to be revised. An arc that's already waiting isn't added twice.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<SlotArc>,
    pending: HashSet<SlotArc>,
}

impl ConsistencyQueue {
    fn with_initial_queue<Items>(items: Items) -> ConsistencyQueue
    where
        Items: IntoIterator<Item = SlotArc>,
    {
        let mut queue = ConsistencyQueue {
            queue: VecDeque::new(),
            pending: HashSet::new(),
        };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<SlotArc> {
        let arc = self.queue.pop_front()?;
        self.pending.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: SlotArc) {
        if self.pending.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Run AC-3 until no arc needs revising. If `arcs` is `None`, start from every arc in the grid;
/// otherwise start from just the given ones.
///
/// Returns false if any slot ends up with no candidates, true otherwise. The queue is always
/// drained, so an emptied domain also empties every domain that depended on it.
pub fn establish_arc_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<SlotArc>>,
) -> bool {
    let mut queue =
        ConsistencyQueue::with_initial_queue(arcs.unwrap_or_else(|| all_arcs(config)));
    let mut revisions = 0;

    while let Some((x, y)) = queue.pop_front() {
        if !revise(config, word_list, domains, x, y) {
            continue;
        }
        revisions += 1;

        if domains.is_empty(x) {
            trace!("Slot {x} has no options left after revising against slot {y}");
        }

        // Shrinking x may leave candidates of x's other neighbors without support.
        for &z in config.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    let consistent = !domains.any_empty();
    trace!("Arc consistency made {revisions} revisions; consistent: {consistent}");

    consistent
}
