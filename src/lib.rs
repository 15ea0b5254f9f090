//! Fill a crossword grid from a word list by treating it as a constraint satisfaction problem:
//! each slot is a variable, its domain is the words that could go there, and crossing slots must
//! agree on their shared letter.
//!
//! ```
//! use crossfill::backtracking_search::find_fill;
//! use crossfill::grid_config::{generate_grid_config_from_template_string, render_grid};
//! use crossfill::word_list::WordList;
//!
//! let config = generate_grid_config_from_template_string("___\n_##").unwrap();
//! let word_list = WordList::new(["cat", "ox", "co"]);
//!
//! let result = find_fill(&config, &word_list).unwrap();
//! assert_eq!(render_grid(&config, &word_list, &result.choices), "CAT\nO██");
//! ```

pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod errors;
pub mod grid_config;
pub mod logging;
pub mod word_list;

/// Verify after every failed branch that the domains were restored exactly. Slow; always on in
/// tests.
pub const CHECK_INVARIANTS: bool = cfg!(any(test, feature = "check_invariants"));

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
