pub mod candidates;
pub mod items;
pub mod mining;
pub mod rules;
pub mod storage;


pub use items::{is_subset, ItemTable, TransactionSet};
pub use mining::mine;
pub use rules::{generate_rules, rank_rules, top_by_lift, Rule};
pub use storage::{FrequentItemsets, FrequentLevel, ItemsetStorage};
