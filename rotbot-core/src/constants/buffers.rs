//! Capacities of Heap-Free Tables
//!
//! The classifier keeps its tables in fixed-size `heapless` collections so the
//! whole configuration sits in static RAM on the controller.

/// Maximum boundaries per dimension.
///
/// Four boundaries plus the above-maximum sentinel gives five buckets, which is
/// what the deployed tables use. Eight leaves room to refine.
pub const MAX_BOUNDARIES: usize = 8;

/// Maximum rules in one state's rule-set.
///
/// The full cross product of three 5-bucket dimensions is 125 triples; no
/// single state ever needs more than half of them.
///
/// 64 triples × 24 bytes = ~1.5KB per state.
pub const MAX_RULES_PER_STATE: usize = 64;

