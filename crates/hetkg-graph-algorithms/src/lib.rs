pub mod common;
pub mod traversal;

pub use common::{EdgeIndex, GraphView, NodeIndex};
pub use traversal::{k_hop, k_hop_bidirectional, Direction};
