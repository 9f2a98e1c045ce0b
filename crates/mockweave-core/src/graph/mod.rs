pub mod cycle;
pub mod dag;
pub mod resolve;
pub mod topo;
pub mod visualize;
