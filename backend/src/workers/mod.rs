pub mod orphan_sweep;

pub use orphan_sweep::orphan_sweep_worker;
