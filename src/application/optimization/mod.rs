// Walk-forward simulation and batch runs
pub mod parallel_benchmark;
pub mod simulator;
