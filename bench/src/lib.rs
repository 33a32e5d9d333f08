pub mod args;
pub mod bench_error;
pub mod benchmark;
pub mod client;
pub mod report;
pub mod statistics;
