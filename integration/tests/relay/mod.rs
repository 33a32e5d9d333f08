mod benchmark_scenario;
mod delivery_failure_scenario;
mod reflection_scenario;
mod worker_scenario;
