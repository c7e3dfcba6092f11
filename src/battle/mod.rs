pub mod ai;
pub mod engine;
pub mod runner;
pub mod state;
pub mod stats;
pub mod triggers;

#[cfg(test)]
mod tests;
