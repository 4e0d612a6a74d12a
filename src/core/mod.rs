mod engine;
mod locator;
mod normalizer;
mod pretty;
mod differ;
mod report;

pub use locator::{Locator, PathPair};
pub use normalizer::Normalizer;
pub use differ::{DiffTool, Differ, ExternalDiffTool};
#[cfg(test)]
pub use differ::ToolOutput;
pub use report::{PairStatus, RunSummary};

// Export the main engine
pub use engine::Engine;
