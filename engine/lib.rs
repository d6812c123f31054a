pub mod bridge;
pub mod harmonize;
pub mod interpret;
pub mod library;
pub mod pipeline;
pub mod prior;
pub mod prob;
pub mod risk;
pub mod types;
pub mod update;
