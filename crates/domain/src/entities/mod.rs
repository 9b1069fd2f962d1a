pub mod position;

// Re-export for easier access
pub use position::{EventKey, Position, PositionRow, TokenSymbols};
