mod aggregate;
pub mod narration;


pub use aggregate::{Timeline, aggregate};
pub use narration::{StepText, step_texts};
