//! Ghost Trainer Session - Stage progression as a pure state machine
//!
//! A session is a single owned `SessionState` value. Every detection tick is
//! folded into it by `step`, which returns the next state and what the UI
//! should show. Nothing here reads a clock: time arrives with the tick.
//!
//! ```text
//!   Matching(s) --held > threshold for hold time--> Cooldown(s+1) --cooldown--> Matching(s+1)
//!        |                                                                          |
//!        +----------------------- last stage held ---------------------------> Complete
//! ```

pub mod machine;
pub mod operator;
pub mod state;

pub use machine::*;
pub use operator::*;
pub use state::*;
