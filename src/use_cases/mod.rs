mod chat;
mod confirm;
mod duel;
mod engine;
mod exit;
mod readiness;
mod seats;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{EngineSettings, SessionEngine};
