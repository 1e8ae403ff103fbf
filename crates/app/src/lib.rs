#![warn(clippy::pedantic)]

mod autosave;
mod config;
mod controller;

pub use autosave::{Autosave, SaveAck};
pub use config::AutosaveConfig;
pub use controller::Controller;
