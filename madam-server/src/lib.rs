pub mod banner;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod net;
pub mod state;
pub mod util;

// Convenient re-exports (so call sites can do `madam_server::Registry`, etc.)
pub use commands::process_command;
pub use state::{
    registry::Registry,
    session::{Protocol, Session},
};
