pub mod app;
pub mod charset;
pub mod config;
pub mod signal;
pub mod spinner;
pub mod term;

pub use charset::Charset;
pub use spinner::{Spinner, SpinnerBuilder};
pub use term::{SharedBuffer, Sink};
