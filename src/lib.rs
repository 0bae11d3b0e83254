mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod form;
pub mod ledger;
pub mod model;
mod utils;
mod web;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::Config;
pub use error::{Error, Field, Result, SubmissionError};
