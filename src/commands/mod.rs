//! One function per subcommand. Each returns an [`Out`] that `main` prints.

mod auth;
mod dashboard;
mod init;
mod record;
mod serve;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use auth::{auth, auth_verify};
pub use dashboard::dashboard;
pub use init::init;
pub use record::record;
pub use serve::serve;

/// What a command reports back: a line for the user and, for some commands, the data behind it.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    message: String,
    structure: Option<T>,
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    pub fn new(message: impl Into<String>, structure: T) -> Self {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// The message goes to `info!`. The data, when present, is dumped as JSON at `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        let Some(structure) = &self.structure else {
            return;
        };
        match serde_json::to_string_pretty(structure) {
            Ok(json) => debug!("Command output:\n{json}"),
            Err(e) => warn!("Unable to serialize the command output: {e}"),
        }
    }
}

impl<T, S> From<S> for Out<T>
where
    T: Serialize + Clone + Debug,
    S: Into<String>,
{
    fn from(message: S) -> Self {
        Out::message_only(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_from_message() {
        let out: Out<u32> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());

        let out = Out::new("three", 3u32);
        assert_eq!(out.structure(), Some(&3));
    }
}
