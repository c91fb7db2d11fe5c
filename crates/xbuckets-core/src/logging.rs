//! Leveled logging capability handed to the function on every call.
//!
//! The function never reaches for a global logger. Callers pass a
//! [`Logger`]: the server uses [`TracingLogger`], tests use [`NopLogger`].

use std::fmt;

/// Key/value pairs attached to a log line.
pub type Fields<'a> = &'a [(&'a str, &'a str)];

pub trait Logger: Send + Sync {
    fn debug(&self, msg: &str, fields: Fields<'_>);
    fn info(&self, msg: &str, fields: Fields<'_>);
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn debug(&self, _msg: &str, _fields: Fields<'_>) {}
    fn info(&self, _msg: &str, _fields: Fields<'_>) {}
}

/// Forwards messages as `tracing` events.
///
/// Fields given to [`TracingLogger::with_values`] are attached to every
/// event, followed by the per-call fields.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    values: Vec<(String, String)>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(mut self, fields: Fields<'_>) -> Self {
        self.values
            .extend(fields.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }
}

impl Logger for TracingLogger {
    fn debug(&self, msg: &str, fields: Fields<'_>) {
        tracing::debug!(target: "xbuckets", fields = %KeyValues(&self.values, fields), "{msg}");
    }

    fn info(&self, msg: &str, fields: Fields<'_>) {
        tracing::info!(target: "xbuckets", fields = %KeyValues(&self.values, fields), "{msg}");
    }
}

/// Renders `k=v` pairs separated by spaces.
struct KeyValues<'a>(&'a [(String, String)], Fields<'a>);

impl fmt::Display for KeyValues<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self
            .0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(self.1.iter().copied());
        for (i, (k, v)) in pairs.enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}
