use std::time::Duration;

/// Per‑session interpreter switches.  Everything defaults to off.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Make `#expr` print an inspection block and evaluate to `true`.
    pub introspection: bool,

    /// Abort a single loop that runs longer than this.
    pub loop_timeout: Option<Duration>,

    /// Echo every diagnostic to stderr as it is reported.
    pub echo_diagnostics: bool,
}

impl Config {
    pub fn with_introspection(mut self, enabled: bool) -> Self {
        self.introspection = enabled;
        self
    }

    pub fn with_loop_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.loop_timeout = timeout;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_diagnostics = echo;
        self
    }
}
