//! Line accumulation for the interactive prompt.

use log::debug;

/// Deepest brace nesting the prompt will accumulate.
pub const MAX_BRACE_DEPTH: usize = 255;

/// What the prompt should do with the line just entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Clear,
    /// Braces are still open; keep reading.
    Incomplete,
    /// A complete chunk of source, ready to run.
    Source(String),
    /// The buffered input was discarded.
    Rejected(String),
}

/// Collects lines until the braces balance.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
    depth: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_continuing(&self) -> bool {
        self.depth > 0
    }

    pub fn push(&mut self, line: &str) -> Command {
        let line: &str = line.trim();

        match line {
            "" if self.depth == 0 => return Command::Incomplete,
            "quit" => return Command::Quit,
            "clear" => {
                self.reset();
                return Command::Clear;
            }
            _ => {}
        }

        for c in line.chars() {
            match c {
                '{' => self.depth += 1,
                '}' => match self.depth.checked_sub(1) {
                    Some(depth) => self.depth = depth,
                    None => {
                        self.reset();
                        return Command::Rejected("Unmatched '}'.".to_owned());
                    }
                },
                _ => {}
            }
        }

        if self.depth > MAX_BRACE_DEPTH {
            self.reset();
            return Command::Rejected(format!(
                "Brace depth over {} is not supported.",
                MAX_BRACE_DEPTH
            ));
        }

        if !self.pending.is_empty() {
            self.pending.push('\n');
        }
        self.pending.push_str(line);

        if self.depth > 0 {
            debug!("Waiting for {} closing brace(s)", self.depth);
            return Command::Incomplete;
        }

        let mut source: String = std::mem::take(&mut self.pending);

        if !source.ends_with(';') && !source.ends_with('}') {
            source.push(';');
        }

        Command::Source(source)
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.depth = 0;
    }
}
