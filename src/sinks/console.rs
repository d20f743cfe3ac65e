//! Console sink implementation

use crate::core::{LogLevel, Result, Sink};
use colored::Colorize;

pub struct ConsoleSink {
    use_colors: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn render(&self, level: LogLevel, line: &str) -> String {
        if self.use_colors {
            line.color(level.color_code()).to_string()
        } else {
            line.to_string()
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, level: LogLevel, line: &str) -> Result<()> {
        let output = self.render(level, line);

        // Exceptions go to stderr, everything else to stdout
        match level {
            LogLevel::Exception => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn end_cycle(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
