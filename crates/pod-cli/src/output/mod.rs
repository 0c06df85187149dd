//! Terminal output shared by all commands.

pub mod colors;
pub mod errors;

use colors::ColorSupport;

/// Consistent terminal formatting for command output
pub struct OutputHandler {
    colors: ColorSupport,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    /// Handler that never emits escape codes
    pub fn plain() -> Self {
        Self {
            colors: ColorSupport::disabled(),
        }
    }

    pub fn info(&self, message: &str) {
        println!("{}", message);
    }

    /// Secondary detail, indented under the previous line
    pub fn detail(&self, message: &str) {
        println!("  {}", self.colors.dim(message));
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("!"), message);
    }

    /// Heading for one phase of a command
    pub fn step(&self, message: &str) {
        println!("{} {}", self.colors.bold("==>"), self.colors.bold(message));
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
