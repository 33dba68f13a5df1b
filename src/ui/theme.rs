//! cliclack theme keyed to the prune mode

use crate::cache::Mode;
use cliclack::ThemeState;
use console::Style;

/// Yellow accents for a dry run, red once files are really deleted
#[derive(Debug, Clone, Copy)]
pub struct PruneTheme {
    mode: Mode,
}

impl PruneTheme {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    fn accent(&self) -> Style {
        match self.mode {
            Mode::DryRun => Style::new().yellow(),
            Mode::Apply => Style::new().red(),
        }
    }
}

impl cliclack::Theme for PruneTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => self.accent(),
            ThemeState::Error(_) => Style::new().red().bold(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => self.accent().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => self.accent(),
            ThemeState::Error(_) => Style::new().red().bold(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install the theme for this run's mode
pub fn init_theme(mode: Mode) {
    cliclack::set_theme(PruneTheme::new(mode));
}
