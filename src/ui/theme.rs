//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Magenta bars and symbols, green on submit
#[derive(Debug, Clone, Default)]
pub struct TfsTheme;

impl cliclack::Theme for TfsTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().magenta(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().magenta().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().magenta(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install [`TfsTheme`] for every later prompt
pub fn init_theme() {
    cliclack::set_theme(TfsTheme);
}
