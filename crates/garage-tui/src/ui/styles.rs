use ratatui::style::{Color, Modifier, Style};

use garage_core::services::Theme;

/// Colors for one theme. Style helpers are methods so every render
/// function picks up the active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub error: Color,
    pub muted: Color,
    pub highlight: Color,
    pub text: Color,
    pub status_bg: Color,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        primary: Color::Rgb(37, 99, 235),
        secondary: Color::Rgb(22, 163, 74),
        accent: Color::Rgb(202, 138, 4),
        error: Color::Rgb(220, 38, 38),
        muted: Color::Rgb(107, 114, 128),
        highlight: Color::Rgb(219, 234, 254),
        text: Color::Rgb(17, 24, 39),
        status_bg: Color::Rgb(229, 231, 235),
    };

    pub const DARK: Palette = Palette {
        primary: Color::Rgb(64, 128, 192),
        secondary: Color::Rgb(96, 160, 96),
        accent: Color::Rgb(192, 160, 64),
        error: Color::Rgb(192, 64, 64),
        muted: Color::Rgb(128, 128, 128),
        highlight: Color::Rgb(48, 48, 64),
        text: Color::White,
        status_bg: Color::Rgb(32, 32, 40),
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::LIGHT,
            Theme::Dark => Self::DARK,
        }
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn tab_style(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(self.primary)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            self.muted_style()
        }
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.primary)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn search_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().bg(self.status_bg).fg(self.text)
    }

    pub fn help_key_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn help_desc_style(&self) -> Style {
        self.text_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_follows_theme() {
        assert_eq!(Palette::for_theme(Theme::Light), Palette::LIGHT);
        assert_eq!(Palette::for_theme(Theme::Dark), Palette::DARK);
        assert_ne!(Palette::LIGHT.text, Palette::DARK.text);
    }
}
