use crate::selection::ActionVariant;
use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;

/// Named color schemes selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dracula,
    Solarized,
    Gruvbox,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dracula" => Ok(Theme::Dracula),
            "solarized" | "solarized_dark" => Ok(Theme::Solarized),
            "gruvbox" => Ok(Theme::Gruvbox),
            _ => Err(format!(
                "Unknown theme: {} (expected dracula, solarized or gruvbox)",
                s
            )),
        }
    }
}

impl Theme {
    pub fn config(self) -> ThemeConfig {
        match self {
            Theme::Dracula => dracula_theme(),
            Theme::Solarized => solarized_dark(),
            Theme::Gruvbox => gruvbox_theme(),
        }
    }
}

/// Styles for the action bar buttons, one per variant.
#[derive(Clone, Copy)]
pub struct ButtonStyles {
    pub primary: Style,
    pub secondary: Style,
    pub ghost: Style,
    pub danger: Style,
}

impl ButtonStyles {
    pub fn for_variant(&self, variant: ActionVariant) -> Style {
        match variant {
            ActionVariant::Primary => self.primary,
            ActionVariant::Secondary => self.secondary,
            ActionVariant::Ghost => self.ghost,
            ActionVariant::Danger => self.danger,
        }
    }
}

/// Complete theme configuration for ratatui
#[derive(Clone)]
pub struct ThemeConfig {
    pub row_normal: Style,
    /// Row holding keyboard focus.
    pub row_cursor: Style,
    /// Row that is part of the selection.
    pub row_marked: Style,
    pub header: Style,
    pub border: Style,
    pub border_selected: Style,
    pub title: Style,
    pub text: Style,
    pub buttons: ButtonStyles,
}

/// Returns a ThemeConfig based on the Dracula color palette.
pub fn dracula_theme() -> ThemeConfig {
    let bg = Color::Rgb(40, 42, 54);
    let selection = Color::Rgb(68, 71, 90);
    let fg = Color::Rgb(248, 248, 242);
    let comment = Color::Rgb(98, 114, 164);
    let purple = Color::Rgb(189, 147, 249);
    let green = Color::Rgb(80, 250, 123);
    let cyan = Color::Rgb(139, 233, 253);
    let red = Color::Rgb(255, 85, 85);

    ThemeConfig {
        row_normal: Style::default().fg(fg).bg(bg),
        row_cursor: Style::default()
            .fg(fg)
            .bg(selection)
            .add_modifier(Modifier::BOLD),
        row_marked: Style::default().fg(green),
        header: Style::default().fg(cyan).add_modifier(Modifier::BOLD),
        border: Style::default().fg(comment),
        border_selected: Style::default().fg(purple),
        title: Style::default().fg(purple).add_modifier(Modifier::BOLD),
        text: Style::default().fg(fg).bg(bg),
        buttons: ButtonStyles {
            primary: Style::default().fg(bg).bg(purple),
            secondary: Style::default().fg(bg).bg(cyan),
            ghost: Style::default().fg(comment),
            danger: Style::default().fg(bg).bg(red),
        },
    }
}

/// Returns a ThemeConfig based on the Solarized Dark color palette.
pub fn solarized_dark() -> ThemeConfig {
    let base03 = Color::Rgb(0, 43, 54);
    let base02 = Color::Rgb(7, 54, 66);
    let base01 = Color::Rgb(88, 110, 117);
    let base0 = Color::Rgb(131, 148, 150);
    let base3 = Color::Rgb(253, 246, 227);
    let red = Color::Rgb(220, 50, 47);
    let blue = Color::Rgb(38, 139, 210);
    let cyan = Color::Rgb(42, 161, 152);
    let green = Color::Rgb(133, 153, 0);

    ThemeConfig {
        row_normal: Style::default().fg(base0).bg(base02),
        row_cursor: Style::default()
            .fg(base3)
            .bg(blue)
            .add_modifier(Modifier::BOLD),
        row_marked: Style::default().fg(green),
        header: Style::default().fg(cyan).add_modifier(Modifier::BOLD),
        border: Style::default().fg(base01),
        border_selected: Style::default().fg(blue),
        title: Style::default().fg(blue).add_modifier(Modifier::BOLD),
        text: Style::default().fg(base0).bg(base02),
        buttons: ButtonStyles {
            primary: Style::default().fg(base3).bg(blue),
            secondary: Style::default().fg(base03).bg(cyan),
            ghost: Style::default().fg(base01),
            danger: Style::default().fg(base3).bg(red),
        },
    }
}

/// Returns a ThemeConfig based on the Gruvbox Dark color palette.
pub fn gruvbox_theme() -> ThemeConfig {
    let bg0 = Color::Rgb(40, 40, 40);
    let fg1 = Color::Rgb(235, 219, 178);
    let gray = Color::Rgb(146, 131, 116);
    let blue = Color::Rgb(69, 133, 136);
    let green = Color::Rgb(152, 151, 26);
    let orange = Color::Rgb(214, 93, 14);
    let red = Color::Rgb(204, 36, 29);
    let yellow = Color::Rgb(215, 153, 33);

    ThemeConfig {
        row_normal: Style::default().fg(fg1).bg(bg0),
        row_cursor: Style::default()
            .fg(bg0)
            .bg(fg1)
            .add_modifier(Modifier::BOLD),
        row_marked: Style::default().fg(green),
        header: Style::default().fg(yellow).add_modifier(Modifier::BOLD),
        border: Style::default().fg(gray),
        border_selected: Style::default().fg(orange),
        title: Style::default().fg(orange).add_modifier(Modifier::BOLD),
        text: Style::default().fg(fg1).bg(bg0),
        buttons: ButtonStyles {
            primary: Style::default().fg(bg0).bg(orange),
            secondary: Style::default().fg(bg0).bg(blue),
            ghost: Style::default().fg(gray),
            danger: Style::default().fg(fg1).bg(red),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_str() {
        assert_eq!(Theme::from_str("Dracula"), Ok(Theme::Dracula));
        assert_eq!(Theme::from_str("solarized_dark"), Ok(Theme::Solarized));
        assert!(Theme::from_str("neon").is_err());
    }

    #[test]
    fn test_button_style_per_variant() {
        let config = Theme::Gruvbox.config();
        assert_eq!(
            config.buttons.for_variant(ActionVariant::Danger),
            config.buttons.danger
        );
        assert_ne!(
            config.buttons.for_variant(ActionVariant::Primary),
            config.buttons.ghost
        );
    }
}
