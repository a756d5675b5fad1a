// colour themes for the tui

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Dark,
    Light,
    Nord,
    CatppuccinMocha,
    RosePineDawn,
}

impl ThemeKind {
    pub const ALL: &'static [ThemeKind] = &[
        Self::Dark,
        Self::Light,
        Self::Nord,
        Self::CatppuccinMocha,
        Self::RosePineDawn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Nord => "nord",
            Self::CatppuccinMocha => "catppuccin mocha",
            Self::RosePineDawn => "rose pine dawn",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }
}

/// Picks light or dark from the terminal background, dark when unknown.
pub fn detect_theme() -> ThemeKind {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => ThemeKind::Light,
        _ => ThemeKind::Dark,
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub border: Color,
    pub selection: Color,
    pub error: Color,
    pub success: Color,
    pub warning: Color,
    pub muted: Color,
    pub heart: Color,
}

impl Theme {
    pub fn from_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self {
                bg: Color::Rgb(20, 20, 30),
                fg: Color::Rgb(220, 220, 230),
                accent: Color::Rgb(100, 150, 255),
                border: Color::Rgb(60, 60, 80),
                selection: Color::Rgb(50, 50, 70),
                error: Color::Rgb(255, 100, 100),
                success: Color::Rgb(100, 255, 150),
                warning: Color::Rgb(255, 200, 100),
                muted: Color::Rgb(120, 120, 140),
                heart: Color::Rgb(255, 120, 160),
            },
            ThemeKind::Light => Self {
                bg: Color::Rgb(250, 250, 252),
                fg: Color::Rgb(30, 30, 40),
                accent: Color::Rgb(50, 100, 200),
                border: Color::Rgb(200, 200, 210),
                selection: Color::Rgb(230, 240, 255),
                error: Color::Rgb(200, 50, 50),
                success: Color::Rgb(50, 150, 80),
                warning: Color::Rgb(200, 150, 50),
                muted: Color::Rgb(140, 140, 150),
                heart: Color::Rgb(210, 60, 110),
            },
            ThemeKind::Nord => Self {
                bg: Color::Rgb(46, 52, 64),
                fg: Color::Rgb(236, 239, 244),
                accent: Color::Rgb(136, 192, 208),
                border: Color::Rgb(67, 76, 94),
                selection: Color::Rgb(67, 76, 94),
                error: Color::Rgb(191, 97, 106),
                success: Color::Rgb(163, 190, 140),
                warning: Color::Rgb(235, 203, 139),
                muted: Color::Rgb(76, 86, 106),
                heart: Color::Rgb(180, 142, 173),
            },
            ThemeKind::CatppuccinMocha => Self {
                bg: Color::Rgb(30, 30, 46),
                fg: Color::Rgb(205, 214, 244),
                accent: Color::Rgb(180, 190, 254),
                border: Color::Rgb(49, 50, 68),
                selection: Color::Rgb(69, 71, 90),
                error: Color::Rgb(243, 139, 168),
                success: Color::Rgb(166, 227, 161),
                warning: Color::Rgb(249, 226, 175),
                muted: Color::Rgb(166, 173, 200),
                heart: Color::Rgb(245, 194, 231),
            },
            ThemeKind::RosePineDawn => Self {
                bg: Color::Rgb(250, 244, 237),
                fg: Color::Rgb(87, 82, 121),
                accent: Color::Rgb(144, 122, 169),
                border: Color::Rgb(242, 233, 225),
                selection: Color::Rgb(223, 218, 217),
                error: Color::Rgb(180, 99, 122),
                success: Color::Rgb(86, 148, 159),
                warning: Color::Rgb(234, 157, 52),
                muted: Color::Rgb(152, 147, 165),
                heart: Color::Rgb(215, 130, 126),
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn heart(&self) -> Style {
        Style::default().fg(self.heart)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    // the safety banner has to stand out in every palette
    pub fn crisis(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.error)
            .add_modifier(Modifier::BOLD)
    }
}
