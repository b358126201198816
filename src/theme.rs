use ratatui::style::Color;

/// Fixed Catppuccin Mocha palette.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub bg:            Color,
    pub bg2:           Color,
    pub popup_bg:      Color,
    pub border:        Color,
    pub border_active: Color,
    pub fg:            Color,
    pub fg_dim:        Color,
    pub accent:        Color,
    pub weekend:       Color,
    pub success:       Color,
    pub error:         Color,
    pub today:         (Color, Color),
    pub selected:      (Color, Color),
}

pub fn hex_to_color(hex: &str) -> Color {
    let h = hex.trim_start_matches('#');
    if h.len() != 6 { return Color::Reset; }
    let r = u8::from_str_radix(&h[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&h[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&h[4..6], 16).unwrap_or(0);
    Color::Rgb(r, g, b)
}

impl Default for Theme {
    fn default() -> Self {
        let c = hex_to_color;
        Self {
            bg:            c("#1e1e2e"),
            bg2:           c("#181825"),
            popup_bg:      c("#313244"),
            border:        c("#45475a"),
            border_active: c("#89b4fa"),
            fg:            c("#cdd6f4"),
            fg_dim:        c("#6c7086"),
            accent:        c("#89b4fa"),
            weekend:       c("#f38ba8"),
            success:       c("#a6e3a1"),
            error:         c("#f38ba8"),
            today:         (c("#cba6f7"), c("#1e1e2e")),
            selected:      (c("#89b4fa"), c("#1e1e2e")),
        }
    }
}
