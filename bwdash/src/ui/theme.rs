//! Shared UI theme constants: the five-band palette and alert styling.

use ratatui::style::Color;

use crate::reconcile::ColorBand;

pub const IN_LINE: Color = Color::Cyan;
pub const OUT_LINE: Color = Color::Magenta;
pub const ALERT_FG: Color = Color::Black;
pub const ALERT_BG: Color = Color::Red;

pub fn band_color(band: ColorBand) -> Color {
    match band {
        ColorBand::Inactive => Color::DarkGray,
        ColorBand::Nominal => Color::Green,
        ColorBand::Elevated => Color::Yellow,
        ColorBand::High => Color::LightYellow,
        ColorBand::VeryHigh => Color::LightRed,
        ColorBand::Critical => Color::Red,
    }
}
