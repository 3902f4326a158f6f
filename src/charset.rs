use clap::ValueEnum;
use serde::Deserialize;

pub const BRAILLE: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
pub const CLASSIC: [&str; 4] = ["|", "/", "-", "\\"];
pub const ARROWS: [&str; 8] = ["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"];
pub const CIRCLES: [&str; 4] = ["◐", "◓", "◑", "◒"];
pub const BLOCKS: [&str; 4] = ["▖", "▘", "▝", "▗"];

/// Named glyph sequences a spinner can animate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    #[default]
    Braille,
    Classic,
    Arrows,
    Circles,
    Blocks,
}

impl Charset {
    pub fn frames(self) -> &'static [&'static str] {
        match self {
            Charset::Braille => &BRAILLE,
            Charset::Classic => &CLASSIC,
            Charset::Arrows => &ARROWS,
            Charset::Circles => &CIRCLES,
            Charset::Blocks => &BLOCKS,
        }
    }

    pub fn glyphs(self) -> Vec<String> {
        self.frames().iter().map(|g| g.to_string()).collect()
    }
}
