//! Session configuration, passed once at construction and immutable after.

use serde::{Deserialize, Serialize};

/// Window hint bits as the renderer surface expects them.
pub const HINT_BORDERLESS: u32 = 1;
pub const HINT_TILTED: u32 = 2;
pub const HINT_RESIZABLE: u32 = 4;
pub const HINT_MAXIMIZABLE: u32 = 8;

/// Configurable controls for a session's renderer surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,

    #[serde(default)]
    pub resizable: bool,
    #[serde(default)]
    pub borderless: bool,
    #[serde(default)]
    pub tilted: bool,
    #[serde(default)]
    pub maximizable: bool,
}

impl Config {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            x: 0,
            y: 0,
            resizable: false,
            borderless: false,
            tilted: false,
            maximizable: false,
        }
    }

    /// Collapse the hint flags into the surface bitset.
    pub fn hint_bits(&self) -> u32 {
        let mut hints = 0;
        if self.borderless {
            hints |= HINT_BORDERLESS;
        }
        if self.tilted {
            hints |= HINT_TILTED;
        }
        if self.resizable {
            hints |= HINT_RESIZABLE;
        }
        if self.maximizable {
            hints |= HINT_MAXIMIZABLE;
        }
        hints
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("prism", 800, 600)
    }
}
