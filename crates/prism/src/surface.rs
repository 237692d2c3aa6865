//! The renderer-surface boundary.
//!
//! Window and overlay lifecycle live outside the bridge; the session only
//! needs somewhere to send the initial document URL and geometry changes.
//! Embedders supply a [`Surface`] wired to their native renderer;
//! [`HeadlessSurface`] is the default and is what tests run against.

use crate::config::Config;

/// The session's view of the native renderer surface.
pub trait Surface {
    /// Load the initial document.
    fn load_url(&mut self, url: &str);

    /// The native window changed size; resize the drawable area.
    fn resize(&mut self, width: u32, height: u32);

    /// Move the surface to the given coordinates.
    fn move_to(&mut self, x: i32, y: i32);
}

/// A surface with no renderer behind it. Records what it was asked to do.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    pub url: Option<String>,
    pub size: Option<(u32, u32)>,
    pub position: Option<(i32, i32)>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed geometry from a session config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            url: None,
            size: Some((config.width, config.height)),
            position: Some((config.x, config.y)),
        }
    }
}

impl Surface for HeadlessSurface {
    fn load_url(&mut self, url: &str) {
        log::debug!("headless surface loading {}", url);
        self.url = Some(url.to_string());
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = Some((width, height));
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.position = Some((x, y));
    }
}
