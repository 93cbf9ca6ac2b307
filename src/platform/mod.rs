#[cfg(windows)]
pub mod win32;

use winit::dpi::PhysicalPosition;
use winit::window::Window;

/// Window placement as the mascot needs it from its host.
pub trait WindowHost {
    fn move_window(&self, x: i32, y: i32);
}

impl WindowHost for Window {
    fn move_window(&self, x: i32, y: i32) {
        self.set_outer_position(PhysicalPosition::new(x, y));
    }
}

/// Platform-specific styling for the borderless overlay window.
pub fn setup_overlay(window: &Window) {
    if let Err(e) = window.set_cursor_hittest(false) {
        log::warn!("click-through unavailable: {e}");
    }

    #[cfg(windows)]
    win32::setup_overlay(window);
}
