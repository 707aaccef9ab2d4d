//! Terminal cursor utility helpers for composing ANSI sequences.
//!
//! Coordinates handed to these helpers are 0-based surface cells; the
//! conversion to the terminal's 1-based addressing happens here.

const CSI: &str = "\x1b[";

/// Move the cursor to the 0-based surface cell (`x`, `y`).
pub fn move_to(x: u32, y: u32) -> String {
    format!("{CSI}{};{}H", y.saturating_add(1), x.saturating_add(1))
}

/// Clear the whole screen without moving the cursor.
pub fn clear_screen() -> &'static str {
    "\x1b[2J"
}

/// Reverse video on, used for debug outlines.
pub fn reverse_on() -> &'static str {
    "\x1b[7m"
}

/// Reset every graphic attribute.
pub fn reset_attributes() -> &'static str {
    "\x1b[0m"
}
