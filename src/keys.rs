//! Terminal key constants.
//!
//! Keys arrive from the terminal as raw byte strings — escape sequences for
//! special keys, control bytes for Ctrl combinations, plain bytes (or UTF-8
//! sequences) for printable input. These constants are the recognized
//! dictionary; anything else is passed verbatim to the focused element.

// Basic keys
pub const SPACE: &str = " ";
pub const ENTER: &str = "\r";
pub const ENTER_LF: &str = "\n";
pub const TAB: &str = "\t";
pub const ESCAPE: &str = "\x1b";

// Editing keys
pub const BACKSPACE: &str = "\x7f";
pub const BACKSPACE_CTRL: &str = "\x08";
pub const DELETE: &str = "\x1b[3~";
pub const INSERT: &str = "\x1b[2~";

// Navigation keys
pub const LEFT: &str = "\x1b[D";
pub const RIGHT: &str = "\x1b[C";
pub const UP: &str = "\x1b[A";
pub const DOWN: &str = "\x1b[B";
pub const HOME: &str = "\x1b[H";
pub const HOME_ALT: &str = "\x1b[1~";
pub const END: &str = "\x1b[F";
pub const END_ALT: &str = "\x1b[4~";
pub const PAGE_UP: &str = "\x1b[5~";
pub const PAGE_DOWN: &str = "\x1b[6~";

// Shift combinations
pub const SHIFT_TAB: &str = "\x1b[Z";
pub const SHIFT_ENTER: &str = "\x1b[13;2u";
pub const SHIFT_UP: &str = "\x1b[1;2A";
pub const SHIFT_DOWN: &str = "\x1b[1;2B";
pub const SHIFT_LEFT: &str = "\x1b[1;2D";
pub const SHIFT_RIGHT: &str = "\x1b[1;2C";

// Alt combinations
pub const ALT_BACKSPACE: &str = "\x1b\x7f";
pub const ALT_LEFT: &str = "\x1bb";
pub const ALT_LEFT_CSI: &str = "\x1b[1;3D";
pub const ALT_RIGHT: &str = "\x1bf";
pub const ALT_RIGHT_CSI: &str = "\x1b[1;3C";
pub const ALT_UP: &str = "\x1b[1;3A";
pub const ALT_DOWN: &str = "\x1b[1;3B";

// Ctrl combinations
pub const CTRL_A: &str = "\x01";
pub const CTRL_B: &str = "\x02";
pub const CTRL_C: &str = "\x03";
pub const CTRL_D: &str = "\x04";
pub const CTRL_E: &str = "\x05";
pub const CTRL_F: &str = "\x06";
pub const CTRL_G: &str = "\x07";
pub const CTRL_H: &str = "\x08"; // same byte as BACKSPACE_CTRL
pub const CTRL_I: &str = "\x09"; // same byte as TAB
pub const CTRL_J: &str = "\x0a"; // same byte as ENTER_LF
pub const CTRL_K: &str = "\x0b";
pub const CTRL_L: &str = "\x0c";
pub const CTRL_M: &str = "\x0d"; // same byte as ENTER
pub const CTRL_N: &str = "\x0e";
pub const CTRL_O: &str = "\x0f";
pub const CTRL_P: &str = "\x10";
pub const CTRL_Q: &str = "\x11";
pub const CTRL_R: &str = "\x12";
pub const CTRL_S: &str = "\x13";
pub const CTRL_T: &str = "\x14";
pub const CTRL_U: &str = "\x15";
pub const CTRL_V: &str = "\x16";
pub const CTRL_W: &str = "\x17";
pub const CTRL_X: &str = "\x18";
pub const CTRL_Y: &str = "\x19";
pub const CTRL_Z: &str = "\x1a";

// Ctrl+Arrow combinations
pub const CTRL_UP: &str = "\x1b[1;5A";
pub const CTRL_DOWN: &str = "\x1b[1;5B";
pub const CTRL_LEFT: &str = "\x1b[1;5D";
pub const CTRL_RIGHT: &str = "\x1b[1;5C";

// Function keys
pub const F1: &str = "\x1bOP";
pub const F2: &str = "\x1bOQ";
pub const F3: &str = "\x1bOR";
pub const F4: &str = "\x1bOS";
pub const F5: &str = "\x1b[15~";
pub const F6: &str = "\x1b[17~";
pub const F7: &str = "\x1b[18~";
pub const F8: &str = "\x1b[19~";
pub const F9: &str = "\x1b[20~";
pub const F10: &str = "\x1b[21~";
pub const F11: &str = "\x1b[23~";
pub const F12: &str = "\x1b[24~";
