//! Physical key code -> symbolic name mapping.
//!
//! Key codes are physical key positions (ANSI layout). The table covers the
//! main block (codes 0-62), F1-F12, and the arrow keys. `name_for` is total:
//! codes outside the table yield a synthetic `VK(<code>)` name so that every
//! key event stays representable as text even on unrecognised hardware.
//!
//! Codes 10 (ISO section key) and 52 (keypad Enter) are deliberately absent
//! from the table and take the synthetic path; their labels vary by layout.

/// Looks up the static name for a known physical key code.
///
/// Returns `None` for unmapped codes (media keys, keypad, ISO extras).
fn lookup(code: u16) -> Option<&'static str> {
    match code {
        // Main block, codes 0-50 in physical-position order.
        0 => Some("A"),
        1 => Some("S"),
        2 => Some("D"),
        3 => Some("F"),
        4 => Some("H"),
        5 => Some("G"),
        6 => Some("Z"),
        7 => Some("X"),
        8 => Some("C"),
        9 => Some("V"),
        11 => Some("B"),
        12 => Some("Q"),
        13 => Some("W"),
        14 => Some("E"),
        15 => Some("R"),
        16 => Some("Y"),
        17 => Some("T"),
        18 => Some("1"),
        19 => Some("2"),
        20 => Some("3"),
        21 => Some("4"),
        22 => Some("6"),
        23 => Some("5"),
        24 => Some("="),
        25 => Some("9"),
        26 => Some("7"),
        27 => Some("-"),
        28 => Some("8"),
        29 => Some("0"),
        30 => Some("]"),
        31 => Some("O"),
        32 => Some("U"),
        33 => Some("["),
        34 => Some("I"),
        35 => Some("P"),
        36 => Some("RETURN"),
        37 => Some("L"),
        38 => Some("J"),
        39 => Some("'"),
        40 => Some("K"),
        41 => Some(";"),
        42 => Some("\\"),
        43 => Some(","),
        44 => Some("/"),
        45 => Some("N"),
        46 => Some("M"),
        47 => Some("."),
        48 => Some("TAB"),
        49 => Some("SPACE"),
        50 => Some("`"),
        51 => Some("DELETE"), // Backspace on PC keyboards.
        53 => Some("ESCAPE"),

        // Modifiers: left and right variants carry distinct codes.
        54 => Some("RCOMMAND"),
        55 => Some("LCOMMAND"),
        56 => Some("LSHIFT"),
        57 => Some("CAPSLOCK"),
        58 => Some("LOPTION"),
        59 => Some("LCONTROL"),
        60 => Some("RSHIFT"),
        61 => Some("ROPTION"),
        62 => Some("RCONTROL"),

        // Function keys
        122 => Some("F1"),
        120 => Some("F2"),
        99 => Some("F3"),
        118 => Some("F4"),
        96 => Some("F5"),
        97 => Some("F6"),
        98 => Some("F7"),
        100 => Some("F8"),
        101 => Some("F9"),
        109 => Some("F10"),
        103 => Some("F11"),
        111 => Some("F12"),

        // Arrow keys
        123 => Some("LEFT_ARROW"),
        124 => Some("RIGHT_ARROW"),
        125 => Some("DOWN_ARROW"),
        126 => Some("UP_ARROW"),

        _ => None,
    }
}

/// Returns the symbolic name for a physical key code.
///
/// Total function: unmapped codes produce `"VK(<code>)"` rather than an
/// error, and two distinct unmapped codes never collide.
pub fn name_for(code: u16) -> String {
    match lookup(code) {
        Some(name) => name.to_owned(),
        None => format!("VK({code})"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
