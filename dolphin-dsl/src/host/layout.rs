//! Auto-height sizing.

use crate::config::EditorHeight;

/// Room left for the horizontal scrollbar.
pub const SCROLLBAR_HEIGHT: u32 = 16;

/// Height before any content has been measured: `min`, or one line.
pub fn initial_height(height: EditorHeight, line_height: u32) -> u32 {
    match height {
        EditorHeight::Auto { min, .. } => min.unwrap_or(line_height),
        EditorHeight::Fixed { pixels } => pixels,
    }
}

/// Widget height for a measured content height. The bounds apply to the
/// content height, not to the padded one.
pub fn compute_height(height: EditorHeight, content_height: u32) -> u32 {
    match height {
        EditorHeight::Fixed { pixels } => pixels,
        EditorHeight::Auto { min, max } => {
            let mut result = content_height.saturating_add(SCROLLBAR_HEIGHT);
            if let Some(min) = min {
                if content_height < min {
                    result = min;
                }
            }
            if let Some(max) = max {
                if content_height > max {
                    result = max;
                }
            }
            result
        }
    }
}
