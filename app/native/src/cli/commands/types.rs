//! Shared types for CLI commands.

use clap::ValueEnum;

use crate::desktop::LayoutMode;

/// Layout mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliLayoutMode {
    /// Maximize a window on its monitor.
    Maximize,
    /// Minimize the windows.
    Minimize,
    /// Restore the windows to their normal state.
    Restore,
    /// Cover the whole monitor, taskbar included, and stay on top.
    Fullscreen,
    /// Left half of the work area.
    SnapLeft,
    /// Right half of the work area.
    SnapRight,
    /// Side-by-side columns of equal width.
    SplitHorizontal,
    /// Stacked rows of equal height.
    SplitVertical,
    /// Keep the size and center in the work area.
    Center,
}

impl From<CliLayoutMode> for LayoutMode {
    fn from(mode: CliLayoutMode) -> Self {
        match mode {
            CliLayoutMode::Maximize => Self::Maximize,
            CliLayoutMode::Minimize => Self::Minimize,
            CliLayoutMode::Restore => Self::Restore,
            CliLayoutMode::Fullscreen => Self::Fullscreen,
            CliLayoutMode::SnapLeft => Self::SnapLeft,
            CliLayoutMode::SnapRight => Self::SnapRight,
            CliLayoutMode::SplitHorizontal => Self::SplitHorizontal,
            CliLayoutMode::SplitVertical => Self::SplitVertical,
            CliLayoutMode::Center => Self::Center,
        }
    }
}

/// Parses a volume level in `[0.0, 1.0]`.
///
/// # Errors
///
/// Returns an error message for non-numeric or out-of-range values.
pub fn parse_volume(value: &str) -> Result<f32, String> {
    let volume: f32 =
        value.trim().parse().map_err(|_| format!("Invalid volume '{value}'. Expected 0.0 to 1.0."))?;
    if (0.0..=1.0).contains(&volume) {
        Ok(volume)
    } else {
        Err(format!("Volume {volume} is out of range. Expected 0.0 to 1.0."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_cli_mode_maps_to_layout_mode() {
        for mode in CliLayoutMode::value_variants() {
            let name = mode.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(LayoutMode::from(*mode).as_str(), name);
        }
        assert_eq!(CliLayoutMode::value_variants().len(), LayoutMode::ALL.len());
    }

    #[test]
    fn test_parse_volume() {
        assert!((parse_volume("0.25").unwrap() - 0.25).abs() < f32::EPSILON);
        assert!(parse_volume("1").is_ok());
        assert!(parse_volume("1.5").unwrap_err().contains("out of range"));
        assert!(parse_volume("loud").unwrap_err().contains("Invalid volume"));
    }
}
