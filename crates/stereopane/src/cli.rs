use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renderer::{Antialiasing, ColorSpaceMode, HeadsetKind};
use viewconfig::PlacementSetting;

#[derive(Parser, Debug)]
#[command(
    name = "stereopane",
    author,
    version,
    about = "Stereo image pair viewer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Image shown to the left eye.
    #[arg(value_name = "LEFT")]
    pub left: Option<PathBuf>,

    /// Image shown to the right eye.
    #[arg(value_name = "RIGHT")]
    pub right: Option<PathBuf>,

    /// Read settings from this file instead of the per-user config file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Panel width in metres.
    #[arg(long, value_name = "METRES")]
    pub width: Option<f32>,

    /// Distance from the viewer to the panel in metres.
    #[arg(long, value_name = "METRES")]
    pub distance: Option<f32>,

    /// Panel placement while presenting: `world` (anchored) or `head` (locked).
    #[arg(long, value_name = "MODE", value_parser = parse_placement)]
    pub placement: Option<PlacementSetting>,

    /// Window size (e.g. `1600x900`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_color_space,
        default_value = "auto"
    )]
    pub color_space: ColorSpaceMode,

    /// Headset backend: `simulated` (desktop stand-in) or `none`.
    #[arg(
        long,
        value_name = "BACKEND",
        value_parser = parse_headset,
        default_value = "simulated"
    )]
    pub hmd: HeadsetKind,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or validate the configuration file.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config directory and file.
    Where,
    /// Validate a config file (defaults to the per-user file).
    Check {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Print the built-in defaults as TOML.
    Default,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_placement(value: &str) -> Result<PlacementSetting, String> {
    value.parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Err("color space must not be empty".to_string()),
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_headset(value: &str) -> Result<HeadsetKind, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "simulated" | "sim" | "desktop" => Ok(HeadsetKind::Simulated),
        "none" | "off" => Ok(HeadsetKind::None),
        other => Err(format!(
            "unknown headset backend '{other}'; expected simulated or none"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antialias_accepts_counts_and_keywords() {
        assert_eq!(parse_antialias("auto"), Ok(Antialiasing::Auto));
        assert_eq!(parse_antialias("OFF"), Ok(Antialiasing::Off));
        assert_eq!(parse_antialias("1"), Ok(Antialiasing::Off));
        assert_eq!(parse_antialias("8"), Ok(Antialiasing::Samples(8)));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn headset_and_color_space_names() {
        assert_eq!(parse_headset("none"), Ok(HeadsetKind::None));
        assert_eq!(parse_headset("Simulated"), Ok(HeadsetKind::Simulated));
        assert!(parse_headset("oculus").is_err());
        assert_eq!(parse_color_space("linear"), Ok(ColorSpaceMode::Linear));
        assert!(parse_color_space("cmyk").is_err());
    }

    #[test]
    fn positional_images_and_overrides_parse() {
        let cli = Cli::try_parse_from([
            "stereopane",
            "left.jpg",
            "right.jpg",
            "--width",
            "2.5",
            "--placement",
            "head",
            "--hmd",
            "none",
        ])
        .unwrap();
        assert_eq!(cli.run.left, Some(PathBuf::from("left.jpg")));
        assert_eq!(cli.run.right, Some(PathBuf::from("right.jpg")));
        assert_eq!(cli.run.width, Some(2.5));
        assert_eq!(cli.run.placement, Some(PlacementSetting::Head));
        assert_eq!(cli.run.hmd, HeadsetKind::None);
        assert!(cli.command.is_none());
    }

    #[test]
    fn config_subcommand_parses() {
        let cli = Cli::try_parse_from(["stereopane", "config", "check", "custom.toml"]).unwrap();
        match cli.command {
            Some(Command::Config(ConfigCommand {
                action: ConfigAction::Check { file },
            })) => assert_eq!(file, Some(PathBuf::from("custom.toml"))),
            other => panic!("unexpected {other:?}"),
        }
    }
}
