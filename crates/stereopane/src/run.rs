use std::path::Path;

use anyhow::{Context, Result};
use renderer::{Antialiasing, RendererConfig, Viewer};
use tracing_subscriber::EnvFilter;
use viewconfig::{AntialiasSetting, ViewConfig};

use crate::cli::RunArgs;
use crate::paths::AppPaths;

pub fn run(args: RunArgs) -> Result<()> {
    let file = load_config(&args)?;
    let config = renderer_config(&args, file)?;
    tracing::info!(
        left = ?config.left_image,
        right = ?config.right_image,
        width = config.viewer.config.panel_width(),
        distance = config.viewer.config.view_distance(),
        placement = ?config.viewer.placement_mode,
        headset = ?config.headset,
        "starting stereopane"
    );
    if config.left_image.is_none() || config.right_image.is_none() {
        tracing::info!("drop images onto the left and right halves of the window to load a pair");
    }

    Viewer::new(config).run()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Reads `--config FILE` when given (the file must exist), otherwise the
/// per-user file, falling back to defaults when that is absent.
fn load_config(args: &RunArgs) -> Result<ViewConfig> {
    match args.config.as_deref() {
        Some(path) => ViewConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            let paths = AppPaths::discover()?;
            let path = paths.config_file();
            tracing::debug!(path = %path.display(), "resolved config file");
            ViewConfig::load_or_default(&path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
    }
}

/// Applies command-line overrides on top of the file and builds the renderer
/// configuration.
pub fn renderer_config(args: &RunArgs, mut file: ViewConfig) -> Result<RendererConfig> {
    if let Some(width) = args.width {
        file.panel.width = width;
    }
    if let Some(distance) = args.distance {
        file.panel.distance = distance;
    }
    if let Some(placement) = args.placement {
        file.placement.mode = placement;
    }
    file.validate().context("invalid viewer settings")?;

    let antialiasing = args
        .antialias
        .or_else(|| file.render.antialias.map(antialiasing_from_setting))
        .unwrap_or_default();
    let surface_size = match args.size.as_deref() {
        Some(spec) => parse_surface_size(spec)?,
        None => RendererConfig::default().surface_size,
    };

    Ok(RendererConfig {
        surface_size,
        left_image: args.left.clone(),
        right_image: args.right.clone(),
        antialiasing,
        color_space: args.color_space,
        headset: args.hmd,
        viewer: file.viewer_settings()?,
    })
}

fn antialiasing_from_setting(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32)> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 1600x900"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in size specification"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in size specification"))?;

    if width == 0 || height == 0 {
        anyhow::bail!("surface dimensions must be greater than zero");
    }

    Ok((width, height))
}

/// Loads and validates a config file, returning a one-line summary.
pub fn check_config(path: &Path) -> Result<String> {
    let file = ViewConfig::load(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    let settings = file.viewer_settings()?;
    Ok(format!(
        "{}: ok (width {} m, distance {} m, placement {:?})",
        path.display(),
        settings.config.panel_width(),
        settings.config.view_distance(),
        settings.placement_mode,
    ))
}

#[cfg(test)]
mod tests {
    use renderer::{ColorSpaceMode, HeadsetKind};
    use stereorig::PlacementMode;
    use viewconfig::PlacementSetting;

    use super::*;

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size(" 800 X 600 ").unwrap(), (800, 600));
        assert!(parse_surface_size("0x600").is_err());
        assert!(parse_surface_size("wide").is_err());
    }

    #[test]
    fn cli_overrides_file_values() {
        let file = ViewConfig::from_toml_str(
            "version = 1\n[panel]\nwidth = 3.0\ndistance = 4.0\n[render]\nantialias = 2\n",
        )
        .unwrap();
        let args = RunArgs {
            width: Some(1.2),
            placement: Some(PlacementSetting::Head),
            ..RunArgs::default()
        };

        let config = renderer_config(&args, file).unwrap();
        assert_eq!(config.viewer.config.panel_width(), 1.2);
        assert_eq!(config.viewer.config.view_distance(), 4.0);
        assert_eq!(config.viewer.placement_mode, PlacementMode::HeadLocked);
        assert_eq!(config.antialiasing, Antialiasing::Samples(2));
        assert_eq!(config.surface_size, (1600, 900));
    }

    #[test]
    fn cli_antialias_wins_over_file() {
        let file =
            ViewConfig::from_toml_str("version = 1\n[render]\nantialias = \"off\"\n").unwrap();
        let args = RunArgs {
            antialias: Some(Antialiasing::Samples(4)),
            size: Some("640x480".into()),
            ..RunArgs::default()
        };
        let config = renderer_config(&args, file).unwrap();
        assert_eq!(config.antialiasing, Antialiasing::Samples(4));
        assert_eq!(config.surface_size, (640, 480));
        assert_eq!(config.color_space, ColorSpaceMode::Auto);
        assert_eq!(config.headset, HeadsetKind::Simulated);
    }

    #[test]
    fn non_positive_override_is_rejected() {
        let args = RunArgs {
            distance: Some(0.0),
            ..RunArgs::default()
        };
        let err = renderer_config(&args, ViewConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("panel.distance"));
    }
}
