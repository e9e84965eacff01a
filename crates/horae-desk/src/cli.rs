use std::path::PathBuf;

use clap::Parser;
use winit::dpi::LogicalSize;

use horae_clock::style::StyleTarget;
use horae_clock::{ClockConfig, FontCatalog, FontKey, HourCycle, MaterialPolicy};
use horae_engine::window::RuntimeConfig;

#[derive(Debug, Parser)]
#[command(name = "horae", version, about = "A live extruded-text 3D clock")]
pub struct Cli {
    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Log filter in env_logger syntax (overrides RUST_LOG).
    #[arg(long)]
    pub log: Option<String>,

    /// Font file for a key, e.g. `--font alt-1=/path/serif.ttf`. Repeatable.
    #[arg(long = "font", value_name = "KEY=PATH", value_parser = parse_font_override)]
    pub fonts: Vec<(FontKey, PathBuf)>,

    /// Directory holding `default.ttf`, `alt-1.ttf`, ...
    #[arg(long, value_name = "DIR")]
    pub font_dir: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub time_texture: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub date_texture: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub background_image: Option<PathBuf>,

    /// `12` or `24`.
    #[arg(long, default_value = "12", value_parser = parse_hour_cycle)]
    pub hour_cycle: HourCycle,

    /// Recreate label materials on every regeneration.
    #[arg(long)]
    pub ephemeral_materials: bool,

    #[arg(long)]
    pub no_rotate: bool,

    #[arg(long)]
    pub no_shadows: bool,
}

fn parse_font_override(s: &str) -> Result<(FontKey, PathBuf), String> {
    let (key, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=PATH, got '{s}'"))?;
    let key = key.parse::<FontKey>().map_err(|e| e.to_string())?;
    if path.is_empty() {
        return Err(format!("empty path for font {key}"));
    }
    Ok((key, PathBuf::from(path)))
}

fn parse_hour_cycle(s: &str) -> Result<HourCycle, String> {
    match s {
        "12" => Ok(HourCycle::H12),
        "24" => Ok(HourCycle::H24),
        other => Err(format!("hour cycle must be 12 or 24, got '{other}'")),
    }
}

impl Cli {
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: "Horae".to_string(),
            initial_size: LogicalSize::new(self.width as f64, self.height as f64),
        }
    }

    pub fn clock_config(&self) -> ClockConfig {
        ClockConfig {
            hour_cycle: self.hour_cycle,
            material_policy: if self.ephemeral_materials {
                MaterialPolicy::Ephemeral
            } else {
                MaterialPolicy::Persistent
            },
            rotate: !self.no_rotate,
            shadows: !self.no_shadows,
            ..ClockConfig::default()
        }
    }

    /// Explicit `--font` flags win over `--font-dir`, which wins over system fonts.
    pub fn font_catalog(&self) -> FontCatalog {
        let mut catalog = match &self.font_dir {
            Some(dir) => FontCatalog::new().scan_dir(dir),
            None => FontCatalog::new(),
        };
        for (key, path) in &self.fonts {
            catalog.insert(*key, path.clone());
        }
        catalog.with_system_fallbacks()
    }

    /// Images to load as soon as the scene starts.
    pub fn startup_images(&self) -> Vec<(StyleTarget, PathBuf)> {
        [
            (StyleTarget::Time, &self.time_texture),
            (StyleTarget::Date, &self.date_texture),
            (StyleTarget::Background, &self.background_image),
        ]
        .into_iter()
        .filter_map(|(target, path)| path.clone().map(|p| (target, p)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("horae").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_clock_defaults() {
        let cli = parse(&[]);
        let config = cli.clock_config();
        assert_eq!(config, ClockConfig::default());
        assert_eq!((cli.width, cli.height), (900, 600));
        assert!(cli.startup_images().is_empty());
    }

    #[test]
    fn flags_flow_into_config() {
        let cli = parse(&[
            "--hour-cycle",
            "24",
            "--ephemeral-materials",
            "--no-rotate",
            "--no-shadows",
        ]);
        let config = cli.clock_config();
        assert_eq!(config.hour_cycle, HourCycle::H24);
        assert_eq!(config.material_policy, MaterialPolicy::Ephemeral);
        assert!(!config.rotate);
        assert!(!config.shadows);
    }

    #[test]
    fn font_overrides_parse() {
        let cli = parse(&["--font", "alt-2=/fonts/mono.ttf", "--font", "default=a.otf"]);
        assert_eq!(
            cli.fonts,
            vec![
                (FontKey::Alt2, PathBuf::from("/fonts/mono.ttf")),
                (FontKey::Default, PathBuf::from("a.otf")),
            ]
        );
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Cli::try_parse_from(["horae", "--font", "alt-7=x.ttf"]).is_err());
        assert!(Cli::try_parse_from(["horae", "--font", "default"]).is_err());
        assert!(Cli::try_parse_from(["horae", "--hour-cycle", "13"]).is_err());
    }

    #[test]
    fn startup_images_keep_target_order() {
        let cli = parse(&["--background-image", "bg.jpg", "--time-texture", "t.png"]);
        let targets: Vec<_> = cli.startup_images().into_iter().map(|(t, _)| t).collect();
        assert_eq!(targets, [StyleTarget::Time, StyleTarget::Background]);
    }
}
