mod app;
mod catalog;
mod encoding;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use app::{BuildConfig, EdgeIdPolicy, LayoutConfig, Settings, SizePolicy};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON array of film records.
    #[arg(long, default_value = "movies.json")]
    data: PathBuf,
    #[arg(long, default_value_t = 1440.0)]
    width: f32,
    #[arg(long, default_value_t = 920.0)]
    height: f32,
    /// Stop the layout after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// How category sizes behave across graph rebuilds.
    #[arg(long, value_enum, default_value_t = SizePolicy::default())]
    size_policy: SizePolicy,
    #[arg(long, value_enum, default_value_t = EdgeIdPolicy::default())]
    edge_ids: EdgeIdPolicy,
    /// Log debug output.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            build: BuildConfig {
                size_policy: self.size_policy,
                edge_ids: self.edge_ids,
            },
            layout: LayoutConfig {
                max_ticks: self.max_ticks,
                ..LayoutConfig::default()
            },
        }
    }
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let settings = args.settings();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "film-flowers",
        options,
        Box::new(move |cc| Ok(Box::new(app::FlowerApp::new(cc, args.data, settings)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_settings() {
        let args = Args::parse_from(["film-flowers"]);
        assert_eq!(args.data, PathBuf::from("movies.json"));
        assert_eq!(args.settings().build, BuildConfig::default());
        assert_eq!(args.settings().layout, LayoutConfig::default());
    }

    #[test]
    fn policies_parse_from_kebab_case() {
        let args = Args::parse_from([
            "film-flowers",
            "--size-policy",
            "accumulate",
            "--edge-ids",
            "positional",
            "--max-ticks",
            "500",
        ]);
        let settings = args.settings();
        assert_eq!(settings.build.size_policy, SizePolicy::Accumulate);
        assert_eq!(settings.build.edge_ids, EdgeIdPolicy::Positional);
        assert_eq!(settings.layout.max_ticks, Some(500));
    }
}
