//! swatchview - glTF model viewer with palette recoloring
//!
//! Loads one model at a time from the asset directory, frames it with an orbit
//! camera sized from its bounds, and recolors its meshes from one of three
//! fixed palettes shown as clickable swatch grids.

mod app;
mod assets;
mod config;
mod palette;
mod render;
mod scene;

use std::path::PathBuf;

fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(err) = app::run(config_path) {
        log::error!("{}", err);
        eprintln!("swatchview: {err}");
        std::process::exit(1);
    }
}
