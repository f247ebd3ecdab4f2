// src/main.rs
#![cfg_attr(all(target_os = "windows", not(debug_assertions)), windows_subsystem = "windows")]

use std::env;
use std::ffi::OsString;

use eframe::egui as eg;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use showsheet::app::{fonts, ShowsheetApp};
use showsheet::config::load_config;

const WINDOW_SIZE: [f32; 2] = [350.0, 240.0];

const RENDERER_VAR: &str = "SHOWSHEET_RENDERER";

/// `SHOWSHEET_RENDERER=glow|wgpu` overrides the per-OS default.
fn pick_renderer() -> eframe::Renderer {
    let default = if cfg!(target_os = "windows") {
        eframe::Renderer::Wgpu
    } else {
        eframe::Renderer::Glow
    };
    match env::var(RENDERER_VAR).as_deref() {
        Ok("glow") => eframe::Renderer::Glow,
        Ok("wgpu") => eframe::Renderer::Wgpu,
        Ok(other) => {
            warn!("{RENDERER_VAR}={other:?} not recognised, using {default:?}");
            default
        }
        Err(_) => default,
    }
}

const NO_DISPLAY: &str = "neither WAYLAND_DISPLAY nor DISPLAY is set; start from a desktop session";

/// None when a desktop session is reachable.
fn missing_display() -> Option<&'static str> {
    if cfg!(target_os = "linux") {
        display_problem(|k| env::var_os(k))
    } else {
        None
    }
}

fn display_problem(var: impl Fn(&str) -> Option<OsString>) -> Option<&'static str> {
    let set = |k: &str| var(k).is_some_and(|v| !v.is_empty());
    if set("WAYLAND_DISPLAY") || set("DISPLAY") {
        None
    } else {
        Some(NO_DISPLAY)
    }
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    if let Some(problem) = missing_display() {
        warn!("{problem}");
    }

    let config = load_config();
    info!("schedule endpoint: {}", config.api_url);
    let title = config.window_title.clone();

    let options = eframe::NativeOptions {
        renderer: pick_renderer(),
        multisampling: 0,
        centered: true,
        viewport: eg::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size(WINDOW_SIZE)
            .with_resizable(false),
        ..Default::default()
    };

    match eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            // logs its own hint when no Chinese font is found
            fonts::install_cjk_font(&cc.egui_ctx, config.ui_font_path.as_deref());
            Ok(Box::new(ShowsheetApp::new(config)))
        }),
    ) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("window could not be created: {e}");
            match missing_display() {
                Some(problem) => error!("{problem}"),
                None => error!("graphics driver refused the renderer; retry with {RENDERER_VAR}=glow or {RENDERER_VAR}=wgpu"),
            }
            Err(e)
        }
    }
}
