// src/app/fonts.rs — egui ships no CJK glyphs, so borrow a system font
use std::fs;
use std::path::{Path, PathBuf};

use egui::{FontData, FontDefinitions, FontFamily};
use tracing::{info, warn};

const CJK_FONT_NAME: &str = "cjk_fallback";

#[cfg(target_os = "windows")]
const SYSTEM_CJK_FONTS: &[&str] = &[
    r"C:\Windows\Fonts\simfang.ttf",
    r"C:\Windows\Fonts\msyh.ttc",
    r"C:\Windows\Fonts\simhei.ttf",
    r"C:\Windows\Fonts\simsun.ttc",
];

#[cfg(target_os = "macos")]
const SYSTEM_CJK_FONTS: &[&str] = &[
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Light.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const SYSTEM_CJK_FONTS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/arphic/uming.ttc",
];

/// Configured font first, then the platform's usual CJK fonts.
pub fn font_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_CJK_FONTS.iter().map(PathBuf::from))
        .collect()
}

/// Add the first readable candidate as a fallback for both font families.
pub fn install_cjk_font(ctx: &egui::Context, configured: Option<&Path>) -> Option<PathBuf> {
    let found = font_candidates(configured)
        .into_iter()
        .find_map(|p| fs::read(&p).ok().map(|bytes| (p, bytes)));

    let Some((path, bytes)) = found else {
        warn!("no CJK font found; Chinese labels will not render (set ui_font_path in config.json)");
        return None;
    };

    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert(CJK_FONT_NAME.to_owned(), FontData::from_owned(bytes));
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(CJK_FONT_NAME.to_owned());
    }
    ctx.set_fonts(fonts);

    info!("UI font fallback: {}", path.display());
    Some(path)
}
