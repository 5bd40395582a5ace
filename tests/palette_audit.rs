//! Guards against ANSI color shorthands creeping back into the views.
//!
//! User-visible output goes through the Cura palette constants; the named
//! `colored` methods and `ratatui::style::Color` variants bypass it.

use std::fs;
use std::path::{Path, PathBuf};

const DISALLOWED: &[&str] = &[
    ".red()",
    ".green()",
    ".yellow()",
    ".blue()",
    ".cyan()",
    ".magenta()",
    "Color::Red",
    "Color::Green",
    "Color::Yellow",
    "Color::Blue",
    "Color::Cyan",
    "Color::Magenta",
];

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs")
            && !path.file_name().is_some_and(|n| n == "palette.rs")
        {
            out.push(path);
        }
    }
}

#[test]
fn no_direct_color_usage_outside_palette() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut sources = Vec::new();
    rust_sources(&src_dir, &mut sources);
    assert!(!sources.is_empty(), "no sources found under src/");

    let mut violations = Vec::new();
    for path in sources {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (line_num, line) in content.lines().enumerate() {
            for pattern in DISALLOWED {
                if line.contains(pattern) {
                    violations.push(format!(
                        "{}:{}: {pattern}",
                        path.display(),
                        line_num + 1
                    ));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "direct color usage found (use the palette constants):\n{}",
        violations.join("\n")
    );
}

#[test]
fn brand_colors_are_pinned() {
    let palette_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/palette.rs");
    let content = fs::read_to_string(&palette_path).expect("Failed to read palette.rs");

    for (name, rgb) in [
        ("TEAL_RGB", "(13, 148, 136)"),
        ("BLUE_RGB", "(37, 99, 235)"),
        ("RED_RGB", "(239, 68, 68)"),
        ("ORANGE_RGB", "(249, 115, 22)"),
        ("GREEN_RGB", "(34, 197, 94)"),
    ] {
        assert!(
            content.contains(&format!("{name}: (u8, u8, u8) = {rgb}")),
            "{name} drifted from {rgb}"
        );
    }
}
