//! Cura color palette and semantic roles.
//!
//! This module provides the color palette used throughout the Cura TUI.

use ratatui::style::Color;

pub const TEAL_RGB: (u8, u8, u8) = (13, 148, 136);
pub const BLUE_RGB: (u8, u8, u8) = (37, 99, 235);
pub const RED_RGB: (u8, u8, u8) = (239, 68, 68);
pub const ORANGE_RGB: (u8, u8, u8) = (249, 115, 22);
pub const INK_RGB: (u8, u8, u8) = (24, 30, 37);
pub const SLATE_RGB: (u8, u8, u8) = (71, 85, 105);
pub const SILVER_RGB: (u8, u8, u8) = (203, 213, 225);
pub const SNOW_RGB: (u8, u8, u8) = (248, 250, 252);
pub const GREEN_RGB: (u8, u8, u8) = (34, 197, 94);
pub const YELLOW_RGB: (u8, u8, u8) = (234, 179, 8);

pub const TEAL: Color = Color::Rgb(TEAL_RGB.0, TEAL_RGB.1, TEAL_RGB.2);
pub const BLUE: Color = Color::Rgb(BLUE_RGB.0, BLUE_RGB.1, BLUE_RGB.2);
pub const RED: Color = Color::Rgb(RED_RGB.0, RED_RGB.1, RED_RGB.2);
pub const ORANGE: Color = Color::Rgb(ORANGE_RGB.0, ORANGE_RGB.1, ORANGE_RGB.2);
pub const INK: Color = Color::Rgb(INK_RGB.0, INK_RGB.1, INK_RGB.2);
pub const SLATE: Color = Color::Rgb(SLATE_RGB.0, SLATE_RGB.1, SLATE_RGB.2);
pub const SILVER: Color = Color::Rgb(SILVER_RGB.0, SILVER_RGB.1, SILVER_RGB.2);
pub const SNOW: Color = Color::Rgb(SNOW_RGB.0, SNOW_RGB.1, SNOW_RGB.2);
pub const GREEN: Color = Color::Rgb(GREEN_RGB.0, GREEN_RGB.1, GREEN_RGB.2);
pub const YELLOW: Color = Color::Rgb(YELLOW_RGB.0, YELLOW_RGB.1, YELLOW_RGB.2);
