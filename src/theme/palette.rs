//! Color constants and font size tokens shared by sprites and UI text.

use bevy::prelude::*;

// === Text Colors ===

/// Header/title text color (white).
pub const HEADER_TEXT: Color = Color::WHITE;

/// Body/subtitle text color (light gray).
pub const BODY_TEXT: Color = Color::srgb(0.7, 0.7, 0.7);

/// Energy readout and insufficient-energy alerts (cyan).
pub const ENERGY_TEXT: Color = Color::srgb(0.3, 0.9, 1.0);

/// Short-lived alert text (amber).
pub const ALERT_TEXT: Color = Color::srgb(1.0, 0.7, 0.2);

// === UI Backgrounds ===

/// Semi-transparent dark overlay for pause and outcome screens.
pub const OVERLAY_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.7);

// === Outcome Banners ===

pub const VICTORY: Color = Color::srgb(0.1, 0.9, 0.1);
pub const DEFEAT: Color = Color::srgb(0.8, 0.2, 0.2);

// === Level Colors ===

pub const PATH_LANE: Color = Color::srgb(0.25, 0.22, 0.3);
pub const NEXUS: Color = Color::srgb(0.55, 0.35, 0.9);

// === Actor Colors ===

pub const PLAYER: Color = Color::srgb(0.95, 0.95, 0.95);
pub const GENIE: Color = Color::srgb(0.4, 0.8, 1.0);
pub const GRUNT: Color = Color::srgb(0.8, 0.2, 0.2);
pub const RUNNER: Color = Color::srgb(0.95, 0.55, 0.15);
pub const BRUTE: Color = Color::srgb(0.55, 0.1, 0.1);
pub const PHANTOM: Color = Color::srgba(0.7, 0.5, 1.0, 0.8);

pub const LASER_TOWER: Color = Color::srgb(0.2, 0.6, 1.0);
pub const MORTAR_TOWER: Color = Color::srgb(0.9, 0.8, 0.2);
pub const FROST_TOWER: Color = Color::srgb(0.6, 0.95, 0.95);

pub const BULLET: Color = Color::srgb(1.0, 1.0, 0.3);
pub const BOMB: Color = Color::srgb(1.0, 0.45, 0.1);

// === Font Size Tokens ===

pub const FONT_SIZE_TITLE: f32 = 72.0;
pub const FONT_SIZE_HEADER: f32 = 64.0;
pub const FONT_SIZE_LABEL: f32 = 32.0;
pub const FONT_SIZE_HUD: f32 = 28.0;
pub const FONT_SIZE_PROMPT: f32 = 24.0;
