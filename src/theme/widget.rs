//! Reusable UI widget constructors.

use bevy::prelude::*;

use super::palette;

/// Full-screen flex container that centers its children.
/// Use as root for overlays and banners.
pub fn ui_root(name: impl Into<std::borrow::Cow<'static, str>>) -> impl Bundle {
    (
        Name::new(name),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(20.0),
            ..default()
        },
    )
}

/// Large header text in the given color.
pub fn header(text: impl Into<String>, color: Color) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: palette::FONT_SIZE_HEADER,
            ..default()
        },
        TextColor(color),
    )
}

/// Medium prompt text (prompt size, gray).
pub fn prompt(text: impl Into<String>) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: palette::FONT_SIZE_PROMPT,
            ..default()
        },
        TextColor(palette::BODY_TEXT),
    )
}
