//! Resonance Defense entry point.

use resonance_defense::prelude::*;

fn main() {
    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Resonance Defense".to_string(),
                    resolution: (1280, 720).into(),
                    resizable: true,
                    ..default()
                }),
                ..default()
            })
            .set(ImagePlugin::default_nearest()),
    )
    .add_plugins((resonance_defense::plugin, resonance_defense::third_party::plugin));

    #[cfg(feature = "dev")]
    app.add_plugins(resonance_defense::dev_tools::plugin);

    app.run();
}
