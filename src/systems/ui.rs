use std::collections::HashSet;

use bevy::prelude::*;

use crate::systems::bodies::BodyDescriptor;
use crate::systems::lifecycle::{self, LifecycleController, LifecyclePhase};
use crate::systems::scene::OrbitingBody;
use crate::systems::time::AnimationClock;

const KEY_HELP: &str = "S save   L load   R restore   Space pause   +/- speed   0 normal";

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_ui)
            .add_systems(
                Update,
                (
                    update_body_count,
                    update_clock_display,
                    update_body_panel.after(lifecycle::drive),
                ),
            );
    }
}

// UI component to display body count and scene phase
#[derive(Component)]
pub struct BodyCounter;

// UI component to display clock rate
#[derive(Component)]
pub struct ClockDisplay;

// UI component listing the parameters of every body in the running scene
#[derive(Component)]
pub struct BodyPanel;

fn hud_text(text: &str, color: Color) -> (Text, TextFont, TextColor) {
    (
        Text::new(text),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(color),
    )
}

fn setup_ui(mut commands: Commands) {
    // create UI container
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Start,
                justify_content: JustifyContent::Start,
                padding: UiRect::all(Val::Px(20.0)),
                ..default()
            },
            BackgroundColor(Color::NONE),
        ))
        .with_children(|parent| {
            parent.spawn((hud_text("Bodies: -", Color::WHITE), BodyCounter));

            parent.spawn((
                hud_text("Clock: -", Color::WHITE),
                ClockDisplay,
                Node {
                    margin: UiRect::top(Val::Px(5.0)),
                    ..default()
                },
            ));

            parent.spawn((
                hud_text("", Color::WHITE),
                BodyPanel,
                Node {
                    margin: UiRect::top(Val::Px(10.0)),
                    ..default()
                },
            ));

            parent.spawn((
                hud_text(KEY_HELP, Color::srgb(0.6, 0.6, 0.6)),
                Node {
                    margin: UiRect::top(Val::Px(5.0)),
                    ..default()
                },
            ));
        });
}

pub fn body_label(count: usize, phase: LifecyclePhase) -> String {
    format!("Bodies: {} ({:?})", count, phase)
}

pub fn clock_label(clock: &AnimationClock) -> String {
    if clock.is_paused {
        format!("Clock: x{} (paused)", clock.speed_mult)
    } else {
        format!("Clock: x{}", clock.speed_mult)
    }
}

/// One panel row: `name  size ..  color ..  speed ..  distance ..`
pub fn body_entry_label(body: &BodyDescriptor, drawn: bool) -> String {
    let entry = format!(
        "{}  size {}  color {}  speed {}  distance {}",
        body.name,
        body.size,
        body.color.as_deref().unwrap_or("auto"),
        body.speed,
        body.distance
    );
    if drawn { entry } else { format!("{} (not drawn)", entry) }
}

/// `drawn` holds the descriptor indices that got a mesh
pub fn panel_text(bodies: &[BodyDescriptor], drawn: &HashSet<usize>) -> String {
    if bodies.is_empty() {
        return "No bodies".to_string();
    }
    bodies
        .iter()
        .enumerate()
        .map(|(index, body)| body_entry_label(body, drawn.contains(&index)))
        .collect::<Vec<_>>()
        .join("\n")
}

// rewritten only when a new scene is built or the old one released
fn update_body_panel(
    controller: Res<LifecycleController>,
    drawn_bodies: Query<&OrbitingBody, With<Mesh3d>>,
    mut shown: Local<Option<(u64, bool)>>,
    mut text_query: Query<&mut Text, With<BodyPanel>>,
) {
    let current = (controller.builds(), controller.bodies().is_some());
    if *shown == Some(current) {
        return;
    }
    let Ok(mut text) = text_query.single_mut() else {
        return;
    };

    text.0 = match controller.bodies() {
        Some(bodies) => {
            let drawn: HashSet<usize> = drawn_bodies.iter().map(|body| body.index).collect();
            panel_text(bodies, &drawn)
        }
        None => String::new(),
    };
    *shown = Some(current);
}

fn update_body_count(
    controller: Res<LifecycleController>,
    mut text_query: Query<&mut Text, With<BodyCounter>>,
) {
    let count = controller.scene().map_or(0, |scene| scene.bodies.len());

    if let Ok(mut text) = text_query.single_mut() {
        text.0 = body_label(count, controller.phase());
    }
}

fn update_clock_display(
    clock: Res<AnimationClock>,
    mut text_query: Query<&mut Text, With<ClockDisplay>>,
) {
    if let Ok(mut text) = text_query.single_mut() {
        text.0 = clock_label(&clock);
    }
}
