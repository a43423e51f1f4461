//! Display list generation
//!
//! Turns a [`Snapshot`] into a flat list of [`DrawCmd`]s. Nothing here touches
//! the browser, so layout is testable natively; the canvas backend only
//! executes the list.

use std::f32::consts::PI;

use glam::Vec2;

use crate::input::celebrate_button;
use crate::sim::{
    Aabb, CANDLE_NAME, CelebrationStage, Collectible, ItemKind, LogoId, Obstacle, ObstacleKind,
    Snapshot, pipe_solids,
};

/// RGBA, each channel 0..=1
pub type Color = [f32; 4];

pub mod palette {
    use super::Color;

    pub const SKY_TOP: Color = [0.043, 0.059, 0.173, 1.0];
    pub const SKY_BOTTOM: Color = [0.102, 0.122, 0.298, 1.0];
    pub const GRID: Color = [1.0, 1.0, 1.0, 0.03];
    pub const ACCENT: Color = [0.0, 1.0, 0.784, 1.0];
    pub const CHART_GLOW: Color = [0.0, 1.0, 0.784, 0.4];
    pub const CHART_FILL: Color = [0.0, 1.0, 0.784, 0.12];
    pub const PLAYER: Color = [0.169, 0.424, 0.690, 1.0];
    pub const PIPE_FRAME: Color = [1.0, 1.0, 1.0, 0.36];
    pub const COIN: Color = [0.96, 0.72, 0.18, 1.0];
    pub const HAZARD: Color = [0.90, 0.30, 0.30, 1.0];
    pub const INGREDIENT: Color = [0.98, 0.86, 0.62, 1.0];
    pub const CANDLE: Color = [1.0, 0.55, 0.75, 1.0];
    pub const BOWL: Color = [0.80, 0.82, 0.88, 1.0];
    pub const CAKE: Color = [0.95, 0.55, 0.65, 1.0];
    pub const TEXT: Color = [0.933, 0.933, 0.933, 1.0];
    pub const OVERLAY: Color = [0.0, 0.0, 0.0, 0.7];
}

/// Checklist icon size and spacing (px)
const CHECKLIST_ICON: f32 = 24.0;
const CHECKLIST_STEP: f32 = 32.0;
const CHECKLIST_ORIGIN: Vec2 = Vec2::new(12.0, 20.0);
/// Alpha of checklist entries not yet collected
const PENDING_ALPHA: f32 = 0.4;
/// Maximum tilt of the player sprite (radians)
const MAX_TILT: f32 = PI / 6.0;
const BOWL_SIZE: Vec2 = Vec2::new(160.0, 70.0);
const CAKE_SIZE: f32 = 120.0;
/// Backdrop grid spacing (px)
const GRID_SPACING: f32 = 50.0;
const CHART_LINE_WIDTH: f32 = 3.0;
const CHART_GLOW_BLUR: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Vertical gradient filling `rect`
    Gradient { rect: Aabb, top: Color, bottom: Color },
    Rect { rect: Aabb, color: Color },
    /// One-pixel lines every `spacing` px across `rect`, both directions
    Grid {
        rect: Aabb,
        spacing: f32,
        color: Color,
    },
    /// Open polyline with a blurred glow
    Line {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
        glow: Color,
        blur: f32,
    },
    /// Area between a polyline and `baseline`, filled with a vertical gradient
    Area {
        points: Vec<Vec2>,
        baseline: f32,
        top: Color,
        bottom: Color,
    },
    /// Image asset; the backend fills `fallback` when the image is unavailable
    Sprite {
        asset: String,
        rect: Aabb,
        fallback: Color,
        alpha: f32,
        /// Rotation about the rect centre (radians)
        angle: f32,
    },
    /// Text centred on `pos` horizontally, baseline at `pos.y`
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        bold: bool,
        color: Color,
    },
}

/// Per-frame presentation inputs that are not part of the simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStyle<'a> {
    /// Seconds, used for wobble animation
    pub time: f64,
    /// Backdrop chart samples, oldest first; empty draws no chart
    pub chart: &'a [f32],
    pub bowl_shake: bool,
    pub fps: Option<u32>,
    pub autopilot: bool,
}

/// Asset name for an ingredient or logo image
pub fn ingredient_asset(name: &str) -> String {
    format!("ingredients/{}", name)
}

pub fn logo_asset(name: &str) -> String {
    format!("logos/{}", name)
}

/// CSS `rgba()` for a color
pub fn css_color(color: Color) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

fn faded(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], color[3] * alpha]
}

fn text(text: impl Into<String>, pos: Vec2, size: f32, bold: bool, color: Color) -> DrawCmd {
    DrawCmd::Text {
        text: text.into(),
        pos,
        size,
        bold,
        color,
    }
}

/// Build the full frame
pub fn build_frame(snap: &Snapshot<'_>, style: &FrameStyle<'_>) -> Vec<DrawCmd> {
    let state = snap.state;
    let mut cmds = Vec::new();
    backdrop(state.width, state.height, style.chart, &mut cmds);

    if state.is_final_cake_shown {
        celebration_screen(snap, style, &mut cmds);
        return cmds;
    }

    player(snap, &mut cmds);
    checklist(snap, &mut cmds);
    for obstacle in &state.obstacles {
        obstacle_cmds(snap, obstacle, &mut cmds);
    }
    for item in state.items.iter().filter(|i| !i.collected) {
        cmds.push(item_sprite(snap, item));
    }

    cmds.push(text(
        state.score.to_string(),
        Vec2::new(state.width / 2.0, 80.0),
        32.0,
        true,
        palette::TEXT,
    ));

    if state.is_game_over {
        cmds.push(DrawCmd::Rect {
            rect: Aabb::from_origin_size(0.0, 0.0, state.width, state.height),
            color: palette::OVERLAY,
        });
        cmds.push(text(
            "GAME OVER",
            Vec2::new(state.width / 2.0, state.height / 2.0 - 10.0),
            28.0,
            true,
            palette::TEXT,
        ));
        cmds.push(text(
            "Tap/Space to restart",
            Vec2::new(state.width / 2.0, state.height / 2.0 + 20.0),
            16.0,
            false,
            palette::TEXT,
        ));
    } else if !snap.active {
        cmds.push(text(
            "Tap/Space to start",
            Vec2::new(state.width / 2.0, state.height / 2.0 + 60.0),
            18.0,
            true,
            palette::ACCENT,
        ));
    }

    if style.autopilot {
        cmds.push(text(
            "AUTOPILOT",
            Vec2::new(state.width / 2.0, state.height - 20.0),
            12.0,
            false,
            palette::ACCENT,
        ));
    }
    if let Some(fps) = style.fps {
        cmds.push(text(
            format!("{} fps", fps),
            Vec2::new(32.0, state.height - 12.0),
            12.0,
            false,
            palette::TEXT,
        ));
    }
    cmds
}

/// Sky gradient, faint grid and the price chart spread across the width
fn backdrop(width: f32, height: f32, chart: &[f32], cmds: &mut Vec<DrawCmd>) {
    let rect = Aabb::from_origin_size(0.0, 0.0, width, height);
    cmds.push(DrawCmd::Gradient {
        rect,
        top: palette::SKY_TOP,
        bottom: palette::SKY_BOTTOM,
    });
    cmds.push(DrawCmd::Grid {
        rect,
        spacing: GRID_SPACING,
        color: palette::GRID,
    });

    if chart.len() < 2 {
        return;
    }
    let step = width / (chart.len() - 1) as f32;
    let points: Vec<Vec2> = chart
        .iter()
        .enumerate()
        .map(|(i, &y)| Vec2::new(i as f32 * step, y))
        .collect();
    cmds.push(DrawCmd::Line {
        points: points.clone(),
        width: CHART_LINE_WIDTH,
        color: palette::ACCENT,
        glow: palette::CHART_GLOW,
        blur: CHART_GLOW_BLUR,
    });
    cmds.push(DrawCmd::Area {
        points,
        baseline: height,
        top: palette::CHART_FILL,
        bottom: faded(palette::CHART_FILL, 0.0),
    });
}

fn player(snap: &Snapshot<'_>, cmds: &mut Vec<DrawCmd>) {
    let state = snap.state;
    cmds.push(DrawCmd::Sprite {
        asset: "player".to_string(),
        rect: state.player_hitbox(snap.tuning.player_size),
        fallback: palette::PLAYER,
        alpha: 1.0,
        angle: (state.velocity / 800.0).clamp(-MAX_TILT, MAX_TILT),
    });
}

/// Ingredient icons in catalog order, then one icon per candle
fn checklist(snap: &Snapshot<'_>, cmds: &mut Vec<DrawCmd>) {
    let mut pos = CHECKLIST_ORIGIN;
    let mut icon = |asset: String, fallback: Color, done: bool, cmds: &mut Vec<DrawCmd>| {
        cmds.push(DrawCmd::Sprite {
            asset,
            rect: Aabb::from_origin_size(pos.x, pos.y, CHECKLIST_ICON, CHECKLIST_ICON),
            fallback,
            alpha: if done { 1.0 } else { PENDING_ALPHA },
            angle: 0.0,
        });
        pos.x += CHECKLIST_STEP;
    };

    for (id, name) in snap.catalog.entries() {
        icon(
            ingredient_asset(name),
            palette::INGREDIENT,
            snap.collected.contains(&id),
            cmds,
        );
    }
    let (candles, total) = snap.candles;
    for i in 0..total {
        icon(
            ingredient_asset(CANDLE_NAME),
            palette::CANDLE,
            i < candles,
            cmds,
        );
    }
}

fn obstacle_cmds(snap: &Snapshot<'_>, obstacle: &Obstacle, cmds: &mut Vec<DrawCmd>) {
    let logo_size = snap.tuning.logo_size;
    let logo_sprite = |id: LogoId, rect: Aabb, fallback: Color| DrawCmd::Sprite {
        asset: snap.logos.name(id).map(logo_asset).unwrap_or_default(),
        rect,
        fallback,
        alpha: 1.0,
        angle: 0.0,
    };

    match &obstacle.kind {
        ObstacleKind::GapPipe {
            width,
            gap_y,
            gap_height,
            logos_top,
            logos_bottom,
        } => {
            for solid in pipe_solids(obstacle.x, *width, *gap_y, *gap_height, snap.state.height) {
                cmds.push(DrawCmd::Rect {
                    rect: solid,
                    color: palette::PIPE_FRAME,
                });
            }
            let x = obstacle.x + width / 2.0 - logo_size / 2.0;
            let bottom = gap_y + gap_height;
            let coin = |i: usize, top: f32| {
                Aabb::from_origin_size(x, top + i as f32 * logo_size, logo_size, logo_size)
            };
            for (i, id) in logos_top.iter().enumerate() {
                cmds.push(logo_sprite(*id, coin(i, 0.0), palette::COIN));
            }
            for (i, id) in logos_bottom.iter().enumerate() {
                cmds.push(logo_sprite(*id, coin(i, bottom), palette::COIN));
            }
        }
        ObstacleKind::PointHazard { y, size, logo, .. } => {
            let rect = Aabb::from_origin_size(obstacle.x, *y, *size, *size);
            match logo {
                Some(id) => cmds.push(logo_sprite(*id, rect, palette::HAZARD)),
                None => cmds.push(DrawCmd::Rect {
                    rect,
                    color: palette::HAZARD,
                }),
            }
        }
    }
}

fn item_sprite(snap: &Snapshot<'_>, item: &Collectible) -> DrawCmd {
    let (asset, fallback) = match item.kind {
        ItemKind::Ingredient(id) => (
            snap.catalog.name(id).map(ingredient_asset).unwrap_or_default(),
            palette::INGREDIENT,
        ),
        ItemKind::Candle => (ingredient_asset(CANDLE_NAME), palette::CANDLE),
    };
    DrawCmd::Sprite {
        asset,
        rect: item.hitbox(snap.tuning.item_size),
        fallback,
        alpha: 1.0,
        angle: 0.0,
    }
}

fn celebration_screen(snap: &Snapshot<'_>, style: &FrameStyle<'_>, cmds: &mut Vec<DrawCmd>) {
    let state = snap.state;
    let alpha = snap.cake_opacity;
    let center = Vec2::new(state.width / 2.0, state.height / 2.0);

    match snap.celebration {
        CelebrationStage::Hidden => {}
        CelebrationStage::Dropping { .. } | CelebrationStage::BowlShake => {
            let wobble = if snap.celebration == CelebrationStage::BowlShake && style.bowl_shake {
                (style.time * 40.0).sin() as f32 * 4.0
            } else {
                0.0
            };
            let bowl = Aabb::from_origin_size(
                center.x - BOWL_SIZE.x / 2.0 + wobble,
                center.y - 40.0,
                BOWL_SIZE.x,
                BOWL_SIZE.y,
            );

            // Dropped ingredients sit in a row just above the bowl rim
            let size = snap.tuning.item_size;
            let dropped: Vec<_> = snap.collected.iter().take(snap.dropped).collect();
            let row = dropped.len() as f32 * size;
            for (i, id) in dropped.into_iter().enumerate() {
                let x = center.x - row / 2.0 + i as f32 * size + wobble;
                cmds.push(DrawCmd::Sprite {
                    asset: snap.catalog.name(*id).map(ingredient_asset).unwrap_or_default(),
                    rect: Aabb::from_origin_size(x, bowl.min.y - size / 2.0, size, size),
                    fallback: palette::INGREDIENT,
                    alpha,
                    angle: 0.0,
                });
            }
            cmds.push(DrawCmd::Sprite {
                asset: "bowl".to_string(),
                rect: bowl,
                fallback: palette::BOWL,
                alpha,
                angle: 0.0,
            });
        }
        CelebrationStage::Cake => {
            cmds.push(DrawCmd::Sprite {
                asset: "cake".to_string(),
                rect: Aabb::centered(center - Vec2::new(0.0, 140.0), CAKE_SIZE),
                fallback: palette::CAKE,
                alpha,
                angle: 0.0,
            });
            cmds.push(text(
                "Happy Birthday",
                center - Vec2::new(0.0, 40.0),
                28.0,
                true,
                faded(palette::TEXT, alpha),
            ));
        }
    }

    let button = celebrate_button(state.width, state.height);
    cmds.push(DrawCmd::Rect {
        rect: button,
        color: faded(palette::ACCENT, alpha),
    });
    cmds.push(text(
        "Celebrate Again",
        Vec2::new(center.x, button.min.y + button.height() / 2.0 + 6.0),
        18.0,
        true,
        faded(palette::SKY_TOP, alpha),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{IngredientId, LogoCatalog, Simulation};

    fn sim() -> Simulation {
        let mut sim = Simulation::seeded(9);
        sim.init(400.0, 600.0);
        sim
    }

    fn sprites<'a>(cmds: &'a [DrawCmd], prefix: &str) -> Vec<(&'a str, f32)> {
        cmds.iter()
            .filter_map(|c| match c {
                DrawCmd::Sprite { asset, alpha, .. } if asset.starts_with(prefix) => {
                    Some((asset.as_str(), *alpha))
                }
                _ => None,
            })
            .collect()
    }

    fn has_text(cmds: &[DrawCmd], needle: &str) -> bool {
        cmds.iter()
            .any(|c| matches!(c, DrawCmd::Text { text, .. } if text == needle))
    }

    #[test]
    fn test_css_color() {
        assert_eq!(css_color([1.0, 0.0, 0.5, 0.4]), "rgba(255, 0, 128, 0.4)");
        assert_eq!(css_color([2.0, -1.0, 0.0, 3.0]), "rgba(255, 0, 0, 1)");
    }

    #[test]
    fn test_ready_screen_prompts_start() {
        let sim = sim();
        let cmds = build_frame(&sim.snapshot(), &FrameStyle::default());
        assert!(matches!(cmds[0], DrawCmd::Gradient { .. }));
        assert!(has_text(&cmds, "Tap/Space to start"));
        assert!(!has_text(&cmds, "GAME OVER"));
    }

    #[test]
    fn test_chart_spans_width_behind_playfield() {
        let mut sim = sim();
        sim.start();
        let samples = [300.0, 250.0, 320.0, 280.0, 300.0];
        let style = FrameStyle {
            chart: &samples,
            ..Default::default()
        };
        let cmds = build_frame(&sim.snapshot(), &style);

        let line = cmds.iter().position(|c| matches!(c, DrawCmd::Line { .. }));
        let player = cmds
            .iter()
            .position(|c| matches!(c, DrawCmd::Sprite { asset, .. } if asset == "player"));
        assert!(line < player);
        let Some(DrawCmd::Line { points, .. }) = line.map(|i| &cmds[i]) else {
            panic!("expected chart line");
        };
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Vec2::new(0.0, 300.0));
        assert_eq!(points[4], Vec2::new(400.0, 300.0));
        assert_eq!(points[1].y, 250.0);
        assert!(cmds.iter().any(|c| matches!(
            c,
            DrawCmd::Area { baseline, .. } if *baseline == 600.0
        )));
    }

    #[test]
    fn test_empty_chart_draws_grid_only() {
        let sim = sim();
        let cmds = build_frame(&sim.snapshot(), &FrameStyle::default());
        assert!(matches!(cmds[1], DrawCmd::Grid { spacing, .. } if spacing == 50.0));
        assert!(!cmds.iter().any(|c| matches!(c, DrawCmd::Line { .. } | DrawCmd::Area { .. })));
    }

    #[test]
    fn test_checklist_dims_pending_entries() {
        let mut sim = sim();
        sim.start();
        let mut snap = sim.snapshot();
        let collected = [IngredientId(0)].into_iter().collect();
        snap.collected = &collected;
        snap.candles = (1, 4);

        let cmds = build_frame(&snap, &FrameStyle::default());
        let icons = sprites(&cmds, "ingredients/");
        assert_eq!(icons.len(), snap.catalog.len() + 4);
        assert_eq!(icons[0], ("ingredients/flour", 1.0));
        assert_eq!(icons[1].1, PENDING_ALPHA);
        let candles: Vec<_> = icons[snap.catalog.len()..].iter().map(|i| i.1).collect();
        assert_eq!(candles, vec![1.0, PENDING_ALPHA, PENDING_ALPHA, PENDING_ALPHA]);
    }

    #[test]
    fn test_game_over_overlay() {
        let mut sim = sim();
        sim.start();
        for _ in 0..200 {
            sim.advance(0.02);
        }
        assert!(sim.state().is_game_over);
        let cmds = build_frame(&sim.snapshot(), &FrameStyle::default());
        assert!(has_text(&cmds, "GAME OVER"));
        assert!(cmds
            .iter()
            .any(|c| matches!(c, DrawCmd::Rect { color, .. } if *color == palette::OVERLAY)));
    }

    #[test]
    fn test_pipe_with_unknown_logo_still_draws() {
        let mut sim = sim();
        sim.start();
        let mut state = sim.state().clone();
        state.obstacles.push(Obstacle {
            id: 99,
            x: 200.0,
            kind: ObstacleKind::GapPipe {
                width: 60.0,
                gap_y: 100.0,
                gap_height: 180.0,
                logos_top: vec![LogoId(42)],
                logos_bottom: Vec::new(),
            },
        });
        let logos = LogoCatalog::from_names(Vec::<String>::new());
        let mut snap = sim.snapshot();
        snap.state = &state;
        snap.logos = &logos;

        let cmds = build_frame(&snap, &FrameStyle::default());
        let solids = cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Rect { color, .. } if *color == palette::PIPE_FRAME))
            .count();
        assert_eq!(solids, 2);
        assert!(cmds.iter().any(|c| matches!(
            c,
            DrawCmd::Sprite { asset, fallback, .. } if asset.is_empty() && *fallback == palette::COIN
        )));
    }

    #[test]
    fn test_cake_screen_hides_playfield() {
        let mut sim = sim();
        sim.start();
        let mut state = sim.state().clone();
        state.is_final_cake_shown = true;
        let mut snap = sim.snapshot();
        snap.state = &state;
        snap.celebration = CelebrationStage::Cake;
        snap.cake_opacity = 0.5;

        let cmds = build_frame(&snap, &FrameStyle::default());
        assert!(sprites(&cmds, "player").is_empty());
        assert!(has_text(&cmds, "Happy Birthday"));
        let button = cmds.iter().find_map(|c| match c {
            DrawCmd::Rect { rect, color } if color[3] == 0.5 => Some(*rect),
            _ => None,
        });
        assert_eq!(button, Some(celebrate_button(400.0, 600.0)));
    }

    #[test]
    fn test_bowl_shows_dropped_ingredients() {
        let mut sim = sim();
        sim.start();
        let mut state = sim.state().clone();
        state.is_final_cake_shown = true;
        let collected = sim.catalog().ids().collect();
        let mut snap = sim.snapshot();
        snap.state = &state;
        snap.collected = &collected;
        snap.celebration = CelebrationStage::Dropping { dropped: 2 };
        snap.dropped = 2;
        snap.cake_opacity = 1.0;

        let cmds = build_frame(&snap, &FrameStyle::default());
        assert_eq!(sprites(&cmds, "ingredients/").len(), 2);
        assert_eq!(sprites(&cmds, "bowl").len(), 1);
    }
}
