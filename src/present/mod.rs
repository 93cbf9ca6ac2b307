//! Turns a mapped perimeter position into a window placement and a list of
//! draw commands. Nothing here touches the window or the GPU.

pub mod message;

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Affine2, Vec2};

use crate::config::MascotConfig;
use crate::perimeter::{Edge, PerimeterState};

use self::message::MessageSlot;

/// Every image the presentation layer can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    WalkA,
    WalkB,
    WalkC,
    Bubble,
}

impl SpriteId {
    pub const ALL: [SpriteId; 4] = [
        SpriteId::WalkA,
        SpriteId::WalkB,
        SpriteId::WalkC,
        SpriteId::Bubble,
    ];

    /// File name inside the asset directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SpriteId::WalkA => "walk1.png",
            SpriteId::WalkB => "walk2.png",
            SpriteId::WalkC => "walk3.png",
            SpriteId::Bubble => "bubble.png",
        }
    }
}

/// Walking pose for a tick: A, B, C, B, each held `frames_per_step` ticks.
pub fn gait_sprite(frame_counter: u64, frames_per_step: u64) -> SpriteId {
    match (frame_counter / frames_per_step) % 4 {
        0 => SpriteId::WalkA,
        2 => SpriteId::WalkC,
        _ => SpriteId::WalkB,
    }
}

/// Presentation-owned per-tick state.
#[derive(Debug, Clone, Default)]
pub struct AnimationState {
    pub frame_counter: u64,
    pub message: MessageSlot,
}

impl AnimationState {
    pub fn new(message: MessageSlot) -> Self {
        Self {
            frame_counter: 0,
            message,
        }
    }

    pub fn tick(&mut self) {
        self.frame_counter += 1;
    }
}

/// Pixel sizes of the decoded sprites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSizes {
    pub walk: [Vec2; 3],
    pub bubble: Vec2,
}

impl SpriteSizes {
    pub fn get(&self, id: SpriteId) -> Vec2 {
        match id {
            SpriteId::WalkA => self.walk[0],
            SpriteId::WalkB => self.walk[1],
            SpriteId::WalkC => self.walk[2],
            SpriteId::Bubble => self.bubble,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Composite a sprite; `transform` maps sprite pixels to window pixels.
    Sprite { sprite: SpriteId, transform: Affine2 },
    /// Draw wrapped text with its top-left at `origin` (window pixels).
    Text {
        text: Arc<str>,
        origin: Vec2,
        font_size: f32,
        wrap_width: f32,
    },
}

/// Output of one render call.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Top-left of the hosting window on screen, in pixels.
    pub window_position: (i32, i32),
    pub commands: Vec<DrawCommand>,
}

/// Rotation that keeps the sprite upright relative to `edge`.
pub fn edge_rotation(edge: Edge) -> f32 {
    -(edge.index() as f32) * FRAC_PI_2
}

/// Half-extents of a `size` rectangle's bounding box after rotating by `theta`.
fn rotated_half_extents(size: Vec2, theta: f32) -> Vec2 {
    let (sin, cos) = theta.sin_cos();
    let half = size / 2.0;
    Vec2::new(
        (half.x * cos).abs() + (half.y * sin).abs(),
        (half.x * sin).abs() + (half.y * cos).abs(),
    )
}

/// Place a walking sprite inside the window.
///
/// The sprite is rotated about its centre so its feet face `edge`, then
/// pinned against the window side that touches that screen edge. When
/// walking backward it is mirrored along the direction of travel.
pub fn sprite_transform(edge: Edge, reversed: bool, sprite: Vec2, window: Vec2) -> Affine2 {
    let theta = edge_rotation(edge);
    let half = rotated_half_extents(sprite, theta);
    let bbox = half * 2.0;

    let anchor = match edge {
        Edge::Bottom => Vec2::new(0.0, window.y - bbox.y),
        Edge::Right => Vec2::new(window.x - bbox.x, 0.0),
        Edge::Top | Edge::Left => Vec2::ZERO,
    };

    let mut m = Affine2::from_translation(anchor + half)
        * Affine2::from_angle(theta)
        * Affine2::from_translation(-sprite / 2.0);

    if reversed {
        let centre = anchor + half;
        let flip = if edge.is_horizontal() {
            Vec2::new(-1.0, 1.0)
        } else {
            Vec2::new(1.0, -1.0)
        };
        m = Affine2::from_translation(centre)
            * Affine2::from_scale(flip)
            * Affine2::from_translation(-centre)
            * m;
    }
    m
}

/// Where the speech bubble's top-left goes, relative to the walker size.
fn bubble_anchor(edge: Edge, walker: Vec2) -> Vec2 {
    match edge {
        Edge::Bottom => Vec2::new(walker.x * 3.0 / 5.0, walker.y),
        Edge::Right | Edge::Left => Vec2::new(walker.x / 2.0, walker.y),
        Edge::Top => Vec2::new(walker.x / 2.0, walker.y * 5.0 / 4.0),
    }
}

pub fn bubble_transform(edge: Edge, walker: Vec2, scale: f32) -> Affine2 {
    Affine2::from_scale(Vec2::splat(scale)) * Affine2::from_translation(bubble_anchor(edge, walker))
}

/// Builds a [`Frame`] every tick from the mapped position.
pub struct Presenter {
    window: Vec2,
    window_height: u32,
    sizes: SpriteSizes,
    frames_per_step: u64,
    bubble_scale: f32,
    text_inset: Vec2,
    font_size: f32,
}

impl Presenter {
    pub fn new(config: &MascotConfig, sizes: SpriteSizes) -> Self {
        Self {
            window: Vec2::new(config.window_width as f32, config.window_height as f32),
            window_height: config.window_height,
            sizes,
            frames_per_step: config.frames_per_step,
            bubble_scale: config.bubble_scale,
            text_inset: config.text_inset,
            font_size: config.font_size,
        }
    }

    pub fn render(
        &self,
        perimeter: &PerimeterState,
        animation: &AnimationState,
        screen_h: u32,
    ) -> Frame {
        let sprite = gait_sprite(animation.frame_counter, self.frames_per_step);
        let walker = self.sizes.get(sprite);

        let mut commands = Vec::with_capacity(3);
        commands.push(DrawCommand::Sprite {
            sprite,
            transform: sprite_transform(
                perimeter.edge,
                perimeter.facing_reversed,
                walker,
                self.window,
            ),
        });

        if let Some(text) = animation.message.get() {
            let transform = bubble_transform(perimeter.edge, walker, self.bubble_scale);
            let wrap = (self.sizes.bubble.x - 2.0 * self.text_inset.x).max(1.0);
            commands.push(DrawCommand::Sprite {
                sprite: SpriteId::Bubble,
                transform,
            });
            commands.push(DrawCommand::Text {
                text,
                origin: transform.transform_point2(self.text_inset),
                font_size: self.font_size * self.bubble_scale,
                wrap_width: wrap * self.bubble_scale,
            });
        }

        Frame {
            window_position: perimeter.window_position(screen_h, self.window_height),
            commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perimeter::PerimeterBounds;

    const SPRITE: Vec2 = Vec2::new(200.0, 200.0);
    const WINDOW: Vec2 = Vec2::new(240.0, 280.0);

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < 1e-3
    }

    fn feet(m: Affine2) -> Vec2 {
        m.transform_point2(Vec2::new(SPRITE.x / 2.0, SPRITE.y))
    }

    fn front(m: Affine2) -> Vec2 {
        m.transform_point2(Vec2::new(SPRITE.x, SPRITE.y / 2.0))
    }

    fn sizes() -> SpriteSizes {
        SpriteSizes {
            walk: [SPRITE; 3],
            bubble: Vec2::new(300.0, 200.0),
        }
    }

    #[test]
    fn gait_is_asymmetric() {
        use SpriteId::*;
        let seq: Vec<_> = (0..12).map(|n| gait_sprite(n, 3)).collect();
        assert_eq!(seq, [WalkA, WalkA, WalkA, WalkB, WalkB, WalkB, WalkC, WalkC, WalkC, WalkB, WalkB, WalkB]);
        assert_eq!(gait_sprite(12, 3), WalkA);
    }

    #[test]
    fn rotation_is_a_quarter_turn_counter_clockwise_per_edge() {
        assert_eq!(edge_rotation(Edge::Bottom), 0.0);
        assert!((edge_rotation(Edge::Right) + FRAC_PI_2).abs() < 1e-6);
        assert!((edge_rotation(Edge::Left) + 3.0 * FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn feet_touch_the_window_side_on_the_screen_edge() {
        let m = sprite_transform(Edge::Bottom, false, SPRITE, WINDOW);
        assert!(close(feet(m), Vec2::new(100.0, 280.0)));
        let m = sprite_transform(Edge::Right, false, SPRITE, WINDOW);
        assert!(close(feet(m), Vec2::new(240.0, 100.0)));
        let m = sprite_transform(Edge::Top, false, SPRITE, WINDOW);
        assert!(close(feet(m), Vec2::new(100.0, 0.0)));
        let m = sprite_transform(Edge::Left, false, SPRITE, WINDOW);
        assert!(close(feet(m), Vec2::new(0.0, 100.0)));
    }

    #[test]
    fn sprite_stays_inside_the_window() {
        for edge in Edge::ALL {
            for reversed in [false, true] {
                let m = sprite_transform(edge, reversed, SPRITE, WINDOW);
                for corner in [Vec2::ZERO, Vec2::X * SPRITE.x, Vec2::Y * SPRITE.y, SPRITE] {
                    let p = m.transform_point2(corner);
                    assert!(p.x > -1e-3 && p.x < WINDOW.x + 1e-3, "{edge:?} {p}");
                    assert!(p.y > -1e-3 && p.y < WINDOW.y + 1e-3, "{edge:?} {p}");
                }
            }
        }
    }

    #[test]
    fn front_faces_the_direction_of_travel() {
        // Clockwise: right along the bottom, up the right side.
        let m = sprite_transform(Edge::Bottom, false, SPRITE, WINDOW);
        assert!(close(front(m), Vec2::new(200.0, 180.0)));
        let m = sprite_transform(Edge::Bottom, true, SPRITE, WINDOW);
        assert!(close(front(m), Vec2::new(0.0, 180.0)));

        let m = sprite_transform(Edge::Right, false, SPRITE, WINDOW);
        assert!(close(front(m), Vec2::new(140.0, 0.0)));
        let m = sprite_transform(Edge::Right, true, SPRITE, WINDOW);
        assert!(close(front(m), Vec2::new(140.0, 200.0)));
    }

    #[test]
    fn mirroring_keeps_the_feet_in_place() {
        for edge in Edge::ALL {
            let a = sprite_transform(edge, false, SPRITE, WINDOW);
            let b = sprite_transform(edge, true, SPRITE, WINDOW);
            assert!(close(feet(a), feet(b)), "{edge:?}");
        }
    }

    #[test]
    fn non_square_sprites_rotate_into_their_own_bounding_box() {
        let tall = Vec2::new(100.0, 200.0);
        let m = sprite_transform(Edge::Right, false, tall, WINDOW);
        // Rotated it is 200 wide, pinned to the right side.
        let xs: Vec<f32> = [Vec2::ZERO, Vec2::X * 100.0, Vec2::Y * 200.0, tall]
            .iter()
            .map(|&c| m.transform_point2(c).x)
            .collect();
        let min = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert!((min - 40.0).abs() < 1e-3 && (max - 240.0).abs() < 1e-3);
    }

    #[test]
    fn bubble_anchor_presets_are_scaled() {
        let m = bubble_transform(Edge::Bottom, SPRITE, 0.8);
        assert!(close(m.transform_point2(Vec2::ZERO), Vec2::new(96.0, 160.0)));
        let m = bubble_transform(Edge::Top, SPRITE, 0.8);
        assert!(close(m.transform_point2(Vec2::ZERO), Vec2::new(80.0, 200.0)));
    }

    #[test]
    fn render_without_message_draws_only_the_walker() {
        let config = MascotConfig::default();
        let presenter = Presenter::new(&config, sizes());
        let bounds = PerimeterBounds::new(1920, 1080, 240, 280).unwrap();
        let anim = AnimationState::new(MessageSlot::new());

        let frame = presenter.render(&bounds.map(1600, 0, 64), &anim, 1080);
        assert_eq!(frame.window_position, (100, 800));
        assert_eq!(frame.commands.len(), 1);
        assert!(matches!(
            frame.commands[0],
            DrawCommand::Sprite { sprite: SpriteId::WalkA, .. }
        ));
    }

    #[test]
    fn render_with_message_adds_bubble_and_text() {
        let config = MascotConfig::default();
        let presenter = Presenter::new(&config, sizes());
        let bounds = PerimeterBounds::new(1920, 1080, 240, 280).unwrap();
        let slot = MessageSlot::new();
        slot.set("Hello");
        let mut anim = AnimationState::new(slot);
        for _ in 0..3 {
            anim.tick();
        }

        let frame = presenter.render(&bounds.map(0, 0, 64), &anim, 1080);
        assert_eq!(frame.commands.len(), 3);
        assert!(matches!(
            frame.commands[0],
            DrawCommand::Sprite { sprite: SpriteId::WalkB, .. }
        ));
        assert!(matches!(
            frame.commands[1],
            DrawCommand::Sprite { sprite: SpriteId::Bubble, .. }
        ));
        match &frame.commands[2] {
            DrawCommand::Text {
                text,
                origin,
                font_size,
                wrap_width,
            } => {
                assert_eq!(&**text, "Hello");
                // (120 + 40, 200 + 60) scaled by 0.8.
                assert!(close(*origin, Vec2::new(128.0, 208.0)));
                assert!((font_size - 19.2).abs() < 1e-4);
                assert!((wrap_width - 176.0).abs() < 1e-3);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }
}
