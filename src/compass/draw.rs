//! Draw commands emitted by the compositor.
//!
//! The compositor's only side effect is filling [`CompassDrawList`] with an
//! ordered list of textured rectangles; later commands draw on top of earlier
//! ones. The presenter turns the list into UI nodes.

use bevy::prelude::*;

/// One textured rectangle: screen rect (UI pixels, origin top-left), image,
/// and a color whose alpha is the composite opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub rect: Rect,
    pub image: Handle<Image>,
    pub color: Color,
}

impl DrawCommand {
    pub fn full_texture(rect: Rect, image: Handle<Image>, color: Color) -> Self {
        Self { rect, image, color }
    }
}

/// The current frame's draw set, rebuilt from scratch every frame the overlay
/// is visible and cleared whenever it is not.
#[derive(Resource, Debug, Default)]
pub struct CompassDrawList {
    commands: Vec<DrawCommand>,
}

impl CompassDrawList {
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
