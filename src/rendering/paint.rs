//! Paint command set: the visual tree lowered to drawing primitives

use crate::ingest::EmbeddableImage;
use crate::rendering::layout::{Content, Fill, Rect, TextRun, VisualTree};
use crate::rendering::palette::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    FillRoundedRect {
        rect: Rect,
        radius: u32,
        fill: Fill,
    },
    StrokeRoundedRect {
        rect: Rect,
        radius: u32,
        width: u32,
        color: Color,
    },
    FillDisc {
        rect: Rect,
        color: Color,
    },
    Text {
        x: i32,
        y: i32,
        run: TextRun,
    },
    Image {
        rect: Rect,
        radius: u32,
        image: EmbeddableImage,
    },
}

/// Lower `tree` into commands, preserving paint order. A box paints its
/// fill before its border.
pub fn paint_commands(tree: &VisualTree) -> Vec<PaintCommand> {
    let mut out = Vec::with_capacity(tree.nodes.len() + 8);
    for node in &tree.nodes {
        match &node.content {
            Content::Box(style) => {
                if let Some(fill) = &style.fill {
                    out.push(PaintCommand::FillRoundedRect {
                        rect: node.rect,
                        radius: style.radius,
                        fill: fill.clone(),
                    });
                }
                if let Some((width, color)) = style.border {
                    out.push(PaintCommand::StrokeRoundedRect {
                        rect: node.rect,
                        radius: style.radius,
                        width,
                        color,
                    });
                }
            }
            Content::Disc(color) => out.push(PaintCommand::FillDisc {
                rect: node.rect,
                color: *color,
            }),
            Content::Text(run) => {
                if !run.text.is_empty() {
                    out.push(PaintCommand::Text {
                        x: node.rect.x,
                        y: node.rect.y,
                        run: run.clone(),
                    });
                }
            }
            Content::Image { image, radius } => out.push(PaintCommand::Image {
                rect: node.rect,
                radius: *radius,
                image: image.clone(),
            }),
        }
    }
    out
}
