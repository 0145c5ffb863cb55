//! Recursive `relative_to` container resolution.
//!
//! Each element resolves inside a container stack: the root canvas box,
//! every ancestor named through the `relative_to` chain, then its own box.
//! Box coordinates stay parent-relative; the renderer translates by the
//! accumulated origin of every ancestor. Chains are re-resolved on demand
//! with an explicit visiting set so a loop fails fast with
//! [`PlacardError::Cycle`] instead of recursing forever.

use crate::config::model::{Element, ElementConfig, ElementKind};
use crate::foundation::core::{ElementBox, Size, Vec2};
use crate::foundation::error::{PlacardError, PlacardResult};
use crate::layout::resolver::{resolve_box, resolve_line_geometry};
use crate::render::backend::Surface2D;
use crate::text::shaper;

/// Find the draw-list index of the first node carrying `id`.
pub(crate) fn find_by_id(elements: &[Element], id: &str) -> Option<usize> {
    elements.iter().position(|e| match e {
        Element::Node(cfg) => cfg.id.as_deref() == Some(id),
        Element::Custom(_) => false,
    })
}

/// Resolve the container stack for `elements[index]`.
///
/// The returned stack starts at the root canvas box and ends with the
/// element's own (parent-relative) box. `resolving` carries the indices
/// currently being resolved further up the call chain.
pub(crate) fn resolve_stack(
    elements: &[Element],
    canvas: Size,
    index: usize,
    surface: &mut dyn Surface2D,
    resolving: &mut Vec<usize>,
) -> PlacardResult<Vec<ElementBox>> {
    let Some(Element::Node(cfg)) = elements.get(index) else {
        return Ok(vec![root_box(canvas)]);
    };

    if resolving.contains(&index) {
        return Err(PlacardError::Cycle(cfg.label(index)));
    }
    resolving.push(index);
    let result = resolve_stack_inner(elements, canvas, index, cfg, surface, resolving);
    resolving.pop();
    result
}

fn resolve_stack_inner(
    elements: &[Element],
    canvas: Size,
    index: usize,
    cfg: &ElementConfig,
    surface: &mut dyn Surface2D,
    resolving: &mut Vec<usize>,
) -> PlacardResult<Vec<ElementBox>> {
    // Lines live in canvas space; relative_to never applies to them.
    if let ElementKind::Line(line) = &cfg.kind {
        return Ok(vec![root_box(canvas), resolve_line_geometry(line, canvas).bounds]);
    }

    let mut stack = vec![root_box(canvas)];
    if let Some(target) = cfg.relative_to.as_deref() {
        match find_by_id(elements, target) {
            Some(target_index) if target_index != index => {
                stack = resolve_stack(elements, canvas, target_index, surface, resolving)?;
            }
            Some(_) => {
                return Err(PlacardError::Cycle(cfg.label(index)));
            }
            None => {
                tracing::warn!(
                    element = %cfg.label(index),
                    target,
                    "relativeTo target not found, resolving against canvas"
                );
            }
        }
    }

    let parent = stack.last().copied().unwrap_or_else(|| root_box(canvas));
    let own = resolve_own_box(cfg, parent.size(), surface)?;
    stack.push(own);
    Ok(stack)
}

/// Resolve an element's own box against its parent container.
///
/// Text boxes with no vertical extent constraint take their height from the
/// measured, wrapped content.
fn resolve_own_box(
    cfg: &ElementConfig,
    parent: Size,
    surface: &mut dyn Surface2D,
) -> PlacardResult<ElementBox> {
    let mut own = resolve_box(&cfg.box_props, parent);
    if let ElementKind::Text(text) = &cfg.kind
        && cfg.box_props.height.is_none()
        && cfg.box_props.bottom.is_none()
    {
        let measured = shaper::measure_height(surface, text, own.width)?;
        own = ElementBox::new(own.x, own.y, own.width, measured);
    }
    Ok(own)
}

/// Sum of the origins of every ancestor box in a resolved stack.
///
/// The element's own box (the last entry) stays parent-relative; the result
/// is the translation that maps it into canvas space.
pub(crate) fn stack_offset(stack: &[ElementBox]) -> Vec2 {
    let n = stack.len().saturating_sub(1);
    stack[..n]
        .iter()
        .fold(Vec2::ZERO, |acc, b| acc + Vec2::new(b.x, b.y))
}

fn root_box(canvas: Size) -> ElementBox {
    ElementBox::new(0.0, 0.0, canvas.width, canvas.height)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/container.rs"]
mod tests;
