//! Layered composition of configuration documents.
//!
//! Composition is plain concatenation: present layers are joined with one
//! blank line in the configured order. Nothing is deduplicated, so if two
//! layers assign the same key both lines are kept and the downstream tool's
//! own precedence applies. That makes the layer order part of the output.

use std::borrow::Cow;

use tracing::debug;

use crate::config::ConfigFragment;

/// A composable configuration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Defaults generated for the platform and deployment unit.
    Generated,
    /// Board quirks from the [`BoardQuirkTable`](crate::board::BoardQuirkTable).
    Board,
}

/// Joins configuration layers in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigComposer {
    order: Vec<Layer>,
}

impl Default for ConfigComposer {
    fn default() -> Self {
        Self {
            order: vec![Layer::Generated, Layer::Board],
        }
    }
}

impl ConfigComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A composer with an explicit layer order. Layers left out are dropped.
    pub fn with_order(order: impl Into<Vec<Layer>>) -> Self {
        Self {
            order: order.into(),
        }
    }

    pub fn order(&self) -> &[Layer] {
        &self.order
    }

    /// Join the present layers with a blank line between them.
    ///
    /// Empty layers are skipped. The result ends with exactly one newline,
    /// or is empty when no layer has content.
    pub fn compose(&self, generated: &ConfigFragment, board: Option<&ConfigFragment>) -> String {
        let rendered: Vec<String> = self
            .order
            .iter()
            .filter_map(|layer| match layer {
                Layer::Generated => Some(generated),
                Layer::Board => board,
            })
            .filter(|fragment| !fragment.is_empty())
            .map(|fragment| fragment.render().trim_end_matches('\n').to_string())
            .filter(|text| !text.is_empty())
            .collect();
        if rendered.is_empty() {
            return String::new();
        }
        let mut out = rendered.join("\n\n");
        out.push('\n');
        out
    }
}

/// Append a user-provided workspace overlay to generated content.
///
/// Returns `generated` unchanged (borrowed) when the overlay is absent or
/// blank. Otherwise the overlay follows the generated content verbatim,
/// behind a separator block naming `label` as user-provided.
pub fn merge_with_workspace_overlay<'a>(
    generated: &'a str,
    overlay: Option<&str>,
    label: &str,
) -> Cow<'a, str> {
    let overlay = match overlay {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            debug!(label, "no workspace overlay to merge");
            return Cow::Borrowed(generated);
        }
    };
    debug!(label, bytes = overlay.len(), "merging workspace overlay");
    let mut out = String::with_capacity(generated.len() + overlay.len() + 128);
    out.push_str(generated.trim_end());
    out.push_str(&format!("\n\n# ---- User-provided {label} overlay ----\n"));
    out.push_str("# Copied verbatim from the workspace. Edit the workspace file instead;\n");
    out.push_str("# hand-edits to the generated section above are lost on regeneration.\n");
    out.push_str(overlay);
    if !overlay.ends_with('\n') {
        out.push('\n');
    }
    Cow::Owned(out)
}
