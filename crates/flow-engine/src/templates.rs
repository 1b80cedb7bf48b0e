//! Declarative multi-node templates
//!
//! A template is a recipe of node specs (positions relative to the drop
//! point) and edge specs that reference those nodes by index. Indices are
//! only resolved at expansion time, after all nodes of the recipe exist.

use crate::registry::NodeKind;
use crate::types::Position;

/// One node of a template, positioned relative to the drop point.
#[derive(Debug, Clone)]
pub struct TemplateNodeSpec {
    pub kind: NodeKind,
    pub label: &'static str,
    pub offset: Position,
}

/// One edge of a template, referencing nodes by recipe index.
///
/// Handles default to the plain output/input pair when omitted.
#[derive(Debug, Clone)]
pub struct TemplateEdgeSpec {
    pub source_idx: usize,
    pub target_idx: usize,
    pub source_handle: Option<&'static str>,
    pub target_handle: Option<&'static str>,
}

/// A multi-node recipe instantiated as a unit.
#[derive(Debug, Clone)]
pub struct NodeTemplate {
    pub key: &'static str,
    pub display: &'static str,
    pub display_cn: &'static str,
    pub description: &'static str,
    pub nodes: Vec<TemplateNodeSpec>,
    pub edges: Vec<TemplateEdgeSpec>,
}

/// Whether a palette type name refers to a template.
pub fn is_template(key: &str) -> bool {
    template(key).is_some()
}

/// Look up a template recipe by key.
///
/// Recipes are built per call; expansion mutates nothing shared.
pub fn template(key: &str) -> Option<NodeTemplate> {
    match key {
        "template_1" => Some(vision_loop()),
        _ => None,
    }
}

/// Loop -> Screenshot -> Detect -> If -> Click, with the click chaining
/// back into the loop's end handle.
fn vision_loop() -> NodeTemplate {
    NodeTemplate {
        key: "template_1",
        display: "Vision Loop Template",
        display_cn: "视觉循环模板",
        description: "Loop -> Screenshot -> Detect -> Click",
        nodes: vec![
            TemplateNodeSpec {
                kind: NodeKind::Loop,
                label: "循环",
                offset: Position::new(0.0, 0.0),
            },
            TemplateNodeSpec {
                kind: NodeKind::Capture,
                label: "截图",
                offset: Position::new(0.0, 100.0),
            },
            TemplateNodeSpec {
                kind: NodeKind::Detect,
                label: "检测",
                offset: Position::new(0.0, 200.0),
            },
            TemplateNodeSpec {
                kind: NodeKind::If,
                label: "是否成功",
                offset: Position::new(0.0, 300.0),
            },
            TemplateNodeSpec {
                kind: NodeKind::Click,
                label: "点击",
                offset: Position::new(0.0, 400.0),
            },
        ],
        edges: vec![
            TemplateEdgeSpec {
                source_idx: 0,
                target_idx: 1,
                source_handle: Some("loopStart"),
                target_handle: None,
            },
            TemplateEdgeSpec {
                source_idx: 1,
                target_idx: 2,
                source_handle: None,
                target_handle: None,
            },
            TemplateEdgeSpec {
                source_idx: 2,
                target_idx: 3,
                source_handle: None,
                target_handle: None,
            },
            TemplateEdgeSpec {
                source_idx: 3,
                target_idx: 4,
                source_handle: Some("ifTrue"),
                target_handle: None,
            },
            TemplateEdgeSpec {
                source_idx: 4,
                target_idx: 0,
                source_handle: None,
                target_handle: Some("loopEnd"),
            },
        ],
    }
}
