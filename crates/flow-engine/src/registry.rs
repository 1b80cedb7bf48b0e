//! Node type registry: kinds, default configuration, display metadata
//!
//! The type set is a closed enum with one default constructor per kind;
//! [`NodeKind::Other`] carries unrecognized type names through the editor
//! untouched, so unknown types degrade to a bare `{type}` shape instead of
//! failing.

use serde::{Deserialize, Serialize};

/// Behavioral kind of a node.
///
/// `start` and `end` are reserved and structurally protected; `Other`
/// carries any unrecognized type name through the editor untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Click,
    Wait,
    Swipe,
    If,
    Capture,
    Detect,
    Ocr,
    Variable,
    Filter,
    Loop,
    Fallback,
    Subflow,
    Macro1,
    Start,
    End,
    Other(String),
}

impl NodeKind {
    /// Resolve a type name. Never fails: unknown names become `Other`.
    ///
    /// `"input"` is a legacy alias for `start`.
    pub fn parse(name: &str) -> Self {
        match name {
            "click" => Self::Click,
            "wait" => Self::Wait,
            "swipe" => Self::Swipe,
            "if" => Self::If,
            "capture" => Self::Capture,
            "detect" => Self::Detect,
            "ocr" => Self::Ocr,
            "variable" => Self::Variable,
            "filter" => Self::Filter,
            "loop" => Self::Loop,
            "fallback" => Self::Fallback,
            "subflow" => Self::Subflow,
            "macro_1" => Self::Macro1,
            "start" | "input" => Self::Start,
            "end" => Self::End,
            other => Self::Other(other.to_string()),
        }
    }

    /// The canonical type name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Wait => "wait",
            Self::Swipe => "swipe",
            Self::If => "if",
            Self::Capture => "capture",
            Self::Detect => "detect",
            Self::Ocr => "ocr",
            Self::Variable => "variable",
            Self::Filter => "filter",
            Self::Loop => "loop",
            Self::Fallback => "fallback",
            Self::Subflow => "subflow",
            Self::Macro1 => "macro_1",
            Self::Start => "start",
            Self::End => "end",
            Self::Other(name) => name,
        }
    }

    /// Start/end nodes can never be deleted from a task.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Start | Self::End)
    }

    /// The handle a sequentially-chained edge leaves this node from.
    ///
    /// Auto-connection on insert only happens when this is the plain
    /// `output` handle; branching and loop entries are left to explicit
    /// gestures.
    pub fn chain_out_handle(&self) -> Option<&'static str> {
        match self {
            Self::End | Self::Other(_) => None,
            Self::If => Some("ifTrue"),
            Self::Loop => Some("loopStart"),
            _ => Some("output"),
        }
    }

    /// Build the default configuration for this kind.
    pub fn defaults(&self) -> NodeData {
        match self {
            Self::Click => NodeData::Click {
                target_type: "coordinates".to_string(),
                x: 0.0,
                y: 0.0,
                target: String::new(),
            },
            Self::Wait => NodeData::Wait {
                duration: 1000,
                randomize: false,
            },
            Self::Swipe => NodeData::Swipe {
                start_x: 0.0,
                start_y: 0.0,
                end_x: 0.0,
                end_y: 0.0,
                duration: 1000,
            },
            Self::If => NodeData::If {
                search_type: "image".to_string(),
                target: String::new(),
                confidence: 80,
                timeout: 5000,
            },
            Self::Capture => NodeData::Capture {
                output_var: "last_capture".to_string(),
            },
            Self::Detect => NodeData::Detect {
                image_path: String::new(),
                confidence: 80,
                result_var: String::new(),
            },
            Self::Ocr => NodeData::Ocr {
                region_x: None,
                region_y: None,
                region_w: None,
                region_h: None,
                result_var: String::new(),
            },
            Self::Variable => NodeData::Variable {
                var_name: String::new(),
                op_type: "set".to_string(),
                expression: String::new(),
            },
            Self::Filter => NodeData::Filter {
                source_var: String::new(),
                target_var: String::new(),
                mode: "filter".to_string(),
                logic: String::new(),
            },
            Self::Loop => NodeData::Loop {
                count: 3,
                loop_type: "count".to_string(),
                break_condition: String::new(),
            },
            Self::Fallback => NodeData::Fallback {
                max_retries: 3,
                strategies: default_fallback_strategies(),
            },
            Self::Subflow => NodeData::Subflow {
                target_task_id: None,
                wait_for_complete: true,
            },
            Self::Macro1 => NodeData::Macro1 {
                screenshot: true,
                detect_target: String::new(),
                confidence: 80,
                click_type: "coordinates".to_string(),
                post_process: String::new(),
            },
            Self::Start => NodeData::Start,
            Self::End => NodeData::End,
            Self::Other(name) => NodeData::Generic {
                node_type: name.clone(),
            },
        }
    }

    /// Display metadata for the toolbox and canvas.
    pub fn meta(&self) -> NodeMeta {
        match self {
            Self::Click => NodeMeta {
                display: "Click",
                display_cn: "点击",
                category: NodeCategory::Basic,
                icon: "cursor",
                color: "bg-blue-500",
                placeholder: "Set click target...",
                description: "Click on a target",
            },
            Self::Wait => NodeMeta {
                display: "Wait",
                display_cn: "等待",
                category: NodeCategory::Basic,
                icon: "clock",
                color: "bg-gray-500",
                placeholder: "Set wait duration...",
                description: "Wait for duration",
            },
            Self::Swipe => NodeMeta {
                display: "Swipe",
                display_cn: "滑动",
                category: NodeCategory::Basic,
                icon: "move",
                color: "bg-cyan-500",
                placeholder: "Set swipe gesture...",
                description: "Swipe gesture",
            },
            Self::If => NodeMeta {
                display: "IF Found",
                display_cn: "判断",
                category: NodeCategory::Condition,
                icon: "branch",
                color: "bg-yellow-500",
                placeholder: "Set search target...",
                description: "If condition met, then...",
            },
            Self::Capture => NodeMeta {
                display: "Screenshot",
                display_cn: "截图",
                category: NodeCategory::Vision,
                icon: "camera",
                color: "bg-slate-500",
                placeholder: "Save to variable...",
                description: "Capture screen to variable",
            },
            Self::Detect => NodeMeta {
                display: "Find Image",
                display_cn: "目标检测",
                category: NodeCategory::Vision,
                icon: "target",
                color: "bg-purple-500",
                placeholder: "Select image...",
                description: "Locate image on screen",
            },
            Self::Ocr => NodeMeta {
                display: "OCR",
                display_cn: "文字识别",
                category: NodeCategory::Vision,
                icon: "type",
                color: "bg-violet-500",
                placeholder: "Set OCR region...",
                description: "Recognize text",
            },
            Self::Variable => NodeMeta {
                display: "Variable",
                display_cn: "变量",
                category: NodeCategory::Data,
                icon: "variable",
                color: "bg-orange-500",
                placeholder: "Expression...",
                description: "Process data / set variable",
            },
            Self::Filter => NodeMeta {
                display: "Filter/Map",
                display_cn: "数据过滤",
                category: NodeCategory::Data,
                icon: "filter",
                color: "bg-orange-400",
                placeholder: "Filter or transform...",
                description: "Filter or Map array data",
            },
            Self::Loop => NodeMeta {
                display: "Loop",
                display_cn: "循环",
                category: NodeCategory::Control,
                icon: "repeat",
                color: "bg-green-500",
                placeholder: "Configure loop...",
                description: "Repeat N times",
            },
            Self::Fallback => NodeMeta {
                display: "Fallback",
                display_cn: "回调",
                category: NodeCategory::Control,
                icon: "alert-triangle",
                color: "bg-red-500",
                placeholder: "Fallback actions",
                description: "Retry actions when all conditions fail",
            },
            Self::Subflow => NodeMeta {
                display: "Sub-Flow",
                display_cn: "子流程",
                category: NodeCategory::Control,
                icon: "git-branch",
                color: "bg-pink-500",
                placeholder: "Select sub-flow...",
                description: "Call another task's flow",
            },
            Self::Macro1 => NodeMeta {
                display: "Smart Click",
                display_cn: "宏点击（截图|检测|点击）",
                category: NodeCategory::Composite,
                icon: "zap",
                color: "bg-amber-600",
                placeholder: "Unified action configuration",
                description: "Unified: Capture -> Detect -> Click",
            },
            Self::Start => NodeMeta {
                display: "Start",
                display_cn: "开始",
                category: NodeCategory::Special,
                icon: "play",
                color: "bg-emerald-600",
                placeholder: "开始",
                description: "Start node",
            },
            Self::End => NodeMeta {
                display: "End",
                display_cn: "结束",
                category: NodeCategory::Special,
                icon: "square",
                color: "bg-rose-600",
                placeholder: "结束",
                description: "End node",
            },
            Self::Other(_) => NodeMeta {
                display: "Node",
                display_cn: "节点",
                category: NodeCategory::Special,
                icon: "box",
                color: "bg-neutral",
                placeholder: "无描述",
                description: "",
            },
        }
    }

    /// Category shortcut (see [`NodeKind::meta`]).
    pub fn category(&self) -> NodeCategory {
        self.meta().category
    }
}

/// Category of a node, used to group the toolbox palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    Basic,
    Condition,
    Vision,
    Data,
    Control,
    Composite,
    Special,
}

/// Display metadata for one node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMeta {
    pub display: &'static str,
    pub display_cn: &'static str,
    pub category: NodeCategory,
    pub icon: &'static str,
    pub color: &'static str,
    pub placeholder: &'static str,
    pub description: &'static str,
}

/// Toolbox palette: categories in display order with their type names.
///
/// Entries are type names rather than kinds because the composite group
/// also lists template keys, which expand to several nodes at once.
pub fn palette() -> &'static [(NodeCategory, &'static [&'static str])] {
    &[
        (NodeCategory::Basic, &["click", "wait", "swipe"]),
        (NodeCategory::Condition, &["if"]),
        (NodeCategory::Vision, &["capture", "detect", "ocr"]),
        (NodeCategory::Data, &["variable", "filter"]),
        (NodeCategory::Control, &["loop", "fallback", "subflow"]),
        (NodeCategory::Composite, &["macro_1", "template_1"]),
    ]
}

/// One retry strategy of a fallback node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackStrategy {
    pub target: String,
    pub action: String,
    pub label: String,
}

/// Default retry strategies for a fresh fallback node.
///
/// Built per call so every node owns its own list; strategies are edited
/// in place and must never be shared between nodes.
pub fn default_fallback_strategies() -> Vec<FallbackStrategy> {
    vec![
        FallbackStrategy {
            target: "back_button".to_string(),
            action: "click".to_string(),
            label: "尝试点击返回".to_string(),
        },
        FallbackStrategy {
            target: "close_button".to_string(),
            action: "click".to_string(),
            label: "尝试点击关闭".to_string(),
        },
        FallbackStrategy {
            target: "confirm_button".to_string(),
            action: "click".to_string(),
            label: "尝试点击确认".to_string(),
        },
    ]
}

/// Type-specific node configuration, tagged by the node's type name.
///
/// Unknown types deserialize into [`NodeData::Generic`], keeping the
/// registry permissive at the wire boundary while the variant set stays
/// closed for everything the editor understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeData {
    #[serde(rename_all = "camelCase")]
    Click {
        target_type: String,
        x: f64,
        y: f64,
        target: String,
    },
    #[serde(rename_all = "camelCase")]
    Wait { duration: u64, randomize: bool },
    #[serde(rename_all = "camelCase")]
    Swipe {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        duration: u64,
    },
    #[serde(rename_all = "camelCase")]
    If {
        search_type: String,
        target: String,
        confidence: u32,
        timeout: u64,
    },
    #[serde(rename_all = "camelCase")]
    Capture { output_var: String },
    #[serde(rename_all = "camelCase")]
    Detect {
        image_path: String,
        confidence: u32,
        result_var: String,
    },
    #[serde(rename_all = "camelCase")]
    Ocr {
        region_x: Option<f64>,
        region_y: Option<f64>,
        region_w: Option<f64>,
        region_h: Option<f64>,
        result_var: String,
    },
    #[serde(rename_all = "camelCase")]
    Variable {
        var_name: String,
        op_type: String,
        expression: String,
    },
    #[serde(rename_all = "camelCase")]
    Filter {
        source_var: String,
        target_var: String,
        mode: String,
        logic: String,
    },
    #[serde(rename_all = "camelCase")]
    Loop {
        count: u32,
        loop_type: String,
        break_condition: String,
    },
    #[serde(rename_all = "camelCase")]
    Fallback {
        max_retries: u32,
        strategies: Vec<FallbackStrategy>,
    },
    #[serde(rename_all = "camelCase")]
    Subflow {
        target_task_id: Option<String>,
        wait_for_complete: bool,
    },
    #[serde(rename = "macro_1", rename_all = "camelCase")]
    Macro1 {
        screenshot: bool,
        detect_target: String,
        confidence: u32,
        click_type: String,
        post_process: String,
    },
    Start,
    End,
    /// Fallback shape for type names outside the closed set.
    #[serde(untagged, rename_all = "camelCase")]
    Generic {
        #[serde(rename = "type")]
        node_type: String,
    },
}

impl NodeData {
    /// The type name this configuration is tagged with.
    pub fn node_type(&self) -> &str {
        match self {
            Self::Click { .. } => "click",
            Self::Wait { .. } => "wait",
            Self::Swipe { .. } => "swipe",
            Self::If { .. } => "if",
            Self::Capture { .. } => "capture",
            Self::Detect { .. } => "detect",
            Self::Ocr { .. } => "ocr",
            Self::Variable { .. } => "variable",
            Self::Filter { .. } => "filter",
            Self::Loop { .. } => "loop",
            Self::Fallback { .. } => "fallback",
            Self::Subflow { .. } => "subflow",
            Self::Macro1 { .. } => "macro_1",
            Self::Start => "start",
            Self::End => "end",
            Self::Generic { node_type } => node_type,
        }
    }

    /// The kind this configuration belongs to.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Generic { node_type } => NodeKind::Other(node_type.clone()),
            other => NodeKind::parse(other.node_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: &[&str] = &[
        "click", "wait", "swipe", "if", "capture", "detect", "ocr", "variable", "filter", "loop",
        "fallback", "subflow", "macro_1", "start", "end",
    ];

    #[test]
    fn defaults_carry_their_own_type() {
        for &name in ALL_TYPES {
            let data = NodeKind::parse(name).defaults();
            assert_eq!(data.node_type(), name, "defaults for '{}'", name);
        }
    }

    #[test]
    fn unknown_type_falls_back_to_generic() {
        let kind = NodeKind::parse("teleport");
        assert_eq!(kind, NodeKind::Other("teleport".to_string()));
        let data = kind.defaults();
        assert_eq!(data.node_type(), "teleport");
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            serde_json::json!({"type": "teleport"})
        );
    }

    #[test]
    fn input_is_a_start_alias() {
        assert_eq!(NodeKind::parse("input"), NodeKind::Start);
        assert!(NodeKind::parse("input").is_protected());
    }

    #[test]
    fn fallback_strategies_are_never_shared() {
        let a = NodeKind::Fallback.defaults();
        let mut b = NodeKind::Fallback.defaults();
        if let NodeData::Fallback { strategies, .. } = &mut b {
            strategies[0].target = "home_button".to_string();
        }
        if let NodeData::Fallback { strategies, .. } = &a {
            assert_eq!(strategies[0].target, "back_button");
        } else {
            panic!("expected fallback data");
        }
    }

    #[test]
    fn chain_out_handles() {
        assert_eq!(NodeKind::Click.chain_out_handle(), Some("output"));
        assert_eq!(NodeKind::Start.chain_out_handle(), Some("output"));
        assert_eq!(NodeKind::If.chain_out_handle(), Some("ifTrue"));
        assert_eq!(NodeKind::Loop.chain_out_handle(), Some("loopStart"));
        assert_eq!(NodeKind::End.chain_out_handle(), None);
    }

    #[test]
    fn node_data_serde_roundtrip_with_tag() {
        let data = NodeKind::Click.defaults();
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["type"], "click");
        assert_eq!(json["targetType"], "coordinates");
        let back: NodeData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn unknown_tag_deserializes_to_generic() {
        let back: NodeData =
            serde_json::from_value(serde_json::json!({"type": "hologram"})).unwrap();
        assert_eq!(back, NodeData::Generic { node_type: "hologram".to_string() });
    }

    #[test]
    fn palette_covers_every_toolbox_category() {
        let categories: Vec<NodeCategory> = palette().iter().map(|(c, _)| *c).collect();
        assert_eq!(categories.len(), 6);
        assert!(!categories.contains(&NodeCategory::Special));
    }
}
