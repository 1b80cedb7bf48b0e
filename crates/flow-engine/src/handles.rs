//! Handle compatibility tables
//!
//! A handle is a named connection point on a node. Edges are only valid
//! between a known source handle and a known target handle; the tables
//! also carry the label/animation the canvas renders on the edge.

/// Label and animation semantics of one handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleInfo {
    /// Edge label shown on the canvas, if any
    pub label: Option<&'static str>,
    /// Whether edges through this handle animate
    pub animated: bool,
}

const SOURCE_HANDLES: &[(&str, HandleInfo)] = &[
    ("ifTrue", HandleInfo { label: Some("是"), animated: true }),
    ("ifFalse", HandleInfo { label: Some("否"), animated: true }),
    ("loopStart", HandleInfo { label: Some("循环开始"), animated: true }),
    ("output", HandleInfo { label: None, animated: false }),
];

const TARGET_HANDLES: &[(&str, HandleInfo)] = &[
    ("loopEnd", HandleInfo { label: Some("循环结束"), animated: true }),
    ("input", HandleInfo { label: None, animated: false }),
];

/// The plain sequential-output handle name.
pub const PLAIN_OUTPUT: &str = "output";

/// The plain sequential-input handle name.
pub const PLAIN_INPUT: &str = "input";

/// Look up a source handle by name.
pub fn source_handle(name: &str) -> Option<&'static HandleInfo> {
    SOURCE_HANDLES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, info)| info)
}

/// Look up a target handle by name.
pub fn target_handle(name: &str) -> Option<&'static HandleInfo> {
    TARGET_HANDLES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, info)| info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_source_handles_resolve() {
        assert_eq!(source_handle("ifTrue").unwrap().label, Some("是"));
        assert!(source_handle("ifTrue").unwrap().animated);
        assert!(!source_handle("output").unwrap().animated);
        assert!(source_handle("loopEnd").is_none());
    }

    #[test]
    fn known_target_handles_resolve() {
        assert_eq!(target_handle("loopEnd").unwrap().label, Some("循环结束"));
        assert!(target_handle("loopEnd").unwrap().animated);
        assert!(target_handle("output").is_none());
    }
}
