//! Static catalogue of the nodes this crate implements.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
    /// Stable type name used by workflow documents.
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    /// Output socket names, in order.
    pub outputs: &'static [&'static str],
}

const fn node(
    name: &'static str,
    display_name: &'static str,
    category: &'static str,
    outputs: &'static [&'static str],
) -> NodeDescriptor {
    NodeDescriptor {
        name,
        display_name,
        category,
        outputs,
    }
}

const RESOLUTION_OUTPUTS: &[&str] = &["width", "height"];
const COMPOSED: &[&str] = &["composed_prompt"];

pub const NODES: &[NodeDescriptor] = &[
    node(
        "SelectLineFromDropdown",
        "Select Line from TxT (Any)",
        "Pipemind/Custom",
        &["selected_line", "line_count", "current_index", "preview"],
    ),
    node(
        "RandomLineFromDropdown",
        "Random Line from File (Seeded)",
        "Pipemind/Text",
        &["random_line"],
    ),
    node("LoadTxtFile", "Load Text File", "Pipemind/Text", &["file_content", "line_count"]),
    node(
        "SimplePromptCombiner",
        "Simple Prompt Combiner (5x)",
        "Pipemind",
        &["combined_prompt"],
    ),
    node("KeywordPromptComposer", "Keyword Prompt Composer", "Pipemind/Text", COMPOSED),
    node(
        "EnhancedKeywordPromptComposer",
        "Enhanced Keyword Prompt Composer",
        "Pipemind/Text",
        COMPOSED,
    ),
    node(
        "MultiFileKeywordPromptComposer",
        "Multi-File Keyword Prompt Composer",
        "Pipemind/Text",
        COMPOSED,
    ),
    node(
        "PipemindMultilineTextInput",
        "Multiline Text Input",
        "Pipemind/Text",
        &["output_text"],
    ),
    node(
        "PipemindShowTextFind",
        "Show Text (Find)",
        "Pipemind",
        &["text", "search_results"],
    ),
    node("BooleanSwitchAny", "Boolean Switch (Any)", "Pipemind/Logic", &["result"]),
    node(
        "PipemindFlux2MAspectRatio",
        "Flux 2M Aspect Ratio",
        "Pipemind/Resolution",
        RESOLUTION_OUTPUTS,
    ),
    node(
        "PipemindQwenAspectRatio",
        "Qwen Aspect Ratio",
        "Pipemind/Resolution",
        RESOLUTION_OUTPUTS,
    ),
    node(
        "PipemindSDXL15AspectRatio",
        "SDXL Aspect Ratio",
        "Pipemind/Resolution",
        RESOLUTION_OUTPUTS,
    ),
    node("PipemindDisplayAny", "Display Any", "Pipemind", &[]),
    node(
        "PipemindRoomNode",
        "Room Mapper",
        "Pipemind/Mapping",
        &["NORTH", "EAST", "SOUTH", "WEST", "room_info"],
    ),
];

/// Looks up a node by its type name.
pub fn find(name: &str) -> Option<&'static NodeDescriptor> {
    NODES.iter().find(|n| n.name == name)
}
