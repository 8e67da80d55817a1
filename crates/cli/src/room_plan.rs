//! Replays a JSON room plan through the room node.
//!
//! A plan lists rooms in creation order. Each room may name earlier rooms as
//! neighbours; the last room is exported when the plan asks for it.
//!
//! ```json
//! {
//!   "map_name": "manor",
//!   "export": true,
//!   "rooms": [
//!     { "name": "Hall", "description": "Dusty." },
//!     { "name": "Kitchen", "description": "Warm.", "south": "Hall" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use nodes::room_mapper::{RoomGraph, RoomInput, RoomMapperNode};
use pipeline::Direction;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct RoomPlan {
    #[serde(default)]
    pub map_name: String,
    #[serde(default)]
    pub export: bool,
    pub rooms: Vec<PlannedRoom>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannedRoom {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub north: Option<String>,
    pub east: Option<String>,
    pub south: Option<String>,
    pub west: Option<String>,
}

impl PlannedRoom {
    fn neighbour(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::North => self.north.as_deref(),
            Direction::East => self.east.as_deref(),
            Direction::South => self.south.as_deref(),
            Direction::West => self.west.as_deref(),
        }
    }
}

#[derive(Debug)]
pub struct PlanOutcome {
    /// `room_info` of each room, in plan order.
    pub summaries: Vec<String>,
    pub exported: Option<PathBuf>,
}

pub fn run(plan: &RoomPlan, node: &RoomMapperNode) -> anyhow::Result<PlanOutcome> {
    if plan.rooms.is_empty() {
        bail!("room plan has no rooms");
    }
    let mut graph = RoomGraph::new();
    let mut by_name = HashMap::new();
    let mut summaries = Vec::with_capacity(plan.rooms.len());
    let mut exported = None;
    let last = plan.rooms.len() - 1;

    for (i, planned) in plan.rooms.iter().enumerate() {
        let mut input = RoomInput::new(planned.name.as_str(), planned.description.as_str());
        for direction in Direction::ALL {
            if let Some(target) = planned.neighbour(direction) {
                let id = by_name
                    .get(target)
                    .copied()
                    .ok_or_else(|| anyhow!("room '{}' refers to unknown room '{target}'", planned.name))?;
                input = input.with_neighbour(direction, id);
            }
        }
        if plan.export && i == last {
            input = input.with_export(plan.map_name.as_str());
        }
        let output = node
            .process(&mut graph, input)
            .with_context(|| format!("processing room '{}'", planned.name))?;
        debug!(room = %planned.name, id = %output.room, "room planned");
        if by_name.insert(planned.name.clone(), output.room).is_some() {
            bail!("duplicate room name '{}'", planned.name);
        }
        summaries.push(output.room_info);
        exported = output.exported.or(exported);
    }

    Ok(PlanOutcome { summaries, exported })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodes::room_mapper::RoomNetwork;
    use tempfile::TempDir;

    fn plan(json: &str) -> RoomPlan {
        serde_json::from_str(json).expect("valid plan")
    }

    #[test]
    fn builds_and_exports() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let node = RoomMapperNode::new(dir.path());
        let plan = plan(
            r#"{"map_name": "manor", "export": true, "rooms": [
                {"name": "Hall", "description": "Dusty."},
                {"name": "Kitchen", "description": "Warm.", "south": "Hall"}
            ]}"#,
        );
        let outcome = run(&plan, &node).unwrap();
        assert_eq!(outcome.summaries[0], "Room: Hall\nDescription: Dusty.\nExits: None");
        assert!(outcome.summaries[1].starts_with("Room: Kitchen\nDescription: Warm.\nExits: South"));

        let path = outcome.exported.expect("exported");
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("manor_"));
        let network: RoomNetwork =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(network.rooms.len(), 2);
    }

    #[test]
    fn unknown_neighbour_is_an_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let node = RoomMapperNode::new(dir.path());
        let plan = plan(r#"{"rooms": [{"name": "Hall", "west": "Cellar"}]}"#);
        let err = run(&plan, &node).unwrap_err();
        assert!(err.to_string().contains("unknown room 'Cellar'"));
    }

    #[test]
    fn empty_plan_is_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let node = RoomMapperNode::new(dir.path());
        assert!(run(&plan(r#"{"rooms": []}"#), &node).is_err());
    }
}
