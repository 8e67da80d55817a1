//! `PipemindRoomNode`: build a map of rooms linked north/east/south/west and
//! export the reachable part of it as JSON.
//!
//! Rooms live in a [`RoomGraph`] arena and are addressed by [`RoomId`]. Every
//! link is reciprocal: linking A to B northwards also links B to A southwards.
//! Relinking a slot first detaches whatever was there, so no room is ever left
//! pointing at a neighbour that no longer points back.
//!
//! Export failures (directory creation, file write) propagate as
//! [`RoomError`]; nothing is retried.

use std::io;
use std::path::{Path, PathBuf};

use pipeline::{Direction, MapName, RoomKey, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Identity and errors
// ---------------------------------------------------------------------------

/// Arena index of a room within one [`RoomGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomId(usize);

impl RoomId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Unknown room {0}")]
    UnknownRoom(RoomId),

    #[error("Room {0} cannot link to itself")]
    SelfLink(RoomId),

    #[error("Could not write room map at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not serialise room map: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Room {
    key: RoomKey,
    name: String,
    description: String,
    links: [Option<RoomId>; 4],
}

impl Room {
    pub fn key(&self) -> RoomKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn neighbour(&self, direction: Direction) -> Option<RoomId> {
        self.links[direction.index()]
    }

    /// Directions with a neighbour, in north/east/south/west order.
    pub fn exits(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.neighbour(*d).is_some())
            .collect()
    }
}

/// Arena of rooms and their reciprocal links.
#[derive(Debug, Clone, Default)]
pub struct RoomGraph {
    rooms: Vec<Room>,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Adds an unlinked room with a fresh [`RoomKey`].
    pub fn add_room(&mut self, name: impl Into<String>, description: impl Into<String>) -> RoomId {
        let id = RoomId(self.rooms.len());
        self.rooms.push(Room {
            key: RoomKey::new_random(),
            name: name.into(),
            description: description.into(),
            links: [None; 4],
        });
        id
    }

    pub fn room(&self, id: RoomId) -> Result<&Room, RoomError> {
        self.rooms.get(id.0).ok_or(RoomError::UnknownRoom(id))
    }

    /// Replaces a room's name and description, keeping its identity and links.
    pub fn update_room(
        &mut self,
        id: RoomId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), RoomError> {
        let room = self.rooms.get_mut(id.0).ok_or(RoomError::UnknownRoom(id))?;
        room.name = name.into();
        room.description = description.into();
        Ok(())
    }

    /// Links `from` to `to` through `direction`, and `to` back to `from`
    /// through the opposite direction.
    ///
    /// Any room previously in either slot is detached in both directions first.
    pub fn link(&mut self, from: RoomId, direction: Direction, to: RoomId) -> Result<(), RoomError> {
        self.room(from)?;
        self.room(to)?;
        if from == to {
            return Err(RoomError::SelfLink(from));
        }
        let back = direction.opposite();
        self.unlink(from, direction)?;
        self.unlink(to, back)?;
        self.rooms[from.0].links[direction.index()] = Some(to);
        self.rooms[to.0].links[back.index()] = Some(from);
        debug!(%from, %to, %direction, "rooms linked");
        Ok(())
    }

    /// Removes the link in `direction` from `room`, and its reciprocal.
    /// Returns the detached neighbour, if any.
    pub fn unlink(&mut self, room: RoomId, direction: Direction) -> Result<Option<RoomId>, RoomError> {
        self.room(room)?;
        let old = self.rooms[room.0].links[direction.index()].take();
        if let Some(old) = old {
            let slot = &mut self.rooms[old.0].links[direction.opposite().index()];
            if *slot == Some(room) {
                *slot = None;
            }
        }
        Ok(old)
    }

    /// Depth-first walk from `start` following north, east, south, west.
    /// Each room appears once, in first-visit order.
    pub fn reachable(&self, start: RoomId) -> Result<Vec<RoomId>, RoomError> {
        self.room(start)?;
        let mut visited = vec![false; self.rooms.len()];
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if visited[id.0] {
                continue;
            }
            visited[id.0] = true;
            order.push(id);
            // Reversed so north is explored first.
            for direction in Direction::ALL.into_iter().rev() {
                if let Some(next) = self.rooms[id.0].neighbour(direction) {
                    if !visited[next.0] {
                        stack.push(next);
                    }
                }
            }
        }
        Ok(order)
    }

    /// Serialisable view of every room reachable from `start`.
    pub fn network(&self, start: RoomId) -> Result<RoomNetwork, RoomError> {
        let key_of = |id: Option<RoomId>| id.map(|id| self.rooms[id.0].key.to_string());
        let rooms = self
            .reachable(start)?
            .into_iter()
            .map(|id| {
                let room = &self.rooms[id.0];
                RoomRecord {
                    id: room.key.to_string(),
                    name: room.name.clone(),
                    description: room.description.clone(),
                    connections: Connections {
                        north: key_of(room.neighbour(Direction::North)),
                        east: key_of(room.neighbour(Direction::East)),
                        south: key_of(room.neighbour(Direction::South)),
                        west: key_of(room.neighbour(Direction::West)),
                    },
                }
            })
            .collect();
        Ok(RoomNetwork {
            rooms,
            start_room: self.rooms[start.0].key.to_string(),
        })
    }

    /// Writes the network reachable from `start` to
    /// `<out_dir>/<map_name>_<YYYYmmdd_HHMMSS>.json`, creating `out_dir`.
    pub fn export(&self, start: RoomId, map_name: &MapName, out_dir: &Path) -> Result<PathBuf, RoomError> {
        let network = self.network(start)?;
        std::fs::create_dir_all(out_dir).map_err(|source| RoomError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;
        let file_name = format!(
            "{}_{}.json",
            file_safe(map_name.as_str()),
            Timestamp::now().file_stamp()
        );
        let path = out_dir.join(file_name);
        let json = serde_json::to_string_pretty(&network)?;
        std::fs::write(&path, json).map_err(|source| RoomError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), rooms = network.rooms.len(), "room map exported");
        Ok(path)
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

// ---------------------------------------------------------------------------
// Map document
// ---------------------------------------------------------------------------

/// Exported map: every reachable room plus the room the export started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNetwork {
    pub rooms: Vec<RoomRecord>,
    pub start_room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub connections: Connections,
}

/// Neighbour ids per direction; `null` in JSON when there is no exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connections {
    pub north: Option<String>,
    pub east: Option<String>,
    pub south: Option<String>,
    pub west: Option<String>,
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Inputs of one room node invocation.
#[derive(Debug, Clone, Default)]
pub struct RoomInput {
    pub room_name: String,
    pub description: String,
    pub export_map: bool,
    pub map_name: String,
    pub north: Option<RoomId>,
    pub east: Option<RoomId>,
    pub south: Option<RoomId>,
    pub west: Option<RoomId>,
}

impl RoomInput {
    pub fn new(room_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_neighbour(mut self, direction: Direction, room: RoomId) -> Self {
        *self.slot_mut(direction) = Some(room);
        self
    }

    pub fn with_export(mut self, map_name: impl Into<String>) -> Self {
        self.export_map = true;
        self.map_name = map_name.into();
        self
    }

    pub fn neighbour(&self, direction: Direction) -> Option<RoomId> {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut Option<RoomId> {
        match direction {
            Direction::North => &mut self.north,
            Direction::East => &mut self.east,
            Direction::South => &mut self.south,
            Direction::West => &mut self.west,
        }
    }
}

/// Outputs of one room node invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOutput {
    /// The room this invocation created.
    pub room: RoomId,
    pub north: Option<RoomId>,
    pub east: Option<RoomId>,
    pub south: Option<RoomId>,
    pub west: Option<RoomId>,
    /// Name, description and exits; plus the export path when exported.
    pub room_info: String,
    pub exported: Option<PathBuf>,
}

/// The room node: one new room per invocation, linked to the given neighbours.
#[derive(Debug, Clone)]
pub struct RoomMapperNode {
    maps_dir: PathBuf,
}

impl RoomMapperNode {
    /// `maps_dir` receives exported map files.
    pub fn new(maps_dir: impl Into<PathBuf>) -> Self {
        Self {
            maps_dir: maps_dir.into(),
        }
    }

    pub fn maps_dir(&self) -> &Path {
        &self.maps_dir
    }

    pub fn process(&self, graph: &mut RoomGraph, input: RoomInput) -> Result<RoomOutput, RoomError> {
        let room = graph.add_room(input.room_name.as_str(), input.description.as_str());
        for direction in Direction::ALL {
            if let Some(neighbour) = input.neighbour(direction) {
                graph.link(room, direction, neighbour)?;
            }
        }

        let current = graph.room(room)?;
        let exits: Vec<_> = current.exits().into_iter().map(Direction::label).collect();
        let mut room_info = format!(
            "Room: {}\nDescription: {}\nExits: {}",
            input.room_name,
            input.description,
            if exits.is_empty() {
                "None".to_string()
            } else {
                exits.join(", ")
            }
        );

        let exported = if input.export_map {
            let map_name = MapName::new(input.map_name.trim()).unwrap_or_else(MapName::default_map);
            let path = graph.export(room, &map_name, &self.maps_dir)?;
            room_info.push_str(&format!("\nMap exported to: {}", path.display()));
            Some(path)
        } else {
            None
        };

        Ok(RoomOutput {
            room,
            north: current.neighbour(Direction::North),
            east: current.neighbour(Direction::East),
            south: current.neighbour(Direction::South),
            west: current.neighbour(Direction::West),
            room_info,
            exported,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chain() -> (RoomGraph, RoomId, RoomId, RoomId) {
        let mut graph = RoomGraph::new();
        let a = graph.add_room("A", "first");
        let b = graph.add_room("B", "second");
        let c = graph.add_room("C", "third");
        graph.link(a, Direction::North, b).unwrap();
        graph.link(b, Direction::North, c).unwrap();
        (graph, a, b, c)
    }

    #[test]
    fn links_are_reciprocal() {
        let mut graph = RoomGraph::new();
        let a = graph.add_room("A", "");
        let b = graph.add_room("B", "");
        graph.link(a, Direction::North, b).unwrap();
        assert_eq!(graph.room(a).unwrap().neighbour(Direction::North), Some(b));
        assert_eq!(graph.room(b).unwrap().neighbour(Direction::South), Some(a));

        graph.link(a, Direction::East, b).unwrap();
        assert_eq!(graph.room(b).unwrap().neighbour(Direction::West), Some(a));
    }

    #[test]
    fn relinking_detaches_the_old_neighbour() {
        let mut graph = RoomGraph::new();
        let a = graph.add_room("A", "");
        let b = graph.add_room("B", "");
        let c = graph.add_room("C", "");
        graph.link(a, Direction::North, b).unwrap();
        graph.link(a, Direction::North, c).unwrap();

        assert_eq!(graph.room(a).unwrap().neighbour(Direction::North), Some(c));
        assert_eq!(graph.room(c).unwrap().neighbour(Direction::South), Some(a));
        assert_eq!(graph.room(b).unwrap().neighbour(Direction::South), None);
    }

    #[test]
    fn linking_into_an_occupied_back_slot_detaches_its_occupant() {
        let mut graph = RoomGraph::new();
        let a = graph.add_room("A", "");
        let b = graph.add_room("B", "");
        let c = graph.add_room("C", "");
        graph.link(a, Direction::North, b).unwrap();
        graph.link(c, Direction::North, b).unwrap();

        assert_eq!(graph.room(b).unwrap().neighbour(Direction::South), Some(c));
        assert_eq!(graph.room(a).unwrap().neighbour(Direction::North), None);
    }

    #[test]
    fn self_links_and_unknown_rooms_are_rejected() {
        let mut graph = RoomGraph::new();
        let a = graph.add_room("A", "");
        assert!(matches!(
            graph.link(a, Direction::West, a),
            Err(RoomError::SelfLink(_))
        ));
        assert!(matches!(
            graph.link(a, Direction::West, RoomId(9)),
            Err(RoomError::UnknownRoom(_))
        ));
    }

    #[test]
    fn unlink_clears_both_sides() {
        let (mut graph, a, b, _c) = chain();
        assert_eq!(graph.unlink(b, Direction::South).unwrap(), Some(a));
        assert_eq!(graph.room(a).unwrap().neighbour(Direction::North), None);
        assert_eq!(graph.reachable(a).unwrap(), vec![a]);
    }

    #[test]
    fn reachable_is_depth_first_north_first() {
        let mut graph = RoomGraph::new();
        let hub = graph.add_room("hub", "");
        let n = graph.add_room("n", "");
        let nn = graph.add_room("nn", "");
        let e = graph.add_room("e", "");
        graph.link(hub, Direction::East, e).unwrap();
        graph.link(hub, Direction::North, n).unwrap();
        graph.link(n, Direction::North, nn).unwrap();
        assert_eq!(graph.reachable(hub).unwrap(), vec![hub, n, nn, e]);
    }

    #[test]
    fn three_room_chain_serialises_from_any_start() {
        let (graph, a, b, c) = chain();
        for start in [a, b, c] {
            let network = graph.network(start).unwrap();
            assert_eq!(network.rooms.len(), 3);
            assert_eq!(network.start_room, graph.room(start).unwrap().key().to_string());
        }
    }

    #[test]
    fn network_document_shape() {
        let (graph, a, b, _c) = chain();
        let value = serde_json::to_value(graph.network(a).unwrap()).unwrap();
        let first = &value["rooms"][0];
        assert_eq!(first["name"], "A");
        assert_eq!(first["description"], "first");
        assert_eq!(
            first["connections"]["north"],
            graph.room(b).unwrap().key().to_string()
        );
        assert!(first["connections"]["south"].is_null());
        assert!(first["connections"]["east"].is_null());
    }

    #[test]
    fn export_writes_timestamped_json() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let out_dir = dir.path().join("room_maps");
        let (graph, a, _b, _c) = chain();

        let path = graph
            .export(a, &MapName::new("dungeon").unwrap(), &out_dir)
            .unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("dungeon_"));
        assert!(file_name.ends_with(".json"));
        assert_eq!(file_name.len(), "dungeon_".len() + 15 + ".json".len());

        let written: RoomNetwork =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, graph.network(a).unwrap());
    }

    #[test]
    fn export_into_unwritable_location_propagates() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let (graph, a, _b, _c) = chain();
        let err = graph
            .export(a, &MapName::default_map(), &blocker.join("maps"))
            .unwrap_err();
        assert!(matches!(err, RoomError::Io { .. }));
    }

    #[test]
    fn node_builds_summary_with_exits() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let node = RoomMapperNode::new(dir.path());
        let mut graph = RoomGraph::new();

        let hall = node
            .process(&mut graph, RoomInput::new("Hall", "A long hall"))
            .unwrap();
        assert_eq!(
            hall.room_info,
            "Room: Hall\nDescription: A long hall\nExits: None"
        );

        let kitchen = node
            .process(
                &mut graph,
                RoomInput::new("Kitchen", "Smells of bread")
                    .with_neighbour(Direction::South, hall.room)
                    .with_neighbour(Direction::East, hall.room),
            )
            .unwrap();
        assert_eq!(kitchen.south, Some(hall.room));
        assert_eq!(kitchen.east, Some(hall.room));
        assert_eq!(kitchen.north, None);
        assert_eq!(
            kitchen.room_info,
            "Room: Kitchen\nDescription: Smells of bread\nExits: East, South"
        );
        assert!(kitchen.exported.is_none());
    }

    #[test]
    fn node_exports_when_asked() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let node = RoomMapperNode::new(dir.path().join("room_maps"));
        let mut graph = RoomGraph::new();
        let hall = node
            .process(&mut graph, RoomInput::new("Hall", ""))
            .unwrap();
        let out = node
            .process(
                &mut graph,
                RoomInput::new("Cellar", "Dark")
                    .with_neighbour(Direction::North, hall.room)
                    .with_export("   "),
            )
            .unwrap();

        let path = out.exported.expect("map should be exported");
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("room_map_"));
        assert!(out
            .room_info
            .ends_with(&format!("Map exported to: {}", path.display())));
        let written: RoomNetwork =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.rooms.len(), 2);
    }

    #[test]
    fn map_names_cannot_introduce_directories() {
        assert_eq!(file_safe("a/b\\c:d"), "a_b_c_d");
    }
}
