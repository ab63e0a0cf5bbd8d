//! Room code to street address lookup.

/// Maps building codes (the leading letters of a room code) to addresses.
///
/// Codes are matched case-insensitively and the longest matching prefix
/// wins, so `SCH.0.01` resolves to `SCH` even when `S` is also known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingDirectory {
    buildings: Vec<(String, String)>,
}

impl BuildingDirectory {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut buildings: Vec<(String, String)> = entries
            .into_iter()
            .map(|(code, address)| (code.into().trim().to_uppercase(), address.into()))
            .filter(|(code, _)| !code.is_empty())
            .collect();

        // Longest codes first so prefix matching prefers the most specific building.
        buildings.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        buildings.dedup_by(|a, b| a.0 == b.0);

        BuildingDirectory { buildings }
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn building(&self, room: &str) -> Option<&str> {
        let room = room.trim().to_uppercase();
        self.buildings
            .iter()
            .find(|(code, _)| room.starts_with(code.as_str()))
            .map(|(_, address)| address.as_str())
    }

    /// `"{room}, {building address}"` for a known building.
    pub fn address(&self, room: &str) -> Option<String> {
        self.building(room)
            .map(|building| format!("{}, {}", room.trim(), building))
    }

    /// Location for an event held in `rooms`.
    ///
    /// The first room with a known building gives the full address. When no
    /// room is known the room codes themselves are used.
    pub fn location_for(&self, rooms: &[String]) -> Option<String> {
        if rooms.is_empty() {
            return None;
        }

        rooms
            .iter()
            .find_map(|room| self.address(room))
            .or_else(|| Some(rooms.join(", ")))
    }
}
