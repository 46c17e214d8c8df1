use std::collections::BTreeMap;

use crate::gtfs::structs::Direction;

use super::trip_index::{HeadsignTally, HeadsignVotes};

/// Winning headsign per direction, per route.
pub type DirectionLabels = BTreeMap<String, BTreeMap<Direction, String>>;

/// Pick the most announced headsign for every route direction that received votes
///
/// Among headsigns with the same count, the one seen first in the trips table wins. Routes without
/// any vote are left out.
pub fn resolve_direction_labels(votes: &HeadsignVotes) -> DirectionLabels {
    let mut labels = DirectionLabels::new();
    for (route_id, directions) in votes.iter() {
        let resolved: BTreeMap<Direction, String> = directions
            .iter()
            .filter_map(|(direction, tallies)| {
                most_voted(tallies).map(|headsign| (*direction, headsign.to_owned()))
            })
            .collect();
        if !resolved.is_empty() {
            labels.insert(route_id.to_owned(), resolved);
        }
    }
    labels
}

fn most_voted(tallies: &[HeadsignTally]) -> Option<&str> {
    let mut best: Option<&HeadsignTally> = None;
    for tally in tallies {
        if best.map_or(true, |b| tally.count > b.count) {
            best = Some(tally);
        }
    }
    best.map(|t| t.headsign.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_wins_per_direction() {
        let mut votes = HeadsignVotes::default();
        votes.add("R1", Direction::Outbound, "Babylon");
        votes.add("R1", Direction::Outbound, "Penn Station");
        votes.add("R1", Direction::Outbound, "Penn Station");
        votes.add("R1", Direction::Inbound, "Babylon");
        votes.add("R2", Direction::Inbound, "Hempstead");

        let labels = resolve_direction_labels(&votes);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["R1"][&Direction::Outbound], "Penn Station");
        assert_eq!(labels["R1"][&Direction::Inbound], "Babylon");
        assert_eq!(labels["R2"].get(&Direction::Outbound), None);
        assert_eq!(labels["R2"][&Direction::Inbound], "Hempstead");
    }

    #[test]
    fn first_seen_headsign_wins_ties() {
        let mut votes = HeadsignVotes::default();
        votes.add("R1", Direction::Outbound, "Montauk");
        votes.add("R1", Direction::Outbound, "Speonk");
        votes.add("R1", Direction::Outbound, "Speonk");
        votes.add("R1", Direction::Outbound, "Montauk");
        let labels = resolve_direction_labels(&votes);
        assert_eq!(labels["R1"][&Direction::Outbound], "Montauk");
    }

    #[test]
    fn no_votes_no_labels() {
        assert!(resolve_direction_labels(&HeadsignVotes::default()).is_empty());
    }
}
