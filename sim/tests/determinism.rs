//! Running the same network/vehicle-count/seed twice must produce byte-identical calendars
//! (§9's determinism requirement).

use geom::{Duration, Pt2D};
use map_model::{NodeID, RawNetwork, RawNode, RawWay, Tags};

fn square_network() -> map_model::Network {
    let mut tags = Tags::default();
    tags.0.insert("highway".to_string(), "tertiary".to_string());
    tags.0.insert("oneway".to_string(), "yes".to_string());
    tags.0.insert("lanes".to_string(), "1".to_string());
    tags.0.insert("maxspeed".to_string(), "50".to_string());

    let corners = [(0.0, 0.0), (0.0, 0.01), (0.01, 0.01), (0.01, 0.0)];
    let nodes: Vec<RawNode> = corners
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng))| RawNode {
            id: NodeID(i as u64),
            point: Pt2D::new(lat, lng),
            tags: Tags::default(),
        })
        .collect();

    let ways: Vec<RawWay> = (0..4)
        .map(|i| RawWay {
            id: i as u64,
            nodes: vec![NodeID(i as u64), NodeID((i as u64 + 1) % 4)],
            tags: tags.clone(),
        })
        .collect();

    map_model::load(RawNetwork { nodes, ways }).unwrap()
}

#[test]
fn repeated_runs_with_same_seed_produce_identical_calendars() {
    let (calendar_a, network_a) = sim::Sim::new(square_network(), 5, 42).run(Duration::seconds(200.0));
    let (calendar_b, network_b) = sim::Sim::new(square_network(), 5, 42).run(Duration::seconds(200.0));

    assert_eq!(calendar_a.pack(&network_a), calendar_b.pack(&network_b));
}

#[test]
fn different_seeds_usually_diverge() {
    let (calendar_a, network_a) = sim::Sim::new(square_network(), 5, 1).run(Duration::seconds(200.0));
    let (calendar_b, network_b) = sim::Sim::new(square_network(), 5, 2).run(Duration::seconds(200.0));

    assert_ne!(calendar_a.pack(&network_a), calendar_b.pack(&network_b));
}
