//! State-store integration tests: serialization fidelity and z-order
//! behavior under concurrent reordering.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::json;

use loreforge_model::{
    Drawable, DrawnElement, Layer, Pen, Rect, Region, Token, TokenId,
    TopologyType, Zone,
};

fn populated_zone(tokens: usize, drawables: usize) -> Zone {
    let mut zone = Zone::new("fixture");
    let mut ids = Vec::new();
    for i in 0..tokens {
        let mut token = Token::new(format!("token-{i}"));
        token.x = i as f64 * 10.0;
        token.properties.insert("hp".into(), json!(i));
        ids.push(token.id);
        zone.put_token(token);
    }
    for i in 0..drawables {
        zone.add_drawable(DrawnElement::new(
            Layer::Object,
            Drawable::Rectangle {
                bounds: Rect::new(i as f64, 0.0, 5.0, 5.0),
            },
            Pen::default(),
        ));
    }

    // Fog: two exposed patches with a hole punched back out, revealed
    // to the first token individually as well.
    let mut revealed = Region::rect(0.0, 0.0, 200.0, 200.0);
    revealed.union(&Region::rect(300.0, 40.0, 60.0, 60.0));
    zone.expose_area(&revealed, &ids[..tokens.min(1)]);
    zone.hide_area(&Region::rect(20.0, 20.0, 10.0, 10.0), &[]);
    zone.add_topology(
        &Region::rect(90.0, 0.0, 4.0, 150.0),
        TopologyType::Wall,
    );
    zone
}

#[test]
fn test_zone_round_trip_preserves_all_state() {
    for (tokens, drawables) in [(0, 0), (1, 1), (100, 100)] {
        let zone = populated_zone(tokens, drawables);
        let bytes = serde_json::to_vec(&zone).unwrap();
        let decoded: Zone = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            zone, decoded,
            "round trip diverged at {tokens} tokens / {drawables} drawables"
        );
        // The fixture must actually exercise fog state.
        assert_eq!(decoded.exposed.rings.len(), 3);
        assert!(decoded.exposed.rings[2].hole);
        assert_eq!(decoded.exposed_meta.len(), tokens.min(1));
        assert!(!decoded.topology[&TopologyType::Wall].is_empty());
    }
}

#[test]
fn test_round_trip_preserves_draw_order() {
    let zone = populated_zone(0, 50);
    let original: Vec<_> = zone.drawables.iter().map(|e| e.id).collect();
    let bytes = serde_json::to_vec(&zone).unwrap();
    let decoded: Zone = serde_json::from_slice(&bytes).unwrap();
    let restored: Vec<_> = decoded.drawables.iter().map(|e| e.id).collect();
    assert_eq!(original, restored);
}

/// Two clients bringing disjoint token sets to the front concurrently
/// must never mint duplicate z-orders: each reassignment is one atomic
/// operation under the lock.
#[test]
fn test_concurrent_disjoint_bring_to_front_never_duplicates_z() {
    let mut zone = Zone::new("contested");
    let mut ids: Vec<TokenId> = Vec::new();
    for i in 0..40 {
        let token = Token::new(format!("t{i}"));
        ids.push(token.id);
        zone.put_token(token);
    }
    let (left, right) = ids.split_at(20);
    let left: Vec<TokenId> = left.to_vec();
    let right: Vec<TokenId> = right.to_vec();

    let zone = Arc::new(Mutex::new(zone));
    let handles: Vec<_> = [left, right]
        .into_iter()
        .map(|set| {
            let zone = Arc::clone(&zone);
            std::thread::spawn(move || {
                let mut zone = zone.lock().unwrap();
                zone.bring_to_front(&set);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let zone = zone.lock().unwrap();
    let zs: Vec<i32> = zone.tokens.values().map(|t| t.z_order).collect();
    let unique: HashSet<i32> = zs.iter().copied().collect();
    assert_eq!(zs.len(), unique.len(), "duplicate z-orders minted");
}

#[test]
fn test_sequential_reorders_stay_consistent() {
    let mut zone = Zone::new("shuffle");
    let mut ids: Vec<TokenId> = Vec::new();
    for i in 0..10 {
        let token = Token::new(format!("t{i}"));
        ids.push(token.id);
        zone.put_token(token);
    }

    zone.bring_to_front(&ids[0..3]);
    zone.send_to_back(&ids[3..6]);
    zone.bring_to_front(&ids[6..10]);

    let zs: Vec<i32> = zone.tokens.values().map(|t| t.z_order).collect();
    let unique: HashSet<i32> = zs.iter().copied().collect();
    assert_eq!(zs.len(), unique.len());

    // The last front-move sits above everything else.
    let front_min = ids[6..10]
        .iter()
        .map(|id| zone.token(*id).unwrap().z_order)
        .min()
        .unwrap();
    let others_max = ids[0..6]
        .iter()
        .map(|id| zone.token(*id).unwrap().z_order)
        .max()
        .unwrap();
    assert!(front_min > others_max);
}
