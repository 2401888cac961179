mod common;

use common::{flt, gen_at, status_at, switch_at, Lcg};
use flt2vhs_core::flt::catalog::TracerData;
use flt2vhs_core::flt::{Record, RecordBody};
use flt2vhs_core::{assemble, FlightModel};

#[test]
fn entities_follow_first_appearance_then_id() {
    let records = [
        gen_at(5.0, 1),
        gen_at(2.0, 9),
        switch_at(2.0, 4, 0, 1),
        gen_at(9.0, 4),
        status_at(0.5, 30, 1),
        gen_at(1.0, 1),
    ];
    let mut model = FlightModel::ingest(&flt(&records)).unwrap();
    let timeline = assemble(&mut model).unwrap();

    let ids: Vec<i32> = timeline.entities.iter().map(|e| e.id).collect();
    // 30 @0.5, 1 @1.0 (its later record arrived first), then 4 and 9 tie @2.0.
    assert_eq!(ids, [30, 1, 4, 9]);
}

#[test]
fn sequences_are_sorted_stably() {
    let records = [
        switch_at(3.0, 1, 7, 30),
        switch_at(1.0, 1, 7, 10),
        switch_at(3.0, 1, 8, 31),
        switch_at(1.0, 1, 8, 11),
        switch_at(2.0, 1, 7, 20),
    ];
    let mut model = FlightModel::ingest(&flt(&records)).unwrap();
    let timeline = assemble(&mut model).unwrap();

    let e = timeline.entities[0];
    let seen: Vec<(f32, i32)> = e.switches.iter().map(|s| (s.time, s.value)).collect();
    assert_eq!(
        seen,
        [(1.0, 10), (1.0, 11), (2.0, 20), (3.0, 30), (3.0, 31)]
    );
}

#[test]
fn random_streams_assemble_sorted_with_counts_intact() {
    let mut rng = Lcg::new(42);
    let mut records: Vec<Record<'static>> = Vec::new();
    let mut expected = std::collections::HashMap::<i32, (usize, usize)>::new();

    for _ in 0..2_000 {
        let id = rng.below(25) as i32;
        let time = rng.f32();
        if rng.below(3) == 0 {
            records.push(switch_at(time, id, rng.below(4) as i32, rng.below(10) as i32));
            expected.entry(id).or_default().1 += 1;
        } else {
            records.push(gen_at(time, id));
            expected.entry(id).or_default().0 += 1;
        }
    }

    let mut model = FlightModel::ingest(&flt(&records)).unwrap();
    let timeline = assemble(&mut model).unwrap();
    assert_eq!(timeline.entities.len(), expected.len());

    let mut last_first = f32::NEG_INFINITY;
    for e in &timeline.entities {
        assert!(e.is_chronological(), "entity {}", e.id);
        let (positions, switches) = expected[&e.id];
        assert_eq!(e.positions.len(), positions);
        assert_eq!(e.switches.len(), switches);

        let first = e.first_appearance().unwrap();
        assert!(first >= last_first);
        last_first = first;
    }
}

#[test]
fn globals_keep_append_order() {
    let tracer = |time: f32, x: f32| {
        Record::new(
            time,
            RecordBody::TracerStart(TracerData {
                x,
                ..Default::default()
            }),
        )
    };
    let records = [tracer(5.0, 1.0), tracer(1.0, 2.0), tracer(3.0, 3.0)];
    let mut model = FlightModel::ingest(&flt(&records)).unwrap();
    let timeline = assemble(&mut model).unwrap();

    let xs: Vec<f32> = timeline.globals.tracers.iter().map(|t| t.data.x).collect();
    assert_eq!(xs, [1.0, 2.0, 3.0]);
    assert!(timeline.entities.is_empty());
}
