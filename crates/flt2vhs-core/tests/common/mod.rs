#![allow(dead_code)]

use flt2vhs_core::flt::catalog::{
    pack_callsigns, DofData, FeaturePositionData, FeatureStatusData, MovingSfxData, PositionData,
    StationarySfxData, SwitchData, TracerData,
};
use flt2vhs_core::flt::{Callsign, CallsignList, Record, RecordBody};

/// Seeded linear congruential generator.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    pub fn below(&mut self, n: u32) -> u32 {
        self.next_u32() % n
    }

    pub fn f32(&mut self) -> f32 {
        (self.next_u32() % 100_000) as f32 / 8.0
    }
}

pub fn flt(records: &[Record<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    for r in records {
        r.encode(&mut out);
    }
    out
}

pub fn position(base_type: i32, id: i32, x: f32) -> PositionData {
    PositionData {
        base_type,
        id,
        x,
        y: x + 1.0,
        z: -x,
        yaw: 0.25,
        pitch: 0.5,
        roll: 0.75,
    }
}

pub fn gen_at(time: f32, id: i32) -> Record<'static> {
    Record::new(time, RecordBody::GenPosition(position(100, id, time)))
}

pub fn aircraft_at(time: f32, id: i32, radar_target: i32) -> Record<'static> {
    Record::new(
        time,
        RecordBody::AircraftPosition {
            position: position(200, id, time),
            radar_target,
        },
    )
}

pub fn switch_at(time: f32, id: i32, number: i32, value: i32) -> Record<'static> {
    Record::new(
        time,
        RecordBody::Switch(SwitchData {
            base_type: 300,
            id,
            number,
            value,
            previous: value - 1,
        }),
    )
}

pub fn status_at(time: f32, id: i32, new_status: i32) -> Record<'static> {
    Record::new(
        time,
        RecordBody::FeatureStatus(FeatureStatusData {
            id,
            new_status,
            previous_status: 0,
        }),
    )
}

pub fn tod(offset: f32) -> Record<'static> {
    Record::new(offset, RecordBody::TodOffset)
}

pub fn sample_callsigns() -> Vec<u8> {
    pack_callsigns(&[
        Callsign::new("Viper 1-1", 1),
        Callsign::new("Cowboy 2-1", 2),
        Callsign::new("a label much longer than sixteen", 3),
    ])
}

/// One record of every type, in tag order.
pub fn one_of_each(callsigns: &[u8]) -> Vec<Record<'_>> {
    vec![
        Record::new(1.0, RecordBody::GenPosition(position(10, 1, 1.0))),
        Record::new(1.5, RecordBody::MissilePosition(position(11, 2, 2.0))),
        Record::new(
            2.0,
            RecordBody::FeaturePosition(FeaturePositionData {
                base_type: 12,
                id: 3,
                lead_id: 30,
                slot: 4,
                special_flags: 0x8000_0001,
                x: 3.0,
                y: 4.0,
                z: 5.0,
                yaw: 0.1,
                pitch: 0.2,
                roll: 0.3,
            }),
        ),
        Record::new(
            2.5,
            RecordBody::AircraftPosition {
                position: position(13, 4, 4.0),
                radar_target: 2,
            },
        ),
        Record::new(
            3.0,
            RecordBody::TracerStart(TracerData {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                dx: 100.0,
                dy: -100.0,
                dz: 0.5,
            }),
        ),
        Record::new(
            3.5,
            RecordBody::StationarySfx(StationarySfxData {
                sfx_type: 7,
                x: 9.0,
                y: 8.0,
                z: 7.0,
                ttl: 2.0,
                scale: 1.5,
            }),
        ),
        Record::new(
            4.0,
            RecordBody::MovingSfx(MovingSfxData {
                sfx_type: 8,
                user: 4,
                flags: 0xDEAD_BEEF,
                x: 1.0,
                y: 1.0,
                z: 1.0,
                dx: 2.0,
                dy: 2.0,
                dz: 2.0,
                ttl: 3.0,
                scale: 0.5,
            }),
        ),
        Record::new(
            4.5,
            RecordBody::Switch(SwitchData {
                base_type: 13,
                id: 4,
                number: 6,
                value: 1,
                previous: 0,
            }),
        ),
        Record::new(
            5.0,
            RecordBody::Dof(DofData {
                base_type: 13,
                id: 4,
                number: 2,
                value: 0.75,
                previous: 0.0,
            }),
        ),
        Record::new(5.5, RecordBody::ChaffPosition(position(14, 5, 5.0))),
        Record::new(6.0, RecordBody::FlarePosition(position(15, 6, 6.0))),
        tod(43_200.0),
        Record::new(
            7.0,
            RecordBody::FeatureStatus(FeatureStatusData {
                id: 3,
                new_status: 2,
                previous_status: 1,
            }),
        ),
        Record::new(
            7.5,
            RecordBody::CallsignList(CallsignList::from_entries(callsigns)),
        ),
    ]
}
