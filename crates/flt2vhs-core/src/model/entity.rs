// crates/flt2vhs-core/src/model/entity.rs

use std::cmp::Ordering;

use serde::Serialize;

use crate::flt::catalog::RecordType;

/// What kind of object an entity is, taken from its first position record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityClass {
    /// Only switch/DOF/status records were seen; never placed in the world.
    Unplaced,
    General,
    Missile,
    Feature,
    Aircraft,
    Chaff,
    Flare,
}

impl EntityClass {
    /// Category bits of the entity's row in a VHS tape.
    pub fn tape_flags(self) -> u32 {
        match self {
            EntityClass::Unplaced | EntityClass::General => 0,
            EntityClass::Missile => 0x01,
            EntityClass::Feature => 0x02,
            EntityClass::Aircraft => 0x04,
            EntityClass::Chaff => 0x08,
            EntityClass::Flare => 0x10,
        }
    }

    pub fn from_position_type(ty: RecordType) -> Option<Self> {
        match ty {
            RecordType::GenPosition => Some(EntityClass::General),
            RecordType::MissilePosition => Some(EntityClass::Missile),
            RecordType::FeaturePosition => Some(EntityClass::Feature),
            RecordType::AircraftPosition => Some(EntityClass::Aircraft),
            RecordType::ChaffPosition => Some(EntityClass::Chaff),
            RecordType::FlarePosition => Some(EntityClass::Flare),
            _ => None,
        }
    }
}

/// Radar target value for samples that carry none.
pub const NO_RADAR_TARGET: i32 = -1;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PositionSample {
    pub time: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    /// Entity id of the aircraft's radar target; -1 otherwise.
    pub radar_target: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SwitchChange {
    pub time: f32,
    pub number: i32,
    pub value: i32,
    pub previous: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct DofChange {
    pub time: f32,
    pub number: i32,
    pub value: f32,
    pub previous: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct StatusChange {
    pub time: f32,
    pub new_status: i32,
    pub previous_status: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeatureLink {
    pub lead_id: i32,
    pub slot: i32,
    pub special_flags: u32,
}

trait Timed {
    fn time(&self) -> f32;
}

macro_rules! timed {
    ($($t:ty),*) => {
        $(impl Timed for $t {
            #[inline]
            fn time(&self) -> f32 {
                self.time
            }
        })*
    };
}

timed!(PositionSample, SwitchChange, DofChange, StatusChange);

fn by_time<T: Timed>(a: &T, b: &T) -> Ordering {
    a.time().total_cmp(&b.time())
}

fn is_sorted_by_time<T: Timed>(items: &[T]) -> bool {
    items.windows(2).all(|w| by_time(&w[0], &w[1]) != Ordering::Greater)
}

fn earliest<T: Timed>(items: &[T]) -> Option<f32> {
    items
        .iter()
        .map(Timed::time)
        .min_by(|a, b| a.total_cmp(b))
}

/// Everything recorded about one entity id.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: i32,
    pub class: EntityClass,
    /// First base type seen on a position, switch or DOF record.
    pub base_type: Option<i32>,
    /// Set by the first feature position record.
    pub feature: Option<FeatureLink>,
    pub positions: Vec<PositionSample>,
    pub switches: Vec<SwitchChange>,
    pub dofs: Vec<DofChange>,
    pub statuses: Vec<StatusChange>,
}

impl Entity {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            class: EntityClass::Unplaced,
            base_type: None,
            feature: None,
            positions: Vec::new(),
            switches: Vec::new(),
            dofs: Vec::new(),
            statuses: Vec::new(),
        }
    }

    /// Number of records folded into this entity.
    pub fn record_count(&self) -> usize {
        self.positions.len() + self.switches.len() + self.dofs.len() + self.statuses.len()
    }

    /// Time of the earliest record, regardless of how the sequences are sorted.
    pub fn first_appearance(&self) -> Option<f32> {
        [
            earliest(&self.positions),
            earliest(&self.switches),
            earliest(&self.dofs),
            earliest(&self.statuses),
        ]
        .into_iter()
        .flatten()
        .min_by(|a, b| a.total_cmp(b))
    }

    /// Stable sort of every sequence by time; equal times keep input order.
    pub fn sort_chronologically(&mut self) {
        self.positions.sort_by(by_time);
        self.switches.sort_by(by_time);
        self.dofs.sort_by(by_time);
        self.statuses.sort_by(by_time);
    }

    pub fn is_chronological(&self) -> bool {
        is_sorted_by_time(&self.positions)
            && is_sorted_by_time(&self.switches)
            && is_sorted_by_time(&self.dofs)
            && is_sorted_by_time(&self.statuses)
    }
}
