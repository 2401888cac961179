// crates/flt2vhs-core/src/model/index.rs

use std::collections::HashMap;

use log::{trace, warn};
use rayon::prelude::*;

use crate::flt::catalog::{PositionData, Record, RecordBody, RecordType};
use crate::model::entity::{
    DofChange, Entity, EntityClass, FeatureLink, PositionSample, StatusChange, SwitchChange,
    NO_RADAR_TARGET,
};

/// Per-entity histories keyed by entity id.
///
/// Appending never scans: each record costs one hash lookup and one push.
/// Records are appended in arrival order; sorting happens once, in the
/// assembler.
#[derive(Clone, Debug, Default)]
pub struct EntityIndex {
    entities: HashMap<i32, Entity>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Entities in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&i32, &Entity)> {
        self.entities.iter()
    }

    pub(crate) fn sort_all_chronologically(&mut self) {
        self.entities
            .par_iter_mut()
            .for_each(|(_, e)| e.sort_chronologically());
    }

    fn entry(&mut self, id: i32) -> &mut Entity {
        self.entities.entry(id).or_insert_with(|| {
            trace!("new entity {id}");
            Entity::new(id)
        })
    }

    /// Routes an entity-scoped record to its entity, creating the entity on
    /// first reference. Returns false for records that are not entity-scoped.
    pub fn apply(&mut self, record: &Record<'_>) -> bool {
        let time = record.time;
        let ty = record.record_type();
        match &record.body {
            RecordBody::GenPosition(p)
            | RecordBody::MissilePosition(p)
            | RecordBody::ChaffPosition(p)
            | RecordBody::FlarePosition(p) => {
                self.place(p, ty, time, NO_RADAR_TARGET);
            }
            RecordBody::AircraftPosition {
                position,
                radar_target,
            } => {
                self.place(position, ty, time, *radar_target);
            }
            RecordBody::FeaturePosition(f) => {
                let e = self.entry(f.id);
                if !matches!(e.class, EntityClass::Unplaced | EntityClass::Feature) {
                    warn!(
                        "{:?} entity {} got a feature position (lead {}, slot {}); \
                         its row keeps the class and carries the linkage",
                        e.class, f.id, f.lead_id, f.slot
                    );
                }
                note_base_type(e, f.base_type);
                note_class(e, EntityClass::Feature);
                let link = FeatureLink {
                    lead_id: f.lead_id,
                    slot: f.slot,
                    special_flags: f.special_flags,
                };
                match e.feature {
                    None => e.feature = Some(link),
                    Some(first) if first != link => {
                        trace!(
                            "feature {} relinked ({:?} -> {:?}), keeping the first",
                            f.id,
                            first,
                            link
                        );
                    }
                    Some(_) => {}
                }
                e.positions.push(PositionSample {
                    time,
                    x: f.x,
                    y: f.y,
                    z: f.z,
                    yaw: f.yaw,
                    pitch: f.pitch,
                    roll: f.roll,
                    radar_target: NO_RADAR_TARGET,
                });
            }
            RecordBody::Switch(s) => {
                let e = self.entry(s.id);
                note_base_type(e, s.base_type);
                e.switches.push(SwitchChange {
                    time,
                    number: s.number,
                    value: s.value,
                    previous: s.previous,
                });
            }
            RecordBody::Dof(d) => {
                let e = self.entry(d.id);
                note_base_type(e, d.base_type);
                e.dofs.push(DofChange {
                    time,
                    number: d.number,
                    value: d.value,
                    previous: d.previous,
                });
            }
            RecordBody::FeatureStatus(s) => {
                self.entry(s.id).statuses.push(StatusChange {
                    time,
                    new_status: s.new_status,
                    previous_status: s.previous_status,
                });
            }
            RecordBody::TracerStart(_)
            | RecordBody::StationarySfx(_)
            | RecordBody::MovingSfx(_)
            | RecordBody::TodOffset
            | RecordBody::CallsignList(_) => return false,
        }
        true
    }

    fn place(&mut self, p: &PositionData, ty: RecordType, time: f32, radar_target: i32) {
        let e = self.entry(p.id);
        note_base_type(e, p.base_type);
        if let Some(class) = EntityClass::from_position_type(ty) {
            note_class(e, class);
        }
        e.positions.push(PositionSample {
            time,
            x: p.x,
            y: p.y,
            z: p.z,
            yaw: p.yaw,
            pitch: p.pitch,
            roll: p.roll,
            radar_target,
        });
    }
}

fn note_base_type(e: &mut Entity, base_type: i32) {
    match e.base_type {
        None => e.base_type = Some(base_type),
        Some(first) if first != base_type => {
            trace!(
                "entity {} switched base type from {} to {}",
                e.id,
                first,
                base_type
            );
        }
        Some(_) => {}
    }
}

fn note_class(e: &mut Entity, class: EntityClass) {
    if e.class == EntityClass::Unplaced {
        e.class = class;
    } else if e.class != class {
        trace!(
            "entity {} switched class from {:?} to {:?}",
            e.id,
            e.class,
            class
        );
    }
}
