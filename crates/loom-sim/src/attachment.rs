//! Anchor slots and their lazy binding to particles.

use glam::Vec3;
use loom_solver::PbdSolver;
use loom_types::{AnchorSlot, FabricError, FabricResult, ParticleId};
use serde::{Deserialize, Serialize};

/// Binding state of one anchor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttachmentState {
    #[default]
    Unattached,
    Attached(ParticleId),
}

impl AttachmentState {
    pub fn is_attached(&self) -> bool {
        matches!(self, AttachmentState::Attached(_))
    }

    pub fn particle(&self) -> Option<ParticleId> {
        match self {
            AttachmentState::Attached(id) => Some(*id),
            AttachmentState::Unattached => None,
        }
    }
}

/// What a pose did to its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseOutcome {
    /// No particle qualified; the slot stays unattached.
    Missed,
    /// The slot bound this particle.
    Attached(ParticleId),
    /// The slot's particle was moved.
    Updated(ParticleId),
}

/// Fixed set of anchor slots.
///
/// A slot binds on the first pose for which the solver finds a particle
/// and keeps that particle until [`AttachmentManager::reset`].
#[derive(Debug, Clone)]
pub struct AttachmentManager {
    slots: Vec<AttachmentState>,
    z_offset: f32,
}

impl AttachmentManager {
    pub fn new(count: usize, z_offset: f64) -> Self {
        Self {
            slots: vec![AttachmentState::Unattached; count],
            z_offset: z_offset as f32,
        }
    }

    /// Applies one anchor pose.
    ///
    /// The z offset is added before the pose reaches the solver.
    pub fn on_pose(
        &mut self,
        slot: AnchorSlot,
        pose: Vec3,
        solver: &mut dyn PbdSolver,
    ) -> FabricResult<PoseOutcome> {
        let count = self.slots.len();
        let state = *self
            .slots
            .get(slot.index())
            .ok_or(FabricError::UnknownAnchor { slot: slot.index(), count })?;
        let point = pose + Vec3::new(0.0, 0.0, self.z_offset);

        match state {
            AttachmentState::Attached(id) => {
                solver.update_attached_pose(id, point)?;
                Ok(PoseOutcome::Updated(id))
            }
            AttachmentState::Unattached => match solver.attach_nearest(point) {
                Some(id) => {
                    if let Some(other) = self.holder_of(id) {
                        tracing::warn!(
                            %slot,
                            particle = %id,
                            shared_with = other,
                            "Anchor bound a particle already held by another slot"
                        );
                    }
                    self.slots[slot.index()] = AttachmentState::Attached(id);
                    tracing::debug!(%slot, particle = %id, "Anchor attached");
                    Ok(PoseOutcome::Attached(id))
                }
                None => Ok(PoseOutcome::Missed),
            },
        }
    }

    /// Returns every slot to unattached.
    pub fn reset(&mut self) {
        self.slots.fill(AttachmentState::Unattached);
    }

    pub fn state(&self, slot: AnchorSlot) -> FabricResult<AttachmentState> {
        self.slots
            .get(slot.index())
            .copied()
            .ok_or(FabricError::UnknownAnchor {
                slot: slot.index(),
                count: self.slots.len(),
            })
    }

    pub fn states(&self) -> &[AttachmentState] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn attached_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_attached()).count()
    }

    fn holder_of(&self, id: ParticleId) -> Option<usize> {
        self.slots.iter().position(|s| s.particle() == Some(id))
    }
}
