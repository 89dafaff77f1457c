//! Cache stages and their dependency order.

use crate::mesh_error::MeshSubcellError;

/// One cached quantity of the derived cache.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Ownership,
    Connectivity,
    Sides,
    Wedges,
    Corners,
    CellGeometry,
    FaceGeometry,
    EdgeGeometry,
    SideGeometry,
    CornerGeometry,
}

/// Per-stage state. Stages only move forward.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum StageState {
    #[default]
    Uncomputed,
    Cached,
}

impl Stage {
    /// Every stage in build order.
    pub const ALL: [Stage; 10] = [
        Stage::Ownership,
        Stage::Connectivity,
        Stage::Sides,
        Stage::Wedges,
        Stage::Corners,
        Stage::CellGeometry,
        Stage::FaceGeometry,
        Stage::EdgeGeometry,
        Stage::SideGeometry,
        Stage::CornerGeometry,
    ];

    /// Stages that must be cached before this one may be built.
    pub fn prerequisites(self) -> &'static [Stage] {
        match self {
            Stage::Ownership => &[],
            Stage::Connectivity => &[Stage::Ownership],
            Stage::Sides => &[Stage::Ownership, Stage::Connectivity],
            Stage::Wedges => &[Stage::Sides],
            Stage::Corners => &[Stage::Sides, Stage::Wedges],
            Stage::CellGeometry | Stage::FaceGeometry | Stage::EdgeGeometry => {
                &[Stage::Connectivity]
            }
            Stage::SideGeometry => &[Stage::Sides, Stage::CellGeometry, Stage::FaceGeometry],
            Stage::CornerGeometry => &[Stage::Corners, Stage::SideGeometry],
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Forward-only record of which stages are cached.
#[derive(Clone, Debug, Default)]
pub struct StageTracker {
    states: [StageState; Stage::ALL.len()],
}

impl StageTracker {
    pub fn state(&self, stage: Stage) -> StageState {
        self.states[stage.index()]
    }

    pub fn is_cached(&self, stage: Stage) -> bool {
        self.state(stage) == StageState::Cached
    }

    pub fn mark_cached(&mut self, stage: Stage) {
        self.states[stage.index()] = StageState::Cached;
    }

    /// `Ok` if `required` is cached; otherwise the error naming what `requested` lacked.
    pub fn require(&self, required: Stage, requested: Stage) -> Result<(), MeshSubcellError> {
        if self.is_cached(required) {
            Ok(())
        } else {
            Err(MeshSubcellError::StageNotCached {
                required,
                requested,
            })
        }
    }

    /// Check every prerequisite of `stage`.
    pub fn require_prerequisites(&self, stage: Stage) -> Result<(), MeshSubcellError> {
        stage
            .prerequisites()
            .iter()
            .try_for_each(|&p| self.require(p, stage))
    }
}
