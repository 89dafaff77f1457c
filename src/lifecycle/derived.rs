//! The derived cache: everything this crate computes about one mesh.
//!
//! A [`DerivedCache`] is owned separately from the backend it describes and
//! is only mutated by its build methods. Each `ensure_*` method builds one
//! stage, checks that the stage's prerequisites are already cached, and
//! does nothing when the stage is cached already.

use crate::backend::{GeometryType, MeshBackend};
use crate::debug_invariants::{DebugInvariants, ensure_invariant};
use crate::geometry::kernel::GeometryKernel;
use crate::geometry::quantities::{GeometryCache, GeometrySource};
use crate::lifecycle::config::MeshConfig;
use crate::lifecycle::stage::{Stage, StageState, StageTracker};
use crate::lifecycle::view::MeshView;
use crate::mesh_error::MeshSubcellError;
use crate::topology::connectivity::Connectivity;
use crate::topology::corners::CornerTable;
use crate::topology::entity::{EntityCounts, EntityKind, Filter};
use crate::topology::ownership::OwnershipTable;
use crate::topology::sides::SideTable;
use crate::topology::wedges::WedgeTable;

#[derive(Clone, Debug)]
pub struct DerivedCache {
    config: MeshConfig,
    manifold: usize,
    space: usize,
    geometry_type: GeometryType,
    kernel: GeometryKernel,
    num_nodes: usize,
    stages: StageTracker,
    ownership: Option<OwnershipTable>,
    connectivity: Option<Connectivity>,
    sides: Option<SideTable>,
    wedges: Option<WedgeTable>,
    corners: Option<CornerTable>,
    geometry: GeometryCache,
}

impl DerivedCache {
    /// An empty cache for `backend`; `config` is normalised first.
    pub fn new<B: MeshBackend + ?Sized>(
        backend: &B,
        config: MeshConfig,
    ) -> Result<Self, MeshSubcellError> {
        let manifold = backend.manifold_dimension();
        let space = backend.space_dimension();
        let geometry_type = backend.geometry_type();
        let kernel = GeometryKernel::select(manifold, space, geometry_type)?;
        Ok(Self {
            config: config.normalized(),
            manifold,
            space,
            geometry_type,
            kernel,
            num_nodes: backend.counts(EntityKind::Node).total(),
            stages: StageTracker::default(),
            ownership: None,
            connectivity: None,
            sides: None,
            wedges: None,
            corners: None,
            geometry: GeometryCache::default(),
        })
    }

    /// Create and fully build a cache.
    pub fn build<B: MeshBackend + ?Sized>(
        backend: &B,
        config: MeshConfig,
    ) -> Result<Self, MeshSubcellError> {
        let mut cache = Self::new(backend, config)?;
        cache.build_all(backend)?;
        Ok(cache)
    }

    /// Build every stage the configuration asks for, in dependency order.
    pub fn build_all<B: MeshBackend + ?Sized>(&mut self, backend: &B) -> Result<(), MeshSubcellError> {
        self.ensure_ownership(backend)?;
        self.ensure_connectivity(backend)?;
        if self.config.sides {
            self.ensure_sides()?;
        }
        if self.config.wedges {
            self.ensure_wedges()?;
        }
        if self.config.corners {
            self.ensure_corners()?;
        }
        self.ensure_cell_geometry(backend)?;
        if self.config.faces {
            self.ensure_face_geometry(backend)?;
        }
        if self.config.edges {
            self.ensure_edge_geometry(backend)?;
        }
        if self.config.sides {
            self.ensure_side_geometry(backend)?;
        }
        if self.config.corners {
            self.ensure_corner_geometry()?;
        }
        crate::debug_invariants!(self.validate_invariants(), "DerivedCache::build_all");
        Ok(())
    }

    /// Discard every stage and build again from `backend`, e.g. after
    /// connectivity or coordinates changed.
    pub fn rebuild<B: MeshBackend + ?Sized>(&mut self, backend: &B) -> Result<(), MeshSubcellError> {
        log::debug!("rebuilding derived cache");
        *self = Self::new(backend, self.config)?;
        self.build_all(backend)
    }

    fn begin(&self, stage: Stage) -> Result<bool, MeshSubcellError> {
        if self.stages.is_cached(stage) {
            return Ok(false);
        }
        self.stages.require_prerequisites(stage)?;
        log::trace!("building stage {stage:?}");
        Ok(true)
    }

    fn require_kind(&self, kind: EntityKind) -> Result<(), MeshSubcellError> {
        if self.config.requests(kind) {
            Ok(())
        } else {
            Err(MeshSubcellError::KindNotRequested(kind))
        }
    }

    pub fn ensure_ownership<B: MeshBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), MeshSubcellError> {
        if self.begin(Stage::Ownership)? {
            self.ownership = Some(OwnershipTable::classify(backend));
            self.stages.mark_cached(Stage::Ownership);
        }
        Ok(())
    }

    pub fn ensure_connectivity<B: MeshBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), MeshSubcellError> {
        if self.begin(Stage::Connectivity)? {
            self.connectivity = Some(Connectivity::build(backend, self.config.edges)?);
            self.stages.mark_cached(Stage::Connectivity);
        }
        Ok(())
    }

    pub fn ensure_sides(&mut self) -> Result<(), MeshSubcellError> {
        self.require_kind(EntityKind::Side)?;
        if self.begin(Stage::Sides)? {
            let table = SideTable::derive(self.connectivity()?, self.ownership()?)?;
            self.sides = Some(table);
            self.stages.mark_cached(Stage::Sides);
        }
        Ok(())
    }

    pub fn ensure_wedges(&mut self) -> Result<(), MeshSubcellError> {
        self.require_kind(EntityKind::Wedge)?;
        if self.begin(Stage::Wedges)? {
            let table = WedgeTable::derive(self.sides()?, self.num_nodes);
            self.wedges = Some(table);
            self.stages.mark_cached(Stage::Wedges);
        }
        Ok(())
    }

    pub fn ensure_corners(&mut self) -> Result<(), MeshSubcellError> {
        self.require_kind(EntityKind::Corner)?;
        if self.begin(Stage::Corners)? {
            let table = CornerTable::derive(
                self.connectivity()?,
                self.ownership()?,
                self.sides()?,
                self.num_nodes,
            )?;
            self.corners = Some(table);
            self.stages.mark_cached(Stage::Corners);
        }
        Ok(())
    }

    pub(crate) fn source<'a, B: MeshBackend + ?Sized>(
        &'a self,
        backend: &'a B,
    ) -> Result<GeometrySource<'a, B>, MeshSubcellError> {
        Ok(GeometrySource {
            backend,
            conn: self.connectivity()?,
            own: self.ownership()?,
            kernel: self.kernel,
        })
    }

    /// Run one geometry build against the taken-out geometry cache.
    fn build_geometry<F>(&mut self, stage: Stage, build: F) -> Result<(), MeshSubcellError>
    where
        F: FnOnce(&Self, &mut GeometryCache) -> Result<(), MeshSubcellError>,
    {
        if !self.begin(stage)? {
            return Ok(());
        }
        let mut geometry = std::mem::take(&mut self.geometry);
        let built = build(self, &mut geometry);
        self.geometry = geometry;
        built?;
        self.stages.mark_cached(stage);
        Ok(())
    }

    pub fn ensure_cell_geometry<B: MeshBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), MeshSubcellError> {
        self.build_geometry(Stage::CellGeometry, |cache, geo| {
            geo.build_cells(&cache.source(backend)?);
            Ok(())
        })
    }

    pub fn ensure_face_geometry<B: MeshBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), MeshSubcellError> {
        self.require_kind(EntityKind::Face)?;
        self.build_geometry(Stage::FaceGeometry, |cache, geo| {
            geo.build_faces(&cache.source(backend)?);
            Ok(())
        })
    }

    pub fn ensure_edge_geometry<B: MeshBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), MeshSubcellError> {
        self.require_kind(EntityKind::Edge)?;
        self.build_geometry(Stage::EdgeGeometry, |cache, geo| {
            geo.build_edges(&cache.source(backend)?);
            Ok(())
        })
    }

    pub fn ensure_side_geometry<B: MeshBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), MeshSubcellError> {
        self.require_kind(EntityKind::Side)?;
        self.build_geometry(Stage::SideGeometry, |cache, geo| {
            geo.build_sides(&cache.source(backend)?, cache.sides()?)
        })
    }

    pub fn ensure_corner_geometry(&mut self) -> Result<(), MeshSubcellError> {
        self.require_kind(EntityKind::Corner)?;
        self.build_geometry(Stage::CornerGeometry, |cache, geo| {
            geo.build_corners(&cache.kernel, cache.corners()?)
        })
    }

    pub fn config(&self) -> MeshConfig {
        self.config
    }

    pub fn manifold_dimension(&self) -> usize {
        self.manifold
    }

    pub fn space_dimension(&self) -> usize {
        self.space
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    pub fn kernel(&self) -> GeometryKernel {
        self.kernel
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn stage_state(&self, stage: Stage) -> StageState {
        self.stages.state(stage)
    }

    fn cached<'a, T>(slot: &'a Option<T>, stage: Stage) -> Result<&'a T, MeshSubcellError> {
        slot.as_ref().ok_or(MeshSubcellError::StageNotCached {
            required: stage,
            requested: stage,
        })
    }

    pub fn ownership(&self) -> Result<&OwnershipTable, MeshSubcellError> {
        Self::cached(&self.ownership, Stage::Ownership)
    }

    pub fn connectivity(&self) -> Result<&Connectivity, MeshSubcellError> {
        Self::cached(&self.connectivity, Stage::Connectivity)
    }

    pub fn sides(&self) -> Result<&SideTable, MeshSubcellError> {
        Self::cached(&self.sides, Stage::Sides)
    }

    pub fn wedges(&self) -> Result<&WedgeTable, MeshSubcellError> {
        Self::cached(&self.wedges, Stage::Wedges)
    }

    pub fn corners(&self) -> Result<&CornerTable, MeshSubcellError> {
        Self::cached(&self.corners, Stage::Corners)
    }

    pub fn geometry(&self) -> &GeometryCache {
        &self.geometry
    }

    /// Read access to this cache together with its backend.
    pub fn view<'a, B: MeshBackend + ?Sized>(&'a self, backend: &'a B) -> MeshView<'a, B> {
        MeshView::new(backend, self)
    }
}

impl DebugInvariants for DerivedCache {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "DerivedCache");
    }

    /// Structural checks on whatever stages are cached: the side and corner
    /// lattices, ownership inheritance and count bookkeeping.
    fn validate_invariants(&self) -> Result<(), MeshSubcellError> {
        let (Ok(own), Ok(sides)) = (self.ownership(), self.sides()) else {
            return Ok(());
        };
        sides.validate_invariants()?;

        let mut expected = EntityCounts::default();
        for c in own.cells().range(Filter::All) {
            expected.bump(own.cell(c), sides.cell_sides(c).len());
        }
        ensure_invariant(expected == sides.counts(), || {
            format!(
                "side counts {:?} differ from those implied by cells {:?}",
                sides.counts(),
                expected
            )
        })?;

        if let Ok(wedges) = self.wedges() {
            let sc = sides.counts();
            ensure_invariant(
                wedges.counts()
                    == EntityCounts::new(2 * sc.owned, 2 * sc.ghost, 2 * sc.boundary_ghost),
                || format!("wedge counts {:?} are not twice the side counts", wedges.counts()),
            )?;
        }

        if let Ok(corners) = self.corners() {
            corners.validate_invariants()?;
            for k in 0..corners.len() {
                let c = corners.cell(k);
                for &w in corners.wedges(k) {
                    ensure_invariant(sides.cell(w / 2) == c, || {
                        format!("wedge {w} of corner {k} lies outside cell {c}")
                    })?;
                }
            }
            let mut expected = EntityCounts::default();
            for k in 0..corners.len() {
                expected.bump(own.cell(corners.cell(k)), 1);
            }
            ensure_invariant(expected == corners.counts(), || {
                format!("corner counts {:?} do not follow their cells", corners.counts())
            })?;
        }
        Ok(())
    }
}
