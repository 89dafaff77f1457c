mod util;

use mesh_subcell::prelude::*;
use util::*;

#[test]
fn unrequested_kinds_fail_fast() {
    let mesh = unit_square();
    let cache = DerivedCache::build(&mesh, MeshConfig::default()).unwrap();
    let view = cache.view(&mesh);

    assert_eq!(
        view.sides().err(),
        Some(MeshSubcellError::KindNotRequested(EntityKind::Side))
    );
    assert_eq!(
        view.count(EntityKind::Corner, Filter::All),
        Err(MeshSubcellError::KindNotRequested(EntityKind::Corner))
    );
    let conn = view.connectivity().unwrap();
    assert_eq!(
        conn.edge_nodes(0),
        Err(MeshSubcellError::KindNotRequested(EntityKind::Edge))
    );
    assert_eq!(conn.cell_num_faces(0), Ok(4));

    let geo = view.geometry().unwrap();
    assert_close(geo.cell_volume(0, Mode::Cached).unwrap(), 1.0);
    assert_eq!(
        geo.side_volume(0, Mode::Cached),
        Err(MeshSubcellError::KindNotRequested(EntityKind::Side))
    );
}

#[test]
fn faces_can_be_left_out() {
    let mesh = unit_square();
    let config = MeshConfig::default().with_faces(false);
    let cache = DerivedCache::build(&mesh, config).unwrap();
    let view = cache.view(&mesh);
    let conn = view.connectivity().unwrap();

    assert_eq!(
        conn.face_cells(0, Filter::All),
        Err(MeshSubcellError::KindNotRequested(EntityKind::Face))
    );
    assert_eq!(conn.cell_nodes(0), &[0, 1, 2, 3]);
    assert_eq!(cache.stage_state(Stage::FaceGeometry), StageState::Uncomputed);
}

#[test]
fn stages_build_in_dependency_order() {
    let mesh = unit_square();
    let mut cache = DerivedCache::new(&mesh, MeshConfig::all()).unwrap();

    assert_eq!(
        cache.ensure_sides(),
        Err(MeshSubcellError::StageNotCached {
            required: Stage::Ownership,
            requested: Stage::Sides
        })
    );
    cache.ensure_ownership(&mesh).unwrap();
    cache.ensure_connectivity(&mesh).unwrap();
    assert!(matches!(
        cache.ensure_corners(),
        Err(MeshSubcellError::StageNotCached {
            requested: Stage::Corners,
            ..
        })
    ));
    cache.ensure_sides().unwrap();
    cache.ensure_wedges().unwrap();
    cache.ensure_corners().unwrap();
    assert_eq!(cache.stage_state(Stage::Corners), StageState::Cached);

    // geometry stages are still missing
    let geo = cache.view(&mesh).geometry().unwrap();
    assert_eq!(
        geo.side_volume(0, Mode::Cached),
        Err(MeshSubcellError::StageNotCached {
            required: Stage::SideGeometry,
            requested: Stage::SideGeometry
        })
    );
    assert_close(geo.side_volume(0, Mode::Recompute).unwrap(), 0.25);
    assert!(cache.ensure_side_geometry(&mesh).is_err());

    cache.ensure_cell_geometry(&mesh).unwrap();
    cache.ensure_face_geometry(&mesh).unwrap();
    cache.ensure_side_geometry(&mesh).unwrap();
    cache.ensure_corner_geometry().unwrap();
    // already cached: no-op
    cache.ensure_sides().unwrap();
    assert_close(
        cache.view(&mesh).geometry().unwrap().corner_volume(0, Mode::Cached).unwrap(),
        0.25,
    );
}

#[test]
fn recompute_sees_moved_nodes_until_rebuild() {
    let mut mesh = unit_square();
    let mut cache = full_cache(&mesh);
    mesh.set_node_coordinates(2, &[2.0, 2.0]).unwrap();

    {
        let geo = cache.view(&mesh).geometry().unwrap();
        assert_close(geo.cell_volume(0, Mode::Cached).unwrap(), 1.0);
        let moved = geo.cell_volume(0, Mode::Recompute).unwrap();
        assert_close(moved, 2.0);
        let corners: f64 = (0..4)
            .map(|k| geo.corner_volume(k, Mode::Recompute).unwrap())
            .sum();
        assert_close(corners, moved);
    }

    cache.rebuild(&mesh).unwrap();
    let geo = cache.view(&mesh).geometry().unwrap();
    for s in 0..4 {
        assert_eq!(
            geo.side_geometry(s, Mode::Cached).unwrap(),
            geo.side_geometry(s, Mode::Recompute).unwrap()
        );
    }
    for f in 0..4 {
        assert_eq!(
            geo.face_normal(f, Mode::Cached, None).unwrap(),
            geo.face_normal(f, Mode::Recompute, None).unwrap()
        );
    }
}

#[test]
fn rebuild_is_deterministic() {
    let mesh = structured_box_3d(2, 2, 2, [0.0; 3], [1.0; 3], MeshGenOptions::default()).unwrap();
    let a = full_cache(&mesh);
    let mut b = full_cache(&mesh);
    b.rebuild(&mesh).unwrap();

    assert_eq!(a.geometry(), b.geometry());
    let (sa, sb) = (a.sides().unwrap(), b.sides().unwrap());
    for s in 0..sa.len() {
        assert_eq!(sa.nodes(s), sb.nodes(s));
        assert_eq!(sa.opposite(s), sb.opposite(s));
    }
    let (ka, kb) = (a.corners().unwrap(), b.corners().unwrap());
    for k in 0..ka.len() {
        assert_eq!(ka.wedges(k), kb.wedges(k));
    }
    a.validate_invariants().unwrap();
}

#[test]
fn boundary_ghosts_have_zero_geometry() {
    let options = MeshGenOptions {
        ghost_layers: 1,
        boundary_ghost_layers: 1,
        ..Default::default()
    };
    let mesh = quad_grid(4, 2, options);
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let geo = view.geometry().unwrap();

    let cells = view.counts(EntityKind::Cell).unwrap();
    assert_eq!((cells.owned, cells.ghost, cells.boundary_ghost), (4, 2, 2));
    for mode in [Mode::Cached, Mode::Recompute] {
        for c in view.entities(EntityKind::Cell, Filter::BoundaryGhost).unwrap() {
            assert_eq!(geo.cell_volume(c, mode).unwrap(), 0.0);
        }
        for f in view.entities(EntityKind::Face, Filter::BoundaryGhost).unwrap() {
            let g = geo.face_geometry(f, mode).unwrap();
            assert_eq!(g.area, 0.0);
            assert_eq!(g.normals, [[0.0; 3]; 2]);
        }
        for k in view.entities(EntityKind::Corner, Filter::BoundaryGhost).unwrap() {
            assert_eq!(geo.corner_volume(k, mode).unwrap(), 0.0);
        }
        for w in view.entities(EntityKind::Wedge, Filter::BoundaryGhost).unwrap() {
            assert_eq!(geo.wedge_facet_normals(w, mode).unwrap(), [[0.0; 3]; 2]);
        }
    }
    // ghost geometry is real
    for c in view.entities(EntityKind::Cell, Filter::Ghost).unwrap() {
        assert_close(geo.cell_volume(c, Mode::Cached).unwrap(), 1.0);
    }
}

#[test]
fn ownership_is_inherited_from_cells() {
    let options = MeshGenOptions {
        ghost_layers: 1,
        ..Default::default()
    };
    let mesh = quad_grid(3, 1, options);
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let sides = view.sides().unwrap();
    let wedges = view.wedges().unwrap();
    let corners = view.corners().unwrap();

    for s in 0..sides.len() {
        let cell = view.ownership(EntityKind::Cell, sides.side_cell(s)).unwrap();
        assert_eq!(view.ownership(EntityKind::Side, s).unwrap(), cell);
    }
    for w in 0..wedges.len() {
        let cell = view.ownership(EntityKind::Cell, wedges.wedge_cell(w)).unwrap();
        assert_eq!(view.ownership(EntityKind::Wedge, w).unwrap(), cell);
    }
    for k in 0..corners.len() {
        let cell = view.ownership(EntityKind::Cell, corners.corner_cell(k)).unwrap();
        assert_eq!(view.ownership(EntityKind::Corner, k).unwrap(), cell);
    }
    // a node touched only by the ghost column
    let n = view.entities(EntityKind::Node, Filter::Ghost).unwrap().start;
    assert_eq!(view.ownership(EntityKind::Node, n).unwrap(), Ownership::Ghost);
    let owned_only = wedges.node_wedges(n, Filter::Owned);
    assert!(owned_only.is_empty());
    assert_eq!(corners.node_corners(n, Filter::Ghost).len(), 1);
}

#[test]
fn config_round_trips_through_json() {
    let config = MeshConfig::default().with_corners(true);
    let json = serde_json::to_string(&config).unwrap();
    let back: MeshConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let partial: MeshConfig = serde_json::from_str(r#"{"edges": true}"#).unwrap();
    assert!(partial.faces && partial.edges && !partial.sides);

    let options: MeshGenOptions =
        serde_json::from_str(r#"{"ghost_layers": 2, "geometry_type": "Spherical"}"#).unwrap();
    assert_eq!(options.ghost_layers, 2);
    assert_eq!(options.boundary_ghost_layers, 0);
    assert_eq!(options.geometry_type, GeometryType::Spherical);
}

#[test]
fn unsupported_dimensions_are_rejected() {
    let b = MeshBuilder::new(3, 2);
    assert_eq!(
        b.build().unwrap_err(),
        MeshSubcellError::UnsupportedDimensions {
            manifold: 3,
            space: 2
        }
    );
}

#[test]
fn wedge_corner_reports_missing_corner_stage() {
    let mesh = unit_square();
    let mut cache = DerivedCache::new(&mesh, MeshConfig::all()).unwrap();
    cache.ensure_ownership(&mesh).unwrap();
    cache.ensure_connectivity(&mesh).unwrap();
    cache.ensure_sides().unwrap();
    cache.ensure_wedges().unwrap();

    let wedges = cache.view(&mesh).wedges().unwrap();
    assert_eq!(
        wedges.wedge_corner(0),
        Err(MeshSubcellError::StageNotCached {
            required: Stage::Corners,
            requested: Stage::Corners
        })
    );
    cache.ensure_corners().unwrap();
    assert_eq!(cache.view(&mesh).wedges().unwrap().wedge_corner(7), Ok(0));

    let no_corners = MeshConfig::all().with_corners(false);
    let cache = DerivedCache::build(&mesh, no_corners).unwrap();
    assert_eq!(
        cache.view(&mesh).wedges().unwrap().wedge_corner(0),
        Err(MeshSubcellError::KindNotRequested(EntityKind::Corner))
    );
}
