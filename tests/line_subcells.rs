mod util;

use std::f64::consts::PI;

use mesh_subcell::prelude::*;
use util::*;

#[test]
fn two_segments_sides_pair_at_shared_node() {
    let mesh = two_segments(GeometryType::Cartesian);
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let sides = view.sides().unwrap();
    let geo = view.geometry().unwrap();

    assert_eq!(sides.len(), 4);
    assert_eq!(sides.cell_sides(0), &[0, 1]);
    assert_eq!(sides.side_nodes(1), [1, 1]);
    assert_eq!(sides.side_opposite(1), Some(2));
    assert_eq!(sides.side_opposite(2), Some(1));
    assert_eq!(sides.side_opposite(0), None);
    assert_eq!(sides.side_opposite(3), None);

    for s in 0..4 {
        assert_close(geo.side_volume(s, Mode::Cached).unwrap(), 0.5);
        assert_eq!(
            geo.side_mid_facet_normal(s, Mode::Cached).unwrap(),
            [0.0; 3]
        );
    }
    assert_point_close(
        geo.side_outward_facet_normal(0, Mode::Cached).unwrap(),
        [-1.0, 0.0, 0.0],
    );
    assert_point_close(
        geo.side_outward_facet_normal(1, Mode::Cached).unwrap(),
        [1.0, 0.0, 0.0],
    );
    assert_point_close(
        geo.side_outward_facet_normal(2, Mode::Cached).unwrap(),
        [-1.0, 0.0, 0.0],
    );
}

#[test]
fn line_face_normals_follow_cells() {
    let mesh = two_segments(GeometryType::Cartesian);
    let cache = full_cache(&mesh);
    let geo = cache.view(&mesh).geometry().unwrap();

    let (n0, d0) = geo.face_normal(1, Mode::Cached, Some(0)).unwrap();
    let (n1, d1) = geo.face_normal(1, Mode::Cached, Some(1)).unwrap();
    assert_eq!((n0, d0), ([1.0, 0.0, 0.0], Dir::POS));
    assert_eq!((n1, d1), ([-1.0, 0.0, 0.0], Dir::NEG));
    assert_eq!(
        geo.face_normal(1, Mode::Cached, None).unwrap(),
        ([1.0, 0.0, 0.0], Dir::POS)
    );
    assert!(matches!(
        geo.face_normal(2, Mode::Cached, Some(0)),
        Err(MeshSubcellError::TopologyInconsistency(_))
    ));
    assert_eq!(geo.face_area(1, Mode::Cached).unwrap(), 1.0);
}

#[test]
fn line_wedges_and_corners() {
    let mesh = two_segments(GeometryType::Cartesian);
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let wedges = view.wedges().unwrap();
    let corners = view.corners().unwrap();
    let geo = view.geometry().unwrap();

    assert_eq!(wedges.len(), 8);
    // wedges 2 and 3 sit on side 1, at node 1 of cell 0
    assert_eq!(wedges.wedge_node(2), 1);
    assert_eq!(wedges.wedge_node(3), 1);
    assert_eq!(wedges.wedge_opposite(2), Some(4));
    assert_eq!(wedges.wedge_opposite(3), Some(5));
    assert_eq!(wedges.wedge_opposite(0), None);
    assert_eq!(wedges.node_wedges(1, Filter::All), vec![2, 3, 4, 5]);
    assert_eq!(wedges.cell_wedges(1), vec![4, 5, 6, 7]);

    assert_eq!(corners.len(), 4);
    assert_eq!(corners.node_corners(1, Filter::All).len(), 2);
    for k in 0..4 {
        assert_eq!(corners.corner_wedges(k).len(), 2);
        assert_close(geo.corner_volume(k, Mode::Cached).unwrap(), 0.5);
        let facets = geo.corner_facetization::<1>(k, Mode::Cached).unwrap();
        assert_eq!(facets.len(), 2);
    }
    let k = corners.cell_corner_at_node(1, 2).unwrap();
    assert_eq!(
        geo.corner_coordinates(k, Mode::Cached).unwrap(),
        vec![[2.0, 0.0, 0.0], [1.5, 0.0, 0.0]]
    );
    assert_eq!(corners.cell_corner_at_node(0, 2), None);
}

#[test]
fn line_coordinates_orient_by_axis() {
    let mesh = two_segments(GeometryType::Cartesian);
    let cache = full_cache(&mesh);
    let geo = cache.view(&mesh).geometry().unwrap();

    // side 1 sits at the trailing node of cell 0
    assert_eq!(
        geo.side_coordinates(1, false, Mode::Cached).unwrap(),
        vec![[1.0, 0.0, 0.0], [0.5, 0.0, 0.0]]
    );
    assert_eq!(
        geo.side_coordinates(1, true, Mode::Cached).unwrap(),
        vec![[0.5, 0.0, 0.0], [1.0, 0.0, 0.0]]
    );
    assert_eq!(
        geo.wedge_coordinates(0, true, Mode::Cached).unwrap(),
        vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]
    );
}

#[test]
fn spherical_shells_conserve_volume() {
    let mesh = two_segments(GeometryType::Spherical);
    let cache = full_cache(&mesh);
    let geo = cache.view(&mesh).geometry().unwrap();

    let shell = |r0: f64, r1: f64| 4.0 / 3.0 * PI * (r1.powi(3) - r0.powi(3));
    assert_close(geo.cell_volume(0, Mode::Cached).unwrap(), shell(0.0, 1.0));
    assert_close(geo.cell_volume(1, Mode::Cached).unwrap(), shell(1.0, 2.0));
    assert_close(geo.face_area(2, Mode::Cached).unwrap(), 16.0 * PI);

    for c in 0..2 {
        let cell = geo.cell_volume(c, Mode::Cached).unwrap();
        let sides: f64 = [2 * c, 2 * c + 1]
            .iter()
            .map(|&s| geo.side_volume(s, Mode::Cached).unwrap())
            .sum();
        assert!((sides - cell).abs() < 1e-12 * cell);
    }
    for s in 0..4 {
        assert!(geo.side_volume(s, Mode::Cached).unwrap() > 0.0);
    }
    // outward facet of the side at r = 2 carries the sphere's area
    let n = geo.side_outward_facet_normal(3, Mode::Cached).unwrap();
    assert_close(n[0], 16.0 * PI);
}

#[test]
fn generated_line_with_ghosts() {
    let options = MeshGenOptions {
        ghost_layers: 1,
        boundary_ghost_layers: 1,
        ..Default::default()
    };
    let mesh = line_mesh(5, 0.0, 5.0, options).unwrap();
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let geo = view.geometry().unwrap();

    let cells = view.counts(EntityKind::Cell).unwrap();
    assert_eq!((cells.owned, cells.ghost, cells.boundary_ghost), (3, 1, 1));
    let sides = view.counts(EntityKind::Side).unwrap();
    assert_eq!((sides.owned, sides.ghost, sides.boundary_ghost), (6, 2, 2));
    for s in view.entities(EntityKind::Side, Filter::BoundaryGhost).unwrap() {
        assert_eq!(view.ownership(EntityKind::Side, s).unwrap(), Ownership::BoundaryGhost);
        assert_eq!(geo.side_volume(s, Mode::Cached).unwrap(), 0.0);
        assert_eq!(geo.side_volume(s, Mode::Recompute).unwrap(), 0.0);
        assert_eq!(geo.side_outward_facet_normal(s, Mode::Cached).unwrap(), [0.0; 3]);
    }
    let owned: f64 = view
        .entities(EntityKind::Corner, Filter::Owned)
        .unwrap()
        .map(|k| geo.corner_volume(k, Mode::Cached).unwrap())
        .sum();
    assert_close(owned, 3.0);
}
