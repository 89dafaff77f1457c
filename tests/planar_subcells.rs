mod util;

use mesh_subcell::prelude::*;
use util::*;

#[test]
fn unit_square_sides() {
    let mesh = unit_square();
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let sides = view.sides().unwrap();
    let geo = view.geometry().unwrap();

    assert_eq!(view.count(EntityKind::Side, Filter::All).unwrap(), 4);
    let expected_nodes = [[0, 1], [1, 2], [2, 3], [3, 0]];
    for s in 0..4 {
        assert_eq!(sides.side_cell(s), 0);
        assert_eq!(sides.side_opposite(s), None);
        let [a, b] = sides.side_nodes(s);
        assert_eq!([a, b], expected_nodes[s]);
        assert_eq!(sides.side_node(s, 1), b);
        assert_close(geo.side_volume(s, Mode::Cached).unwrap(), 0.25);
    }
    assert_point_close(
        geo.side_outward_facet_normal(0, Mode::Cached).unwrap(),
        [0.0, -1.0, 0.0],
    );
    assert_point_close(
        geo.side_mid_facet_normal(0, Mode::Cached).unwrap(),
        [0.5, 0.0, 0.0],
    );
    assert_close(geo.cell_volume(0, Mode::Cached).unwrap(), 1.0);
    assert_point_close(geo.cell_centroid(0, Mode::Cached).unwrap(), [0.5, 0.5, 0.0]);
}

#[test]
fn unit_square_wedges_and_corners() {
    let mesh = unit_square();
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let wedges = view.wedges().unwrap();
    let corners = view.corners().unwrap();
    let geo = view.geometry().unwrap();

    assert_eq!(wedges.len(), 8);
    for w in 0..8 {
        assert_close(geo.wedge_volume(w, Mode::Cached).unwrap(), 0.125);
        assert_eq!(wedges.wedge_adjacent(wedges.wedge_adjacent(w)), w);
        assert_eq!(wedges.wedge_opposite(w), None);
    }
    let [outward, mid] = geo.wedge_facet_normals(1, Mode::Cached).unwrap();
    assert_point_close(outward, [0.0, -0.5, 0.0]);
    assert_point_close(mid, [-0.5, 0.0, 0.0]);

    assert_eq!(corners.len(), 4);
    for k in 0..4 {
        assert_eq!(corners.corner_wedges(k).len(), 2);
        assert_close(geo.corner_volume(k, Mode::Cached).unwrap(), 0.25);
        let n = corners.corner_node(k);
        assert_eq!(corners.cell_corner_at_node(0, n), Some(k));
        for &w in corners.corner_wedges(k) {
            assert_eq!(wedges.wedge_node(w), n);
            assert_eq!(wedges.wedge_corner(w).unwrap(), k);
        }
    }
    assert_eq!(corners.cell_corners(0).len(), 4);
}

#[test]
fn corner_quadrilateral_is_counter_clockwise() {
    let mesh = unit_square();
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let corners = view.corners().unwrap();
    let geo = view.geometry().unwrap();

    let k = corners.cell_corner_at_node(0, 0).unwrap();
    let quad = geo.corner_coordinates(k, Mode::Cached).unwrap();
    assert_eq!(quad.len(), 4);
    assert_point_close(quad[0], [0.0, 0.0, 0.0]);
    assert_point_close(quad[1], [0.5, 0.0, 0.0]);
    assert_point_close(quad[2], [0.5, 0.5, 0.0]);
    assert_point_close(quad[3], [0.0, 0.5, 0.0]);

    for k in 0..corners.len() {
        let facets = geo.corner_facetization::<2>(k, Mode::Cached).unwrap();
        assert_eq!(facets.len(), 4);
        assert_close(shoelace(&facets), 0.25);
    }
    assert_eq!(
        geo.corner_facetization::<3>(0, Mode::Cached).unwrap_err(),
        MeshSubcellError::FacetArity {
            requested: 3,
            manifold: 2
        }
    );
}

#[test]
fn interior_faces_pair_sides_and_flip_normals() {
    let mesh = quad_grid(3, 2, MeshGenOptions::default());
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let conn = view.connectivity().unwrap();
    let sides = view.sides().unwrap();
    let geo = view.geometry().unwrap();

    for s in 0..sides.len() {
        let f = sides.side_face(s);
        match sides.side_opposite(s) {
            Some(t) => {
                assert_eq!(sides.side_opposite(t), Some(s));
                assert_eq!(sides.side_face(t), f);
                assert_ne!(sides.side_cell(t), sides.side_cell(s));
                // same nodes, reversed
                let [a, b] = sides.side_nodes(s);
                assert_eq!(sides.side_nodes(t), [b, a]);
                let ns = geo.side_outward_facet_normal(s, Mode::Cached).unwrap();
                let nt = geo.side_outward_facet_normal(t, Mode::Cached).unwrap();
                assert_point_close(ns, [-nt[0], -nt[1], -nt[2]]);
            }
            None => assert_eq!(conn.face_cells(f, Filter::All).unwrap().len(), 1),
        }
    }

    for f in 0..view.count(EntityKind::Face, Filter::All).unwrap() {
        let cells = conn.face_cells(f, Filter::All).unwrap();
        if let [c0, c1] = cells[..] {
            let (n0, d0) = geo.face_normal(f, Mode::Cached, Some(c0)).unwrap();
            let (n1, d1) = geo.face_normal(f, Mode::Cached, Some(c1)).unwrap();
            assert_ne!(d0, d1);
            assert_point_close(n0, [-n1[0], -n1[1], -n1[2]]);
        }
    }
}

#[test]
fn corners_and_sides_tile_the_domain() {
    let mesh = structured_box_2d(
        4,
        3,
        [0.0, 0.0],
        [2.0, 1.5],
        StructuredCellType::Triangle,
        MeshGenOptions::default(),
    )
    .unwrap();
    let cache = full_cache(&mesh);
    let geo = cache.view(&mesh).geometry().unwrap();

    let cells: f64 = geo.cell_volumes(Mode::Cached).unwrap().iter().sum();
    let sides: f64 = geo.side_volumes(Mode::Cached).unwrap().iter().sum();
    let corners: f64 = geo.corner_volumes(Mode::Cached).unwrap().iter().sum();
    assert_close(cells, 3.0);
    assert_close(sides, 3.0);
    assert_close(corners, 3.0);
}

#[test]
fn connectivity_queries() {
    let mesh = quad_grid(2, 1, MeshGenOptions::default());
    let cache = full_cache(&mesh);
    let view = cache.view(&mesh);
    let conn = view.connectivity().unwrap();

    assert_eq!(conn.cell_num_faces(0).unwrap(), 4);
    assert_eq!(conn.cell_face_adj_cells(0, Filter::All).unwrap(), vec![1]);
    assert_eq!(conn.cell_face_adj_cells(1, Filter::All).unwrap(), vec![0]);
    assert_eq!(conn.cell_nodes(0).len(), 4);
    assert_eq!(conn.cell_edges(0).unwrap().len(), 4);

    let dirs = conn.cell_2d_edge_dirs(1).unwrap();
    let faces = conn.cell_faces_and_dirs(1).unwrap();
    assert_eq!(dirs, faces.iter().map(|&(_, d)| d).collect::<Vec<_>>());

    for &(f, _) in faces {
        let map = conn.face_to_cell_edge_map(f, 1).unwrap();
        let cell_edges = conn.cell_edges(1).unwrap();
        let face_edges = conn.face_edges_and_dirs(f).unwrap();
        for (i, &(e, _)) in face_edges.iter().enumerate() {
            assert_eq!(cell_edges[map[i]], e);
        }
    }
}

#[test]
fn cylinder_surface_areas() {
    let n_theta = 8;
    let mesh = cylinder_shell(1.0, 2.0, n_theta, 3, MeshGenOptions::default()).unwrap();
    let cache = full_cache(&mesh);
    let geo = cache.view(&mesh).geometry().unwrap();

    let chord = 2.0 * (std::f64::consts::PI / n_theta as f64).sin();
    let area: f64 = geo.cell_volumes(Mode::Cached).unwrap().iter().sum();
    assert!((area - n_theta as f64 * chord * 2.0).abs() < 1e-9);
    for v in geo.side_volumes(Mode::Cached).unwrap() {
        assert!(v > 0.0);
    }
    let corners: f64 = geo.corner_volumes(Mode::Cached).unwrap().iter().sum();
    assert!((corners - area).abs() < 1e-9);
}

/// U-shaped octagon with a notch cut down to y = 1; area 7. `space == 3`
/// tilts it into the plane spanned by x and (0, 0.6, 0.8).
fn notched_cell(space: usize) -> InMemoryMesh {
    let mut b = MeshBuilder::new(2, space);
    let outline = [
        [0.0, 0.0],
        [3.0, 0.0],
        [3.0, 3.0],
        [2.0, 3.0],
        [2.0, 1.0],
        [1.0, 1.0],
        [1.0, 3.0],
        [0.0, 3.0],
    ];
    for [x, y] in outline {
        if space == 3 {
            b.add_node(&[x, 0.6 * y, 0.8 * y], Ownership::Owned).unwrap();
        } else {
            b.add_node(&[x, y], Ownership::Owned).unwrap();
        }
    }
    b.add_cell(&[0, 1, 2, 3, 4, 5, 6, 7], Ownership::Owned).unwrap();
    b.build().unwrap()
}

#[test]
fn non_convex_cell_conserves_area_flat_and_tilted() {
    for (space, notch_out) in [(2, [0.0, 1.0, 0.0]), (3, [0.0, 0.6, 0.8])] {
        let mesh = notched_cell(space);
        let cache = full_cache(&mesh);
        let view = cache.view(&mesh);
        let sides = view.sides().unwrap();
        let geo = view.geometry().unwrap();

        assert_close(geo.cell_volume(0, Mode::Cached).unwrap(), 7.0);
        let side_sum: f64 = geo.side_volumes(Mode::Cached).unwrap().iter().sum();
        let corner_sum: f64 = geo.corner_volumes(Mode::Cached).unwrap().iter().sum();
        assert_close(side_sum, 7.0);
        assert_close(corner_sum, 7.0);
        assert_close(geo.side_volumes(Mode::Recompute).unwrap().iter().sum(), 7.0);

        // the notch floor turns against the cell, so its side is negative
        assert_eq!(sides.side_nodes(4), [4, 5]);
        assert!(geo.side_volume(4, Mode::Cached).unwrap() < 0.0);
        assert_point_close(
            geo.side_outward_facet_normal(4, Mode::Cached).unwrap(),
            notch_out,
        );
        let (normal, _) = geo
            .face_normal(sides.side_face(4), Mode::Cached, Some(0))
            .unwrap();
        assert_point_close(normal, notch_out);
    }
}
