use cardgrid_core::layout::sub_grid::cleanup_orphans;
use cardgrid_core::{
    Canvas, Card, CardCanvasModel, CardLayout, CellKey, CellPitch, FieldSubGridModel,
    LayoutConfig, Point, SubGrid,
};
use proptest::prelude::*;
use uuid::Uuid;

const MAX_DIMENSION: u32 = 8;

#[derive(Debug, Clone)]
enum GridOp {
    Place { field: usize, row: u32, column: u32 },
    Span { pick: usize, delta: i32 },
    Remove { pick: usize },
    Resize { columns: u32, rows: u32 },
}

fn grid_op() -> impl Strategy<Value = GridOp> {
    prop_oneof![
        (0usize..6, 1u32..=MAX_DIMENSION + 1, 1u32..=MAX_DIMENSION + 1)
            .prop_map(|(field, row, column)| GridOp::Place { field, row, column }),
        (0usize..8, -3i32..=3).prop_map(|(pick, delta)| GridOp::Span { pick, delta }),
        (0usize..8).prop_map(|pick| GridOp::Remove { pick }),
        (1u32..=MAX_DIMENSION, 1u32..=MAX_DIMENSION)
            .prop_map(|(columns, rows)| GridOp::Resize { columns, rows }),
    ]
}

fn pick_key(grid: &SubGrid, pick: usize) -> Option<CellKey> {
    let keys: Vec<CellKey> = grid.layout.keys().copied().collect();
    if keys.is_empty() {
        None
    } else {
        Some(keys[pick % keys.len()])
    }
}

fn assert_grid_consistent(grid: &SubGrid) -> Result<(), TestCaseError> {
    let placements: Vec<_> = grid.placements().collect();
    for (key, placement) in &placements {
        let end = key.column + placement.column_span - 1;
        prop_assert!(placement.column_span >= 1);
        prop_assert!(key.row <= grid.rows, "row {} beyond {}", key.row, grid.rows);
        prop_assert!(end <= grid.columns, "span end {} beyond {}", end, grid.columns);
    }
    for (index, (a, pa)) in placements.iter().enumerate() {
        for (b, pb) in placements.iter().skip(index + 1) {
            if a.row != b.row {
                continue;
            }
            let a_end = a.column + pa.column_span - 1;
            let b_end = b.column + pb.column_span - 1;
            prop_assert!(
                a_end < b.column || b_end < a.column,
                "{} and {} overlap",
                a,
                b
            );
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn sub_grid_never_overlaps_or_crosses_edge(
        columns in 1u32..=MAX_DIMENSION,
        rows in 1u32..=MAX_DIMENSION,
        ops in prop::collection::vec(grid_op(), 1..40),
    ) {
        let fields: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
        let mut grid = SubGrid::new(columns, rows);

        for op in ops {
            let before = grid.clone();
            let mut model = FieldSubGridModel::new(&mut grid, MAX_DIMENSION);
            let result = match op {
                GridOp::Place { field, row, column } => {
                    model.place(fields[field], row, column).map(|_| ())
                }
                GridOp::Span { pick, delta } => match pick_key(model.grid(), pick) {
                    Some(key) => model.change_span(key, delta).map(|_| ()),
                    None => Ok(()),
                },
                GridOp::Remove { pick } => match pick_key(model.grid(), pick) {
                    Some(key) => model.remove(key).map(|_| ()),
                    None => Ok(()),
                },
                GridOp::Resize { columns, rows } => model.set_dimensions(columns, rows).map(|_| ()),
            };
            if result.is_err() {
                prop_assert_eq!(&grid, &before);
            }
            assert_grid_consistent(&grid)?;
        }
    }

    #[test]
    fn orphan_cleanup_is_idempotent(
        placements in prop::collection::vec((1u32..=MAX_DIMENSION, 1u32..=MAX_DIMENSION, 1u32..=3), 0..20),
        columns in 1u32..=MAX_DIMENSION,
        rows in 1u32..=MAX_DIMENSION,
    ) {
        let mut grid = SubGrid::new(MAX_DIMENSION, MAX_DIMENSION);
        {
            let mut model = FieldSubGridModel::new(&mut grid, MAX_DIMENSION);
            for (row, column, span) in placements {
                if let Ok(key) = model.place(Uuid::new_v4(), row, column) {
                    let _ = model.change_span(key, span as i32 - 1);
                }
            }
        }

        cleanup_orphans(&mut grid, columns, rows);
        let once = grid.clone();
        prop_assert_eq!(cleanup_orphans(&mut grid, columns, rows), 0);
        prop_assert_eq!(grid, once);
    }

    #[test]
    fn split_resize_matches_single_resize(
        canvas_columns in 1u32..=24,
        anchor_column in 1u32..=24,
        start_span in 1u32..=6,
        pitch in 10.0f64..200.0,
        total in -2000.0f64..2000.0,
        split in 0.0f64..=1.0,
        bound_row_span in any::<bool>(),
    ) {
        let config = LayoutConfig { bound_row_span, ..LayoutConfig::default() };
        let mut card = Card::new("Probe", start_span, start_span);
        card.grid_column = anchor_column;
        let card_id = card.id;
        let layout = CardLayout { canvas: Canvas::new(canvas_columns, 8), cards: vec![card] };
        let cell_pitch = CellPitch::new(pitch, pitch);
        let origin = Point::new(500.0, 500.0);
        let end = Point::new(origin.x + total, origin.y + total);
        let middle = Point::new(origin.x + total * split, origin.y + total * split);

        let mut single = CardCanvasModel::new(layout.clone(), config.clone());
        single.begin_resize(card_id, origin, cell_pitch).unwrap();
        let one_step = single.update_resize(end).unwrap();

        let mut split_model = CardCanvasModel::new(layout, config);
        split_model.begin_resize(card_id, origin, cell_pitch).unwrap();
        split_model.update_resize(middle).unwrap();
        let two_steps = split_model.update_resize(end).unwrap();

        prop_assert_eq!(one_step, two_steps);
        prop_assert!(one_step.0 >= 1 && one_step.1 >= 1);
        prop_assert!(one_step.0 <= Canvas::new(canvas_columns, 8).max_column_span(anchor_column));
    }
}
