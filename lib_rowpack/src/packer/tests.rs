use crate::{
    alignment::{Alignment, AlignmentInterval},
    buckets::BucketStrategy,
    error::Error,
    options::{GroupBy, PackOptions},
    packer::{MIN_ALIGNMENT_SPACING, QueryRange, pack_alignments, pack_group},
    pairing::link_units,
};

fn interval(start: usize, end: usize, alignments: Vec<Alignment>) -> AlignmentInterval {
    AlignmentInterval::new(start, end, alignments)
}

#[test]
fn test_overlapping_alignments_go_to_separate_rows() {
    let packed = pack_alignments(
        vec![interval(
            0,
            1000,
            vec![
                Alignment::new("r1", 100, 150),
                Alignment::new("r2", 120, 170),
                Alignment::new("r3", 200, 250),
            ],
        )],
        &PackOptions::default(),
    )
    .unwrap();

    let rows = packed.rows_for("").unwrap();
    assert_eq!(rows.len(), 2);

    // r1 and r2 overlap, so r2 is pushed to a second row while r3 still fits
    // after r1 in the first.
    let first: Vec<_> = rows[0].units().iter().map(|unit| unit.read_name()).collect();
    let second: Vec<_> = rows[1].units().iter().map(|unit| unit.read_name()).collect();
    assert_eq!(first, vec!["r1", "r3"]);
    assert_eq!(second, vec!["r2"]);
    assert_eq!(rows[0].last_end(), 250);
    assert_eq!(rows[1].last_end(), 170);
}

#[test]
fn test_no_alignments_yields_no_rows() {
    let packed = pack_alignments(
        vec![interval(0, 1000, Vec::new())],
        &PackOptions::default(),
    )
    .unwrap();

    assert_eq!(packed.groups.len(), 1);
    assert_eq!(packed.groups[0].name, "");
    assert_eq!(packed.row_count(), 0);
    assert_eq!(packed.dropped, 0);
}

#[test]
fn test_empty_interval_list_is_an_error() {
    let result = pack_alignments(Vec::new(), &PackOptions::default());
    assert!(matches!(result, Err(Error::EmptyIntervalList)));
}

#[test]
fn test_spacing_is_respected_within_rows() {
    let alignments = (0..40)
        .map(|i| Alignment::new(format!("r{i}"), i * 13, i * 13 + 60))
        .collect();
    let packed = pack_alignments(
        vec![interval(0, 1000, alignments)],
        &PackOptions::default(),
    )
    .unwrap();

    for row in packed.rows_for("").unwrap() {
        for pair in row.units().windows(2) {
            assert!(pair[1].start() >= pair[0].end() + MIN_ALIGNMENT_SPACING);
        }
    }
}

#[test]
fn test_every_mapped_alignment_lands_in_exactly_one_row() {
    let alignments: Vec<_> = (0..40)
        .map(|i| Alignment::new(format!("r{i}"), i * 13, i * 13 + 60))
        .collect();
    let packed = pack_alignments(
        vec![interval(0, 1000, alignments.clone())],
        &PackOptions::default(),
    )
    .unwrap();

    let mut placed: Vec<_> = packed
        .rows_for("")
        .unwrap()
        .iter()
        .flat_map(|row| row.units())
        .map(|unit| unit.read_name().to_owned())
        .collect();
    placed.sort();
    let mut expected: Vec<_> = alignments
        .iter()
        .map(|alignment| alignment.read_name.clone())
        .collect();
    expected.sort();

    assert_eq!(packed.dropped, 0);
    assert_eq!(placed, expected);
}

#[test]
fn test_packing_continues_across_ranges() {
    // One long alignment in the first range, one in the second; both fit
    // into a single row because the spacing carries across the range border.
    let packed = pack_alignments(
        vec![
            interval(0, 500, vec![Alignment::new("r1", 100, 400)]),
            interval(2000, 2500, vec![Alignment::new("r2", 2100, 2400)]),
        ],
        &PackOptions::default(),
    )
    .unwrap();

    let rows = packed.rows_for("").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[0].last_end(), 2400);
}

#[test]
fn test_longer_units_are_preferred_within_a_bucket() {
    let packed = pack_alignments(
        vec![interval(
            0,
            1000,
            vec![
                Alignment::new("short", 100, 150),
                Alignment::new("long", 100, 300),
            ],
        )],
        &PackOptions::default(),
    )
    .unwrap();

    let rows = packed.rows_for("").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].units()[0].read_name(), "long");
    assert_eq!(rows[1].units()[0].read_name(), "short");
}

#[test]
fn test_out_of_bounds_units_are_dropped_not_fatal() {
    let packed = pack_alignments(
        vec![interval(
            0,
            100,
            vec![
                Alignment::new("inside", 10, 60),
                Alignment::new("outside", 150, 200),
            ],
        )],
        &PackOptions::default(),
    )
    .unwrap();

    assert_eq!(packed.dropped, 1);
    let rows = packed.rows_for("").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].units()[0].read_name(), "inside");
}

#[test]
fn test_start_before_range_start_clamps_into_first_bucket() {
    // Soft-clipped reads may start slightly before the interval, which makes
    // the input only approximately sorted.
    let packed = pack_alignments(
        vec![interval(
            1000,
            2000,
            vec![Alignment::new("clipped", 990, 1100)],
        )],
        &PackOptions::default(),
    )
    .unwrap();

    assert_eq!(packed.dropped, 0);
    assert_eq!(packed.row_count(), 1);
}

#[test]
fn test_grouped_output_orders_keys_and_puts_default_last() {
    let mut a = Alignment::new("r1", 100, 150);
    a.sample = Some("beta".to_owned());
    let mut b = Alignment::new("r2", 200, 250);
    b.sample = Some("Alpha".to_owned());
    let c = Alignment::new("r3", 300, 350);

    let packed = pack_alignments(
        vec![interval(0, 1000, vec![a, b, c])],
        &PackOptions {
            group_by: Some(GroupBy::Sample),
            ..Default::default()
        },
    )
    .unwrap();

    let names: Vec<_> = packed.groups.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "beta", ""]);
    assert_eq!(packed.rows_for("").unwrap().len(), 1);
}

#[test]
fn test_default_group_is_present_even_when_every_alignment_is_grouped() {
    let mut a = Alignment::new("r1", 100, 150);
    a.sample = Some("only".to_owned());

    let packed = pack_alignments(
        vec![interval(0, 1000, vec![a])],
        &PackOptions {
            group_by: Some(GroupBy::Sample),
            ..Default::default()
        },
    )
    .unwrap();

    let names: Vec<_> = packed.groups.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, vec!["only", ""]);
    assert!(packed.rows_for("").unwrap().is_empty());
}

#[test]
fn test_dense_and_sparse_storage_pack_identically() {
    let ranges = [
        QueryRange { start: 0, end: 600 },
        QueryRange {
            start: 1000,
            end: 1400,
        },
    ];
    let alignments: Vec<Vec<Alignment>> = vec![
        (0..30)
            .map(|i| Alignment::new(format!("a{i}"), i * 17, i * 17 + 80))
            .collect(),
        (0..20)
            .map(|i| Alignment::new(format!("b{i}"), 1000 + i * 11, 1000 + i * 11 + 45))
            .collect(),
    ];

    let units = link_units(alignments, false);
    let mut dense_dropped = 0;
    let mut sparse_dropped = 0;
    let dense_rows = pack_group(
        units.clone(),
        &ranges,
        BucketStrategy::Dense,
        &mut dense_dropped,
    );
    let sparse_rows = pack_group(units, &ranges, BucketStrategy::Sparse, &mut sparse_dropped);

    assert_eq!(dense_rows, sparse_rows);
    assert_eq!(dense_dropped, sparse_dropped);
}
