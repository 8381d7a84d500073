// barscan-core/tests/aggregation_properties.rs

use barscan_core::processing::CropAccumulator;
use barscan_core::*;

fn frame() -> FrameSize {
    FrameSize::new(1920, 1080).unwrap()
}

fn crop(width: u32, height: u32, x: u32, y: u32) -> SampleCrop {
    SampleCrop::Crop(CropRect::new(width, height, x, y))
}

/// Aggregator without trailing discount, so every sample counts.
fn plain() -> BoundingBoxAggregator {
    BoundingBoxAggregator::new(10, 0)
}

/// A handful of differently-shaped in-frame samples.
fn mixed_samples() -> Vec<SampleCrop> {
    vec![
        crop(1920, 800, 0, 140),
        crop(1900, 810, 10, 135),
        SampleCrop::NoCrop,
        crop(1440, 1080, 240, 0),
        crop(1920, 804, 0, 138),
        crop(5, 1080, 900, 0),
    ]
}

/// Every rotation of the sequence plus each rotation reversed.
fn orderings(samples: &[SampleCrop]) -> Vec<Vec<SampleCrop>> {
    let mut all = Vec::new();
    for shift in 0..samples.len() {
        let mut rotated = samples.to_vec();
        rotated.rotate_left(shift);
        let mut reversed = rotated.clone();
        reversed.reverse();
        all.push(rotated);
        all.push(reversed);
    }
    all
}

#[test]
fn test_order_does_not_change_content_box() {
    let samples = mixed_samples();
    let expected = plain().aggregate(frame(), samples.clone()).content;
    assert!(expected.is_some());

    for ordering in orderings(&samples) {
        assert_eq!(plain().aggregate(frame(), ordering).content, expected);
    }
}

#[test]
fn test_split_and_merge_matches_sequential_fold() {
    let rects: Vec<CropRect> = mixed_samples()
        .into_iter()
        .filter_map(|sample| plain().accept(sample))
        .collect();
    let sequential = rects.iter().fold(CropAccumulator::new(), |acc, rect| acc.fold(*rect));

    for split in 0..=rects.len() {
        let (left, right) = rects.split_at(split);
        let left = left.iter().fold(CropAccumulator::new(), |acc, rect| acc.fold(*rect));
        let right = right.iter().fold(CropAccumulator::new(), |acc, rect| acc.fold(*rect));
        assert_eq!(left.merge(right).finish(frame()), sequential.finish(frame()));
        assert_eq!(right.merge(left).finish(frame()), sequential.finish(frame()));
    }
}

#[test]
fn test_adding_a_sample_never_shrinks_the_box() {
    let mut samples = Vec::new();
    let mut previous: Option<ContentBox> = None;

    for sample in mixed_samples() {
        samples.push(sample);
        let current = plain().aggregate(frame(), samples.clone()).content;
        if let (Some(before), Some(after)) = (previous, current) {
            assert!(after.width >= before.width);
            assert!(after.height >= before.height);
            assert!(after.x <= before.x);
            assert!(after.y <= before.y);
        }
        if current.is_some() {
            previous = current;
        }
    }
}

#[test]
fn test_empty_and_blank_input_is_unknown() {
    let comparator = AspectComparator::default();
    let aggregator = BoundingBoxAggregator::default();

    let empty = aggregator.aggregate(frame(), Vec::new());
    assert_eq!(empty.content, None);
    assert_eq!(comparator.compare(frame(), empty.content.as_ref()), AspectVerdict::Unknown);

    let blank = aggregator.aggregate(frame(), vec![SampleCrop::NoCrop; 6]);
    assert_eq!(blank.content, None);
    assert_eq!(blank.samples_seen, 6);
    assert_eq!(comparator.compare(frame(), blank.content.as_ref()), AspectVerdict::Unknown);
}

#[test]
fn test_in_frame_samples_give_consistent_margins() {
    for ordering in orderings(&mixed_samples()) {
        let content = plain().aggregate(frame(), ordering).content.unwrap();
        assert!(!content.clamped);
        assert_eq!(content.x + content.width + content.right, 1920);
        assert_eq!(content.y + content.height + content.bottom, 1080);
    }
}

#[test]
fn test_full_frame_content_matches() {
    let config = CoreConfig::default();
    let analysis = evaluate_samples(frame(), vec![crop(1920, 1080, 0, 0); 4], &config);
    assert_eq!(analysis.verdict, AspectVerdict::Matched { original_aspect: 1.78 });
}

#[test]
fn test_centered_scope_content_mismatches_with_margins() {
    let config = CoreConfig::default();
    let analysis = evaluate_samples(frame(), vec![crop(1920, 810, 0, 135); 4], &config);
    assert_eq!(
        analysis.verdict,
        AspectVerdict::Mismatched {
            original_aspect: 1.78,
            content_aspect: 2.37,
            margins: EdgeMargins {
                top: 135,
                left: 0,
                bottom: 135,
                right: 0,
            },
        }
    );
}

#[test]
fn test_narrow_sample_is_treated_like_no_crop() {
    let aggregator = plain();
    let base = vec![crop(1920, 800, 0, 140), crop(1920, 800, 0, 140)];

    let mut with_narrow = base.clone();
    with_narrow.insert(1, crop(5, 1080, 0, 0));
    let mut with_blank = base.clone();
    with_blank.insert(1, SampleCrop::NoCrop);

    let narrow = aggregator.aggregate(frame(), with_narrow);
    let blank = aggregator.aggregate(frame(), with_blank);
    assert_eq!(narrow.content, blank.content);
    assert_eq!(narrow.samples_used, 2);
}

#[test]
fn test_anomalous_last_sample_is_excluded() {
    let aggregator = BoundingBoxAggregator::default();
    let steady = vec![crop(1920, 800, 0, 140); 4];

    let mut with_tail = steady.clone();
    with_tail.push(crop(12, 12, 0, 0));
    let mut with_blank_tail = steady.clone();
    with_blank_tail.push(SampleCrop::NoCrop);

    let expected = aggregator.aggregate(frame(), steady).content;
    assert_eq!(aggregator.aggregate(frame(), with_tail).content, expected);
    assert_eq!(aggregator.aggregate(frame(), with_blank_tail).content, expected);
}

#[test]
fn test_two_samples_are_both_retained() {
    let aggregator = BoundingBoxAggregator::default();
    let result =
        aggregator.aggregate(frame(), vec![crop(1920, 800, 0, 140), crop(1440, 1080, 240, 0)]);

    assert_eq!(result.samples_discounted, 0);
    assert_eq!(result.samples_used, 2);
    let content = result.content.unwrap();
    assert_eq!((content.width, content.height, content.x, content.y), (1920, 1080, 0, 0));
}

#[test]
fn test_zero_height_content_does_not_panic() {
    let aggregation = plain().aggregate(frame(), vec![crop(1920, 0, 0, 540)]);
    let content = aggregation.content.unwrap();
    assert_eq!(content.height, 0);
    assert_eq!(content.aspect(), 0.0);

    match AspectComparator::default().compare(frame(), Some(&content)) {
        AspectVerdict::Mismatched { content_aspect, original_aspect, .. } => {
            assert_eq!(content_aspect, 0.0);
            assert_eq!(original_aspect, 1.78);
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}
