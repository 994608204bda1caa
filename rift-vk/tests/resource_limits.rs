//! Resource-limit scenarios driven against mock handles: the bookkeeping
//! layers behave exactly as they would over a real device, without one.

use ash::vk;
use ash::vk::Handle;
use rift_core::collections::hashset::HashSet;
use rift_vk::{
    AllocTracker, DescriptorError, MAX_DESC_SETS, MetricKind, SetTable, SpeedsRegistry,
    speeds_metric,
};

/// Stands in for a device that can mint `MAX_DESC_SETS` descriptor sets.
struct MockSetSource {
    next_raw: u64,
    capacity: usize,
    minted: usize,
}

impl MockSetSource {
    fn new(capacity: usize) -> Self {
        Self {
            next_raw: 1,
            capacity,
            minted: 0,
        }
    }

    fn allocate(&mut self) -> Result<vk::DescriptorSet, vk::Result> {
        if self.minted >= self.capacity {
            return Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY);
        }
        let set = vk::DescriptorSet::from_raw(self.next_raw);
        self.next_raw += 1;
        self.minted += 1;
        Ok(set)
    }
}

#[test]
fn arena_hands_out_exactly_its_capacity() {
    let mut source = MockSetSource::new(MAX_DESC_SETS);
    let mut table = SetTable::with_capacity(MAX_DESC_SETS);

    let mut indices = Vec::with_capacity(MAX_DESC_SETS);
    for i in 0..MAX_DESC_SETS {
        assert_eq!(table.next_free(), i);
        let set = source.allocate().expect("mock device ran dry early");
        indices.push(table.insert(set).expect("table rejected in-capacity set"));
    }

    // The 4096th allocation succeeded and filled the table.
    assert_eq!(table.next_free(), MAX_DESC_SETS);
    assert!(table.is_full());

    // The 4097th is rejected by bookkeeping before the device is asked.
    let err = table
        .insert(vk::DescriptorSet::from_raw(u64::MAX))
        .unwrap_err();
    assert!(matches!(
        err,
        DescriptorError::Exhausted {
            capacity: MAX_DESC_SETS
        }
    ));
    assert_eq!(table.next_free(), MAX_DESC_SETS);

    // No handle was issued twice, and indices resolve to what was stored.
    let unique: HashSet<u64> = indices.iter().map(|&i| table.get(i).as_raw()).collect();
    assert_eq!(unique.len(), MAX_DESC_SETS);
    assert_eq!(table.get(indices[0]).as_raw(), 1);
    assert_eq!(
        table.get(indices[MAX_DESC_SETS - 1]).as_raw(),
        MAX_DESC_SETS as u64
    );

    // Teardown: dropping the table releases every bookkeeping entry; nothing
    // dangles because handles are plain values owned by the table.
    drop(table);
}

#[test]
fn allocator_bookkeeping_survives_churn() {
    let mut speeds = SpeedsRegistry::new();
    let tracker = AllocTracker::new(&mut speeds).unwrap();

    // A burst of allocations followed by frees in mixed order returns the
    // counters to their starting state.
    let sizes: &[u64] = &[256, 4096, 65536, 192, 1 << 20];
    for &size in sizes {
        tracker.on_alloc(size);
    }
    assert_eq!(tracker.live_allocations(), sizes.len() as i64);
    assert_eq!(
        tracker.live_bytes(),
        sizes.iter().map(|&s| s as i64).sum::<i64>()
    );

    for &size in sizes.iter().rev() {
        tracker.on_free(size);
    }
    assert_eq!(tracker.live_allocations(), 0);
    assert_eq!(tracker.live_bytes(), 0);
}

#[test]
fn overlay_reports_renderer_counters() {
    let mut speeds = SpeedsRegistry::new();
    let tracker = AllocTracker::new(&mut speeds).unwrap();
    let live_sets = speeds_metric!(speeds, live_sets, MetricKind::Count).unwrap();
    let frame_time_us =
        speeds_metric!(speeds, frame_time_us, MetricKind::Microseconds).unwrap();

    tracker.on_alloc(2048);
    live_sets.set(17);
    frame_time_us.set(16_667);

    let mut out = [0u8; 256];
    assert!(speeds.message(&mut out));

    let end = out.iter().position(|&b| b == 0).unwrap();
    assert!(end < out.len());
    let text = std::str::from_utf8(&out[..end]).unwrap();

    assert!(text.contains("live_allocations: 1"), "{text}");
    assert!(text.contains("live_bytes: 2.00KiB"), "{text}");
    assert!(text.contains("live_sets: 17"), "{text}");
    assert!(text.contains("frame_time_us: 16667us"), "{text}");
}
