use super::*;
use crate::kernel::Kernel;

#[test]
fn stride_for_width_pads_up_to_lane_boundary() {
    assert_eq!(stride_for_width(3, 2), 4);
    assert_eq!(stride_for_width(4, 2), 4);
    assert_eq!(stride_for_width(5, 4), 8);
    assert_eq!(stride_for_width(8, 4), 8);
}

#[test]
fn stride_for_width_scalar_is_unpadded() {
    assert_eq!(stride_for_width(5, 0), 5);
    assert_eq!(stride_for_width(5, 1), 5);
}

#[test]
fn linearized_rejects_undersized_buffer() {
    let data = [0.0; 4];
    assert!(Linearized::new(&data, 3, 2, 2).is_err());
}

#[test]
fn linearized_rejects_zero_dimension() {
    let data = [0.0; 4];
    assert!(Linearized::new(&data, 2, 0, 2).is_err());
}

#[test]
#[allow(clippy::float_cmp)]
fn linearized_point_offsets_by_stride() {
    let data = [1.0, 2.0, 0.0, 3.0, 4.0, 0.0];
    let view = Linearized::new(&data, 2, 2, 3).unwrap();
    // SAFETY: i < n in this test.
    unsafe {
        assert_eq!(*view.point(0), 1.0);
        assert_eq!(*view.point(1), 3.0);
    }
}

#[test]
fn aligned_points_zero_pads_and_aligns() {
    let mut pts = AlignedPoints::new(2, 3, Kernel::Avx).unwrap();
    assert_eq!(pts.stride(), 4);
    pts.set_point(0, &[1.0, 2.0, 3.0]);
    pts.set_point(1, &[4.0, 5.0, 6.0]);
    let view = pts.as_linearized();
    // SAFETY: indices below n.
    unsafe {
        let p0 = view.point(0);
        assert_eq!((p0 as usize) % 32, 0);
        assert_eq!(std::slice::from_raw_parts(p0, 4), [1.0, 2.0, 3.0, 0.0]);
        let p1 = view.point(1);
        assert_eq!(std::slice::from_raw_parts(p1, 4), [4.0, 5.0, 6.0, 0.0]);
    }
}

#[test]
fn aligned_points_rejects_zero_n_or_d() {
    assert!(AlignedPoints::new(0, 3, Kernel::Scalar).is_err());
    assert!(AlignedPoints::new(3, 0, Kernel::Scalar).is_err());
}

#[test]
#[allow(clippy::float_cmp)]
fn indirect_point_offsets_by_stride() {
    // Three independently heap-allocated buffers, each laid out as in
    // `Linearized` (point's own coordinates, then stride-padding).
    let a: Box<[f64]> = Box::new([1.0, 2.0, 0.0]);
    let b: Box<[f64]> = Box::new([3.0, 4.0, 0.0]);
    let c: Box<[f64]> = Box::new([5.0, 6.0, 0.0]);
    let ptrs = [a.as_ptr(), b.as_ptr(), c.as_ptr()];

    let view = Indirect::new(&ptrs, 2, 3).unwrap();
    assert_eq!(view.len(), 3);
    assert_eq!(view.dim(), 2);
    assert_eq!(view.stride(), 3);
    // SAFETY: i < len in this test; pointee buffers outlive `view`.
    unsafe {
        assert_eq!(std::slice::from_raw_parts(view.point(0), 2), [1.0, 2.0]);
        assert_eq!(std::slice::from_raw_parts(view.point(1), 2), [3.0, 4.0]);
        assert_eq!(std::slice::from_raw_parts(view.point(2), 2), [5.0, 6.0]);
    }
}

#[test]
fn indirect_rejects_zero_dimension_or_undersized_stride() {
    let a = [0.0f64; 2];
    let ptrs = [a.as_ptr()];
    assert!(Indirect::new(&ptrs, 0, 2).is_err());
    assert!(Indirect::new(&ptrs, 3, 2).is_err());
}
