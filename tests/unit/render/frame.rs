use super::*;

#[test]
fn pixel_lookup_is_bounds_checked() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(frame.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(frame.pixel(2, 0), None);
    assert_eq!(frame.pixel(0, 1), None);
    assert_eq!(frame.canvas(), Canvas::new(2, 1));
}

#[test]
fn premultiplied_half_red_over_black() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![128, 0, 0, 128],
        premultiplied: true,
    };
    assert_eq!(frame.to_opaque_rgba8([0, 0, 0]).unwrap(), vec![128, 0, 0, 255]);
}

#[test]
fn straight_half_red_over_white() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![255, 0, 0, 128],
        premultiplied: false,
    };
    assert_eq!(
        frame.to_opaque_rgba8([255, 255, 255]).unwrap(),
        vec![255, 127, 127, 255]
    );
}

#[test]
fn opaque_pixels_pass_through() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![10, 20, 30, 255],
        premultiplied: true,
    };
    assert_eq!(frame.to_opaque_rgba8([99, 99, 99]).unwrap(), vec![10, 20, 30, 255]);
}

#[test]
fn length_mismatch_is_rejected() {
    let mut dst = vec![0u8; 4];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0u8; 8], true, [0, 0, 0]).is_err());
}
