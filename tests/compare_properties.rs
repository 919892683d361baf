use tensorimage::options::cmp_props;
use tensorimage::{
    AllowSingletonExpansion, BooleanArray, DataType, Image, ImageError, PhysicalQuantity,
    PixelSize, Tensor, ThrowException,
};

#[test]
fn opposite_strides_have_equal_sizes_but_different_strides() {
    let img = Image::new([6, 4], 1, DataType::SFloat).unwrap();
    let mut mirrored = img.clone();
    mirrored.mirror(&BooleanArray::new()).unwrap();
    assert_eq!(&**mirrored.strides(), &[-1, -6]);

    assert!(img
        .compare_properties(&mirrored, cmp_props::SIZES, ThrowException::DoThrow)
        .unwrap());
    assert_eq!(
        img.compare_properties(&mirrored, cmp_props::STRIDES, ThrowException::DoThrow),
        Err(ImageError::PropertiesDiffer { property: "strides" })
    );
    assert!(!img
        .compare_properties(&mirrored, cmp_props::FULL, ThrowException::DontThrow)
        .unwrap());
}

#[test]
fn samples_ignore_tensor_shape_but_shape_does_not() {
    let vector = Image::new([3, 3], 4, DataType::UInt8).unwrap();
    let mut matrix = Image::default();
    matrix.set_data_type(DataType::UInt8).unwrap();
    matrix.set_sizes([3, 3]).unwrap();
    matrix.set_tensor(Tensor::matrix(2, 2).unwrap()).unwrap();
    matrix.forge().unwrap();

    assert!(vector
        .compare_properties(&matrix, cmp_props::SAMPLES, ThrowException::DoThrow)
        .unwrap());
    assert_eq!(
        vector.compare_properties(&matrix, cmp_props::SHAPE, ThrowException::DoThrow),
        Err(ImageError::PropertiesDiffer {
            property: "tensor shape"
        })
    );
}

#[test]
fn all_includes_color_space_and_pixel_size() {
    let a = Image::new([2, 2], 3, DataType::UInt8).unwrap();
    let mut b = a.similar().unwrap();
    assert!(a
        .compare_properties(&b, cmp_props::ALL, ThrowException::DoThrow)
        .unwrap());

    b.set_color_space("RGB");
    assert_eq!(
        a.compare_properties(&b, cmp_props::ALL, ThrowException::DoThrow),
        Err(ImageError::PropertiesDiffer {
            property: "color space"
        })
    );
    assert!(a
        .compare_properties(&b, cmp_props::SHAPE, ThrowException::DoThrow)
        .unwrap());

    b.reset_color_space();
    b.set_pixel_size(PixelSize::isotropic(PhysicalQuantity::new(0.2, "mm")));
    assert_eq!(
        a.compare_properties(&b, cmp_props::ALL, ThrowException::DoThrow),
        Err(ImageError::PropertiesDiffer {
            property: "pixel size"
        })
    );
}

#[test]
fn expansion_accepts_zero_stride_axes() {
    let big = Image::new([5, 4], 1, DataType::SInt16).unwrap();
    let mut row = Image::new([5, 1], 1, DataType::SInt16).unwrap();
    row.expand_singleton_dimension(1, 4).unwrap();
    let props = cmp_props::SIZES + cmp_props::DATA_TYPE;

    assert!(big
        .compare_properties(&row, props, ThrowException::DoThrow)
        .unwrap());

    let small = Image::new([5, 3], 1, DataType::SInt16).unwrap();
    assert!(!big
        .compare_properties_with_expansion(
            &small,
            props,
            AllowSingletonExpansion::DoAllow,
            ThrowException::DontThrow
        )
        .unwrap());
    let column = Image::new([1, 4], 1, DataType::SInt16).unwrap();
    assert!(big
        .compare_properties_with_expansion(
            &column,
            props,
            AllowSingletonExpansion::DoAllow,
            ThrowException::DoThrow
        )
        .unwrap());
}
