use std::sync::OnceLock;

use tensorimage::dispatch::{
    dispatch, dispatch_all, dispatch_flex, dispatch_float, dispatch_integer,
    dispatch_non_binary, DispatchTable, FlexVisitor, FloatVisitor, IntegerVisitor,
    NonBinaryVisitor, SampleVisitor,
};
use tensorimage::sample::{
    class, FlexSample, FloatSample, IntegerSample, NonBinarySample, RealSample, Sample,
};
use tensorimage::{DataType, Image, ImageError, ImageResult};

/// Data types named by the associated promotion types of `T`.
struct Promotions;

impl SampleVisitor for Promotions {
    type Output = [DataType; 6];

    fn visit<T: Sample>(self) -> [DataType; 6] {
        [
            <T::Float as Sample>::DATA_TYPE,
            <T::Complex as Sample>::DATA_TYPE,
            <T::Flex as Sample>::DATA_TYPE,
            <T::FlexBin as Sample>::DATA_TYPE,
            <T::Abs as Sample>::DATA_TYPE,
            <T::Real as Sample>::DATA_TYPE,
        ]
    }
}

#[test]
fn compile_time_promotions_agree_with_runtime_suggestions() {
    for data_type in DataType::all() {
        let expected = [
            data_type.suggest_float(),
            data_type.suggest_complex(),
            data_type.suggest_flex(),
            data_type.suggest_flex_bin(),
            data_type.suggest_abs(),
            data_type.suggest_real(),
        ];
        assert_eq!(
            dispatch_all(data_type, Promotions).unwrap(),
            expected,
            "{data_type}"
        );
    }
}

#[test]
fn sample_sizes_match_data_type_sizes() {
    struct Size;
    impl SampleVisitor for Size {
        type Output = usize;
        fn visit<T: Sample>(self) -> usize {
            std::mem::size_of::<T>()
        }
    }
    for data_type in DataType::all() {
        assert_eq!(dispatch_all(data_type, Size).unwrap(), data_type.size_of());
    }
}

struct Bounds;

impl IntegerVisitor for Bounds {
    type Output = (f64, f64);
    fn visit<T: IntegerSample>(self) -> (f64, f64) {
        (T::LOWEST.to_f64(), T::HIGHEST.to_f64())
    }
}

#[test]
fn subsets_accept_exactly_their_classes() {
    struct Epsilon;
    impl FloatVisitor for Epsilon {
        type Output = f64;
        fn visit<T: FloatSample>(self) -> f64 {
            (T::from_f64(1.0) + T::from_f64(1e-12)).to_f64() - 1.0
        }
    }
    struct Square(f64);
    impl NonBinaryVisitor for Square {
        type Output = f64;
        fn visit<T: NonBinarySample>(self) -> f64 {
            let v = T::from_f64(self.0);
            (v * v).to_f64()
        }
    }
    struct IsFlex;
    impl FlexVisitor for IsFlex {
        type Output = bool;
        fn visit<T: FlexSample>(self) -> bool {
            T::DATA_TYPE.is_flex()
        }
    }

    for data_type in DataType::all() {
        assert_eq!(
            dispatch_integer(data_type, Bounds).is_ok(),
            data_type.is_integer()
        );
        assert_eq!(
            dispatch_float(data_type, Epsilon).is_ok(),
            data_type.is_float()
        );
        assert_eq!(
            dispatch_non_binary(data_type, Square(3.0)).is_ok(),
            !data_type.is_binary()
        );
        assert_eq!(dispatch_flex(data_type, IsFlex).ok(), data_type.is_flex().then_some(true));
    }
    assert_eq!(dispatch_integer(DataType::SInt8, Bounds).unwrap(), (-128.0, 127.0));
    assert_eq!(dispatch_float(DataType::SFloat, Epsilon).unwrap(), 0.0);
    assert!(dispatch_float(DataType::DFloat, Epsilon).unwrap() > 0.0);
    assert_eq!(dispatch_non_binary(DataType::SComplex, Square(3.0)).unwrap(), 9.0);
    assert_eq!(
        dispatch_integer(DataType::Bin, Bounds),
        Err(ImageError::UnsupportedDataType {
            data_type: DataType::Bin
        })
    );
}

/// Sum of all samples, for any real image.
fn sum_samples<T: RealSample>(img: &Image) -> ImageResult<f64> {
    Ok(img.samples::<T>()?.iter().map(T::to_f64).sum())
}

type SumFn = fn(&Image) -> ImageResult<f64>;

#[derive(Clone)]
struct SumKernel;

impl SampleVisitor for SumKernel {
    type Output = SumFn;
    fn visit<T: Sample>(self) -> SumFn {
        struct Inner;
        impl tensorimage::dispatch::RealVisitor for Inner {
            type Output = SumFn;
            fn visit<U: RealSample>(self) -> SumFn {
                sum_samples::<U>
            }
        }
        match tensorimage::dispatch::dispatch_real(T::DATA_TYPE, Inner) {
            Ok(kernel) => kernel,
            Err(_) => |_: &Image| Err(ImageError::ParameterOutOfRange("not real")),
        }
    }
}

fn sum_table() -> &'static DispatchTable<SumFn> {
    static TABLE: OnceLock<DispatchTable<SumFn>> = OnceLock::new();
    TABLE.get_or_init(|| DispatchTable::new(class::REAL, SumKernel))
}

#[test]
fn dispatch_table_runs_prebuilt_instantiations() {
    let table = sum_table();
    assert!(table.supports(DataType::UInt16));
    assert!(!table.supports(DataType::Bin));
    assert!(!table.supports(DataType::DComplex));

    for data_type in [DataType::UInt8, DataType::SInt32, DataType::DFloat] {
        let mut img = Image::new([4, 5], 2, data_type).unwrap();
        img.fill(3.0).unwrap();
        let kernel = table.get(data_type).unwrap();
        assert_eq!(kernel(&img).unwrap(), 120.0);
    }
    assert_eq!(
        table.get(DataType::SComplex).err(),
        Some(ImageError::UnsupportedDataType {
            data_type: DataType::SComplex
        })
    );
}

#[test]
fn class_restricted_dispatch() {
    struct Name;
    impl SampleVisitor for Name {
        type Output = &'static str;
        fn visit<T: Sample>(self) -> &'static str {
            T::DATA_TYPE.name()
        }
    }
    assert_eq!(dispatch(DataType::Bin, class::INT_OR_BIN, Name).unwrap(), "BIN");
    assert!(dispatch(DataType::SFloat, class::INT_OR_BIN, Name).is_err());
    assert!(dispatch(DataType::SFloat, class::FLEX_BIN, Name).is_ok());
}
