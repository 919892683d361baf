use rand::Rng;
use tensorimage::sample::Bin;
use tensorimage::{declare_options, Range, UnsignedArray};

#[test]
fn fixed_ranges_iterate_consistently() {
    let mut rng = rand::rng();
    for _ in 0..2000 {
        let n: usize = rng.random_range(1..64);
        let start = rng.random_range(0..n) as isize;
        let stop = rng.random_range(0..n) as isize;
        let step = rng.random_range(1..8usize);
        // Express endpoints relative to the end half of the time.
        let relative = |i: isize, flip: bool| if flip { i - n as isize } else { i };
        let mut range = Range::with_step(
            relative(start, rng.random_bool(0.5)),
            relative(stop, rng.random_bool(0.5)),
            step,
        );
        range.fix(n).unwrap();

        let indices: Vec<usize> = range.iter().collect();
        assert_eq!(indices.len(), range.size());
        assert_eq!(indices[0], range.offset());
        assert_eq!(indices[0] as isize, start);
        for pair in indices.windows(2) {
            assert_eq!(pair[1] as isize - pair[0] as isize, range.step());
        }
        let last = *indices.last().unwrap() as isize;
        if start <= stop {
            assert!(start <= last && last <= stop);
        } else {
            assert!(stop <= last && last <= start);
        }
    }
}

#[test]
fn full_and_last_element_ranges() {
    for n in 1..50 {
        let mut all = Range::new(0, -1);
        all.fix(n).unwrap();
        assert_eq!(all.iter().collect::<Vec<_>>(), (0..n).collect::<Vec<_>>());

        let mut last = Range::single(-1);
        last.fix(n).unwrap();
        assert_eq!(last.iter().collect::<Vec<_>>(), vec![n - 1]);
    }
}

#[test]
fn binary_samples_stay_canonical() {
    let mut rng = rand::rng();
    for _ in 0..1000 {
        let v: i32 = rng.random_range(-1000..1000);
        let b = Bin::from_value(v);
        assert_eq!(b.get(), v != 0);
        assert!(b.to_byte() <= 1);
        let other = Bin::from_value(rng.random_range(0.0..2.0f64).floor());
        for combined in [!b, b & other, b | other, b ^ other] {
            assert!(combined.to_byte() <= 1);
        }
    }
}

declare_options! {
    Pace(PaceFamily) {
        SLOW = 0;
        CHEAP = 1;
        FAST = 1;
        SAFE = 2;
        BALANCED = [CHEAP, SAFE];
    }
}

#[test]
fn flag_set_laws() {
    let flags = [SLOW, CHEAP, SAFE, BALANCED, SLOW + SAFE, Pace::empty()];
    for &a in &flags {
        assert!(a + a == a && a == a + a);
        for &b in &flags {
            assert!(a + b == b + a && b + a == a + b);
            assert_eq!(a == b, a.bits() & b.bits() == b.bits());
            assert!(a + b == a && a + b == b);
        }
    }
    assert!(FAST == CHEAP && CHEAP == FAST);
    assert!(BALANCED == FAST);
    assert!(FAST != BALANCED);
}

#[test]
fn broadcasting_geometric_arrays() {
    let mut empty = UnsignedArray::new();
    empty.broadcast(3, 7).unwrap();
    assert_eq!(&*empty, &[7, 7, 7]);

    let mut single = UnsignedArray::from([4]);
    single.broadcast(5, 0).unwrap();
    assert_eq!(&*single, &[4; 5]);

    let mut pair = UnsignedArray::from([1, 2]);
    assert!(pair.broadcast(3, 0).is_err());
    pair.broadcast(2, 0).unwrap();
}
