use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert!(ease.apply(0.0).abs() < 1e-12, "{ease:?}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in Ease::ALL {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease:?}");
        assert!(b < c, "{ease:?}");
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::InQuad.apply(-3.0), 0.0);
    assert_eq!(Ease::OutCubic.apply(7.0), 1.0);
}

#[test]
fn names_resolve_loosely() {
    assert_eq!(Ease::from_name("linear"), Some(Ease::Linear));
    assert_eq!(Ease::from_name("easeInOutCubic"), Some(Ease::InOutCubic));
    assert_eq!(Ease::from_name("ease-out"), Some(Ease::OutCubic));
    assert_eq!(Ease::from_name("in_quad"), Some(Ease::InQuad));
    assert_eq!(Ease::from_name("OutSine"), Some(Ease::OutSine));
    assert_eq!(Ease::from_name("bouncy"), None);
}
