//! PriceCodec 속성 테스트.

use proptest::prelude::*;
use pricesync_core::{PriceCodec, PRICE_SCALE};

/// 반올림 오차 허용 범위 (0.5 / SCALE) + 부동소수점 표현 오차.
const TOLERANCE: f64 = 0.5 / PRICE_SCALE as f64 + 1e-9;

proptest! {
    #[test]
    fn test_round_trip_within_half_unit(x in -1_000_000.0f64..1_000_000.0f64) {
        let restored = PriceCodec::to_float(PriceCodec::to_scaled(x));
        prop_assert!((restored - x).abs() <= TOLERANCE, "x={} restored={}", x, restored);
    }

    #[test]
    fn test_scaled_integers_are_stable(n in -1_000_000_000_000i64..1_000_000_000_000i64) {
        prop_assert_eq!(PriceCodec::to_scaled(PriceCodec::to_float(n)), n);
    }

    #[test]
    fn test_decimal_matches_float(n in -1_000_000_000_000i64..1_000_000_000_000i64) {
        let decimal = PriceCodec::to_decimal(n).to_string().parse::<f64>().unwrap();
        prop_assert!((decimal - PriceCodec::to_float(n)).abs() <= 1e-6);
    }
}

#[test]
fn test_codec_is_monotonic_on_ticks() {
    let prices = [0.01, 0.05, 1.0, 17.45, 17.46, 301.25, 99_999.999_999];
    let scaled: Vec<i64> = prices.iter().map(|p| PriceCodec::to_scaled(*p)).collect();
    assert!(scaled.windows(2).all(|w| w[0] < w[1]));
}
