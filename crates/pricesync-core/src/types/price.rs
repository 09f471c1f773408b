//! 고정소수점 가격 코덱.
//!
//! 모든 가격은 [`PRICE_SCALE`]을 곱한 정수로 저장하고 비교합니다.
//! 부동소수점 값은 피드 입력과 표시용 변환에만 사용합니다.
//! 코덱, DB 스키마(BIGINT), 체크포인트 직렬화가 모두 같은 스케일을 씁니다.

use rust_decimal::Decimal;

/// 가격 스케일 (소수점 6자리).
pub const PRICE_SCALE: i64 = 1_000_000;

/// [`PRICE_SCALE`]의 소수점 자릿수.
const SCALE_DIGITS: u32 = 6;

/// 스케일된 정수 가격.
pub type ScaledPrice = i64;

/// 부동소수점 가격과 스케일된 정수 가격 간 변환기.
///
/// NaN이나 `i64` 범위를 넘는 입력은 호출자 계약 위반이며 여기서 처리하지 않습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceCodec;

impl PriceCodec {
    /// `round(value * SCALE)`
    pub fn to_scaled(value: f64) -> ScaledPrice {
        (value * PRICE_SCALE as f64).round() as ScaledPrice
    }

    /// `scaled / SCALE`
    pub fn to_float(scaled: ScaledPrice) -> f64 {
        scaled as f64 / PRICE_SCALE as f64
    }

    /// 정확한 십진수 값으로 변환합니다.
    pub fn to_decimal(scaled: ScaledPrice) -> Decimal {
        Decimal::new(scaled, SCALE_DIGITS)
    }
}
