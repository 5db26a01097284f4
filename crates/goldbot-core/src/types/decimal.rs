//! 정밀한 금융 계산을 위한 Decimal 유틸리티.

use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 랏(lot) 수량을 위한 타입.
pub type Lots = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 지정된 스텝의 가장 가까운 배수로 반올림합니다.
    ///
    /// 스텝이 0 이하이면 값을 그대로 반환합니다.
    fn round_to_step(&self, step: Decimal) -> Decimal;
}

impl DecimalExt for Decimal {
    fn round_to_step(&self, step: Decimal) -> Decimal {
        if step <= Decimal::ZERO {
            return *self;
        }
        (*self / step)
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
            * step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_to_step() {
        assert_eq!(dec!(0.037).round_to_step(dec!(0.01)), dec!(0.04));
        assert_eq!(dec!(0.04).round_to_step(dec!(0.01)), dec!(0.04));
        assert_eq!(dec!(1.26).round_to_step(dec!(0.05)), dec!(1.25));
    }

    #[test]
    fn test_round_to_step_zero_step() {
        assert_eq!(dec!(0.37).round_to_step(Decimal::ZERO), dec!(0.37));
    }
}
