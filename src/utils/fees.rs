//! 捐款手续费计算（金额单位均为美分）

/// 比例费率 2.9%（basis points）
pub const PERCENT_FEE_BP: i64 = 290;
/// 固定费用 30 美分
pub const FIXED_FEE_CENTS: i64 = 30;
/// 单笔捐款上限：10 亿美元
pub const MAX_DONATION_CENTS: i64 = 100_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub processing_fee: i64,
    pub net_amount: i64,
}

/// 手续费 = round(amount * 2.9%) + 30，且不超过捐款金额
pub fn compute_processing_fee(amount: i64) -> FeeBreakdown {
    if amount <= 0 {
        return FeeBreakdown {
            processing_fee: 0,
            net_amount: 0,
        };
    }
    // 四舍五入到美分，i128 中间值不会溢出
    let percent = (amount as i128 * PERCENT_FEE_BP as i128 + 5_000) / 10_000;
    let processing_fee = (percent + FIXED_FEE_CENTS as i128).min(amount as i128) as i64;
    FeeBreakdown {
        processing_fee,
        net_amount: amount - processing_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typical_amount() {
        let fee = compute_processing_fee(5_000);
        assert_eq!(fee.processing_fee, 175);
        assert_eq!(fee.net_amount, 4_825);
    }

    #[test]
    fn test_rounds_half_up() {
        // 50 * 2.9% = 1.45 -> 1
        assert_eq!(compute_processing_fee(50).processing_fee, 31);
        // 100 * 2.9% = 2.9 -> 3
        assert_eq!(compute_processing_fee(100).processing_fee, 33);
    }

    #[test]
    fn test_fee_never_exceeds_amount() {
        let fee = compute_processing_fee(10);
        assert_eq!(fee.processing_fee, 10);
        assert_eq!(fee.net_amount, 0);
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let fee = compute_processing_fee(MAX_DONATION_CENTS);
        assert_eq!(fee.processing_fee, 2_900_000_030);
        assert_eq!(fee.net_amount, MAX_DONATION_CENTS - 2_900_000_030);

        let fee = compute_processing_fee(i64::MAX);
        assert!(fee.processing_fee > 0);
        assert_eq!(fee.processing_fee + fee.net_amount, i64::MAX);
    }

    #[test]
    fn test_non_positive_amount() {
        assert_eq!(
            compute_processing_fee(0),
            FeeBreakdown {
                processing_fee: 0,
                net_amount: 0
            }
        );
    }
}
