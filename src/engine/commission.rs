/// Financial split of an order's price at completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommissionSplit {
    pub platform_commission: f64,
    pub driver_payout: f64,
}

/// Derives the platform commission and driver payout from the order price
/// and the commission rate in effect at completion time.
///
/// The commission is rounded to cents; the payout is the remainder by
/// subtraction, never rounded independently, so the two always sum to the
/// price exactly.
pub fn compute_split(price: f64, rate_percent: f64) -> CommissionSplit {
    let platform_commission = round2(price * rate_percent / 100.0);
    CommissionSplit {
        platform_commission,
        driver_payout: price - platform_commission,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::compute_split;

    #[test]
    fn twenty_percent_of_100_splits_80_20() {
        let split = compute_split(100.0, 20.0);
        assert_eq!(split.platform_commission, 20.0);
        assert_eq!(split.driver_payout, 80.0);
    }

    #[test]
    fn split_always_sums_to_price_exactly() {
        let cases = [
            (9.99, 15.0),
            (33.33, 12.5),
            (0.01, 20.0),
            (250.0, 33.33),
            (19.95, 7.77),
        ];

        for (price, rate) in cases {
            let split = compute_split(price, rate);
            assert_eq!(
                split.platform_commission + split.driver_payout,
                price,
                "price={price} rate={rate}"
            );
        }
    }

    #[test]
    fn commission_is_rounded_to_cents() {
        // 9.99 * 15% = 1.4985, rounds to 1.50.
        let split = compute_split(9.99, 15.0);
        assert_eq!(split.platform_commission, 1.50);
        assert_eq!(split.driver_payout, 9.99 - 1.50);
    }

    #[test]
    fn zero_rate_pays_driver_everything() {
        let split = compute_split(42.0, 0.0);
        assert_eq!(split.platform_commission, 0.0);
        assert_eq!(split.driver_payout, 42.0);
    }

    #[test]
    fn full_rate_pays_driver_nothing() {
        let split = compute_split(42.0, 100.0);
        assert_eq!(split.platform_commission, 42.0);
        assert_eq!(split.driver_payout, 0.0);
    }
}
