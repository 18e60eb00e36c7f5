/// Money helpers.
///
/// All monetary values are stored as integer cents to avoid floating-point
/// drift. Rates are expressed in basis points (1 bps = 0.01%).

pub const BPS_DENOMINATOR: i64 = 10_000;

/// Pay for `minutes` of work at `hourly_rate_cents`, rounded half-up to a cent.
pub fn amount_for_minutes(hourly_rate_cents: i64, minutes: i64) -> i64 {
    if hourly_rate_cents <= 0 || minutes <= 0 {
        return 0;
    }
    (hourly_rate_cents * minutes + 30) / 60
}

/// Share of `amount_cents` at `bps`, rounded down so the platform never
/// takes more than its rate.
pub fn share_of(amount_cents: i64, bps: i64) -> i64 {
    if amount_cents <= 0 || bps <= 0 {
        return 0;
    }
    let bps = bps.min(BPS_DENOMINATOR);
    amount_cents * bps / BPS_DENOMINATOR
}

/// Splits a gross amount into (net to worker, platform fee).
pub fn split_fee(amount_cents: i64, fee_bps: i64) -> (i64, i64) {
    let fee = share_of(amount_cents, fee_bps);
    (amount_cents - fee, fee)
}

pub fn cents_to_units(cents: i64) -> f64 {
    cents as f64 / 100.0
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_for_minutes() {
        // 8h at $20.00/h
        assert_eq!(amount_for_minutes(2000, 480), 16000);
        // 90 minutes at $15.00/h
        assert_eq!(amount_for_minutes(1500, 90), 2250);
        // 1 minute at $10.01/h rounds to the nearest cent
        assert_eq!(amount_for_minutes(1001, 1), 17);
        assert_eq!(amount_for_minutes(0, 60), 0);
        assert_eq!(amount_for_minutes(1500, -5), 0);
    }

    #[test]
    fn test_share_of() {
        assert_eq!(share_of(16000, 1000), 1600);
        assert_eq!(share_of(999, 1000), 99);
        assert_eq!(share_of(1000, 20_000), 1000);
        assert_eq!(share_of(1000, 0), 0);
    }

    #[test]
    fn test_split_fee_sums_to_gross() {
        for amount in [1, 99, 1001, 16000, 123_457] {
            let (net, fee) = split_fee(amount, 1250);
            assert_eq!(net + fee, amount);
            assert!(fee <= net);
        }
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(16000), "$160.00");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(-250), "-$2.50");
        assert_eq!(cents_to_units(12345), 123.45);
    }
}
