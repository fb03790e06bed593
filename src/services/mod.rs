//! Business operations behind the HTTP handlers.

use rust_decimal::Decimal;
use sea_orm::DbErr;
use tracing::error;

use crate::errors::ServiceError;

pub mod accounts;
pub mod agents;
pub mod analytics;
pub mod feedback;
pub mod order_status;
pub mod orders;
pub mod stations;

/// Logs a store failure with `context` and wraps it as a `ServiceError`.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(DbErr) -> ServiceError {
    move |e| {
        error!(error = %e, "{}", context);
        ServiceError::DatabaseError(e)
    }
}

/// Shape of a `DECIMAL(precision, scale)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalColumn {
    pub precision: u32,
    pub scale: u32,
}

/// Fuel prices per litre (or kg of CNG).
pub const PRICE_COLUMN: DecimalColumn = DecimalColumn { precision: 12, scale: 2 };
/// Ordered quantity.
pub const QUANTITY_COLUMN: DecimalColumn = DecimalColumn { precision: 12, scale: 3 };
/// Order total. Wide enough to hold any price times any quantity exactly.
pub const TOTAL_COLUMN: DecimalColumn = DecimalColumn { precision: 18, scale: 5 };

impl DecimalColumn {
    /// Whether `value` is stored by this column without rounding or overflow.
    pub fn holds(&self, value: &Decimal) -> bool {
        let value = value.normalize();
        let integer_limit = Decimal::from(10u64.pow(self.precision - self.scale));
        value.scale() <= self.scale && value.abs().trunc() < integer_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(PRICE_COLUMN, dec!(100.50), true)]
    #[case(PRICE_COLUMN, dec!(100.500000), true)]
    #[case(PRICE_COLUMN, dec!(100.505), false)]
    #[case(PRICE_COLUMN, dec!(9999999999.99), true)]
    #[case(PRICE_COLUMN, dec!(10000000000), false)]
    #[case(QUANTITY_COLUMN, dec!(0.333), true)]
    #[case(QUANTITY_COLUMN, dec!(0.3333), false)]
    #[case(QUANTITY_COLUMN, dec!(999999999.999), true)]
    #[case(QUANTITY_COLUMN, dec!(1000000000), false)]
    #[case(TOTAL_COLUMN, dec!(9999999999999.99999), true)]
    fn column_bounds(#[case] column: DecimalColumn, #[case] value: Decimal, #[case] fits: bool) {
        assert_eq!(column.holds(&value), fits);
    }

    #[test]
    fn largest_price_times_largest_quantity_overflows_total() {
        let total = dec!(9999999999.99)
            .checked_mul(dec!(999999999.999))
            .expect("fits in a 96-bit mantissa");
        assert!(!TOTAL_COLUMN.holds(&total));
    }
}
