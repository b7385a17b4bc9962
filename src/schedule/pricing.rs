use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{EmiError, Result};

/// monthly flat rate tier chosen at origination from the down-payment ratio
///
/// 35% or more of the price pays 3.0%/month, above 25% and below 35% pays
/// 3.5%/month, anything else 3.75%/month.
pub fn monthly_rate_for_down_payment(price: Money, down_payment: Money) -> Result<Rate> {
    if !price.is_positive() {
        return Err(EmiError::invalid_terms(format!(
            "product price must be positive, got {}",
            price
        )));
    }
    if down_payment.is_negative() || down_payment > price {
        return Err(EmiError::invalid_terms(format!(
            "down payment {} outside 0..={}",
            down_payment, price
        )));
    }

    let ratio = down_payment.as_decimal() / price.as_decimal();

    let percent = if ratio >= dec!(0.35) {
        dec!(3.0)
    } else if ratio > dec!(0.25) {
        dec!(3.5)
    } else {
        dec!(3.75)
    };

    Ok(Rate::from_percentage(percent))
}

/// flat (non-amortizing) interest pricing of a consumer loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRatePricing {
    pub principal: Money,
    pub monthly_rate: Rate,
    pub tenure_months: u32,
    pub monthly_interest: Money,
    pub total_payable: Money,
    /// ceil(total_payable / tenure) to the whole rupee
    pub installment_amount: Money,
}

impl FlatRatePricing {
    pub fn price(principal: Money, monthly_rate: Rate, tenure_months: u32) -> Result<Self> {
        if tenure_months == 0 {
            return Err(EmiError::invalid_terms("tenure must be at least one month"));
        }
        if !principal.is_positive() {
            return Err(EmiError::invalid_terms(format!(
                "principal must be positive, got {}",
                principal
            )));
        }
        if monthly_rate.as_decimal() < Decimal::ZERO {
            return Err(EmiError::invalid_terms(format!(
                "monthly rate must not be negative, got {}",
                monthly_rate
            )));
        }

        // exact arithmetic throughout; only reported figures are rounded to paise
        let tenure = Decimal::from(tenure_months);
        let monthly_interest = principal.as_decimal() * monthly_rate.as_decimal();
        let total_payable = principal.as_decimal() + monthly_interest * tenure;
        let installment_amount = Money::from_decimal((total_payable / tenure).ceil());

        Ok(Self {
            principal,
            monthly_rate,
            tenure_months,
            monthly_interest: Money::from_decimal(monthly_interest),
            total_payable: Money::from_decimal(total_payable),
            installment_amount,
        })
    }

    /// price a loan straight from the product price and down payment
    pub fn for_purchase(price: Money, down_payment: Money, tenure_months: u32) -> Result<Self> {
        let rate = monthly_rate_for_down_payment(price, down_payment)?;
        Self::price(price - down_payment, rate, tenure_months)
    }

    pub fn total_interest(&self) -> Money {
        self.total_payable - self.principal
    }
}
