//! Subscription plan vocabulary.
//!
//! A purchasable purpose is named `{period}_{level}_SUB`. Only the purposes
//! enumerated in [`Purpose`] are sold; every other level/period combination
//! is rejected.

use std::str::FromStr;

use crate::enums::TransactionProvider;
use crate::error::CoreError;

define_text_enum! {
    /// Subscription tier requested by the caller.
    SubLevel {
        Standard = "STANDARD",
        Pro = "PRO",
        Ultima = "ULTIMA",
    }
}

define_text_enum! {
    Period {
        D1 = "D1",
        W1 = "W1",
        M1 = "M1",
        M3 = "M3",
    }
}

define_text_enum! {
    /// A purchasable subscription, priced per currency in `subscription_plans`.
    Purpose {
        D1ProSub = "D1_PRO_SUB",
        W1ProSub = "W1_PRO_SUB",
        M1ProSub = "M1_PRO_SUB",
        M3ProSub = "M3_PRO_SUB",
    }
}

define_text_enum! {
    /// Currencies a plan may be priced in.
    Currency {
        Rub = "RUB",
        Uah = "UAH",
        Try = "TRY",
        Kzt = "KZT",
        Eur = "EUR",
        Usd = "USD",
        Cny = "CNY",
    }
}

impl Purpose {
    /// Resolve the purpose sold for a tier and period, if any.
    pub fn resolve(level: SubLevel, period: Period) -> Option<Self> {
        Self::from_str(&format!("{}_{}_SUB", period.as_str(), level.as_str())).ok()
    }

    /// Human-readable title shown in transaction lists and plan listings.
    pub fn title(self) -> &'static str {
        match self {
            Purpose::D1ProSub => "1 Day Subscription",
            Purpose::W1ProSub => "1 Week Subscription",
            Purpose::M1ProSub => "1 Month Subscription",
            Purpose::M3ProSub => "3 Months Subscription",
        }
    }

    pub fn period(self) -> Period {
        match self {
            Purpose::D1ProSub => Period::D1,
            Purpose::W1ProSub => Period::W1,
            Purpose::M1ProSub => Period::M1,
            Purpose::M3ProSub => Period::M3,
        }
    }

    pub fn sub_level(self) -> SubLevel {
        SubLevel::Pro
    }

    /// Price column of this purpose in `subscription_plans`.
    pub fn price_column(self) -> &'static str {
        match self {
            Purpose::D1ProSub => "d1_pro_sub",
            Purpose::W1ProSub => "w1_pro_sub",
            Purpose::M1ProSub => "m1_pro_sub",
            Purpose::M3ProSub => "m3_pro_sub",
        }
    }
}

/// Render a stored purpose as its title, leaving unknown values untouched.
pub fn purpose_title(stored: &str) -> String {
    Purpose::from_str(stored)
        .map(|p| p.title().to_string())
        .unwrap_or_else(|_| stored.to_string())
}

/// Parse a currency query argument, falling back to USD for anything unknown.
pub fn currency_or_default(raw: Option<&str>) -> Currency {
    raw.and_then(|c| Currency::from_str(c).ok())
        .unwrap_or(Currency::Usd)
}

/// Payment type recorded for invoices issued by each acquirer.
pub fn payment_type_for(provider: TransactionProvider) -> crate::enums::PaymentType {
    match provider {
        TransactionProvider::Crypto => crate::enums::PaymentType::Singular,
        TransactionProvider::Stripe => crate::enums::PaymentType::Recurrent,
    }
}

/// Format an amount the way transaction listings show it.
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Validate and resolve a subscription request into its purpose.
pub fn purpose_for(level: SubLevel, period: Period) -> Result<Purpose, CoreError> {
    Purpose::resolve(level, period)
        .ok_or_else(|| CoreError::Validation("Bad transaction purpose".into()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::enums::PaymentType;

    #[test]
    fn pro_purposes_resolve() {
        assert_eq!(Purpose::resolve(SubLevel::Pro, Period::D1), Some(Purpose::D1ProSub));
        assert_eq!(Purpose::resolve(SubLevel::Pro, Period::M3), Some(Purpose::M3ProSub));
    }

    #[test]
    fn other_tiers_are_not_sold() {
        assert_eq!(Purpose::resolve(SubLevel::Standard, Period::W1), None);
        assert_matches!(
            purpose_for(SubLevel::Ultima, Period::M1),
            Err(CoreError::Validation(msg)) if msg == "Bad transaction purpose"
        );
    }

    #[test]
    fn titles_and_parts() {
        assert_eq!(purpose_title("W1_PRO_SUB"), "1 Week Subscription");
        assert_eq!(purpose_title("LEGACY"), "LEGACY");
        assert_eq!(Purpose::M1ProSub.period(), Period::M1);
        assert_eq!(Purpose::M1ProSub.sub_level(), SubLevel::Pro);
    }

    #[test]
    fn currency_fallback() {
        assert_eq!(currency_or_default(Some("EUR")), Currency::Eur);
        assert_eq!(currency_or_default(Some("XYZ")), Currency::Usd);
        assert_eq!(currency_or_default(None), Currency::Usd);
    }

    #[test]
    fn amounts_have_two_decimals() {
        assert_eq!(format_amount(100.0), "100.00");
        assert_eq!(format_amount(9.999), "10.00");
    }

    #[test]
    fn payment_type_depends_on_provider() {
        assert_eq!(payment_type_for(TransactionProvider::Crypto), PaymentType::Singular);
        assert_eq!(payment_type_for(TransactionProvider::Stripe), PaymentType::Recurrent);
    }
}
