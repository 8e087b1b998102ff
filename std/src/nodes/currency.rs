//! Currency amounts rounded to the currency's minor units.

use crate::nodes::numeric::parse_number;
use serde_json::{Number, Value, json};
use tessera_core::{Boxer, NodeType, Raw, StateConfig, Step, Validator, ValueLike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
    /// Digits after the decimal separator.
    pub decimals: u32,
}

impl Currency {
    pub const USD: Currency = Currency {
        code: "USD",
        symbol: "$",
        decimals: 2,
    };
    pub const EUR: Currency = Currency {
        code: "EUR",
        symbol: "€",
        decimals: 2,
    };
    pub const GBP: Currency = Currency {
        code: "GBP",
        symbol: "£",
        decimals: 2,
    };
    pub const JPY: Currency = Currency {
        code: "JPY",
        symbol: "¥",
        decimals: 0,
    };

    pub fn round(&self, amount: f64) -> f64 {
        let scale = 10f64.powi(self.decimals as i32);
        (amount * scale).round() / scale
    }

    /// `-1234.5` in USD renders as `-$1,234.50`.
    pub fn format(&self, amount: f64) -> String {
        let fixed = format!("{:.*}", self.decimals as usize, amount.abs());
        let (whole, fraction) = match fixed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (fixed.as_str(), None),
        };
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        let sign = if amount < 0.0 && self.round(amount) != 0.0 { "-" } else { "" };
        match fraction {
            Some(fraction) => format!("{sign}{}{grouped}.{fraction}", self.symbol),
            None => format!("{sign}{}{grouped}", self.symbol),
        }
    }
}

/// Accepts numbers and strings such as `"$1,234.5"`.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyBoxer {
    pub currency: Currency,
}

impl CurrencyBoxer {
    fn parse(&self, raw: &Raw) -> Option<f64> {
        match raw {
            Value::String(text) => {
                let cleaned: String = text
                    .trim()
                    .replace(self.currency.symbol, "")
                    .replace(self.currency.code, "")
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != ',')
                    .collect();
                parse_number(&Value::String(cleaned))?.as_f64()
            }
            other => parse_number(other)?.as_f64(),
        }
    }
}

impl Boxer for CurrencyBoxer {
    fn box_value(&self, raw: &Raw, _options: &[ValueLike]) -> Option<ValueLike> {
        let amount = self.currency.round(self.parse(raw)?);
        let key = if self.currency.decimals == 0 {
            Number::from(amount as i64)
        } else {
            Number::from_f64(amount)?
        };
        Some(
            ValueLike::new(key)
                .with_display_key(self.currency.format(amount))
                .with_meta(json!({"currency": self.currency.code})),
        )
    }

    fn unbox_value(&self, value: &ValueLike) -> Raw {
        value.key().clone()
    }
}

pub fn currency_entry(name: impl Into<String>, currency: Currency) -> Step {
    Step::new(
        NodeType::CurrencyEntry,
        StateConfig::new(name)
            .boxer(CurrencyBoxer { currency })
            .validator(Validator::required()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> CurrencyBoxer {
        CurrencyBoxer {
            currency: Currency::USD,
        }
    }

    #[test]
    fn amounts_are_rounded_and_formatted() {
        let boxed = usd().box_value(&json!(1234.5), &[]).unwrap();
        assert_eq!(boxed.key(), &json!(1234.5));
        assert_eq!(boxed.display_key(), "$1,234.50");
        assert_eq!(boxed.meta(), &json!({"currency": "USD"}));

        let boxed = usd().box_value(&json!("$ 1,000,000.129"), &[]).unwrap();
        assert_eq!(boxed.key(), &json!(1000000.13));
        assert_eq!(boxed.display_key(), "$1,000,000.13");
    }

    #[test]
    fn zero_decimal_currencies_use_integer_keys() {
        let yen = CurrencyBoxer {
            currency: Currency::JPY,
        };
        let boxed = yen.box_value(&json!("¥12,345.6"), &[]).unwrap();
        assert_eq!(boxed.key(), &json!(12346));
        assert_eq!(boxed.display_key(), "¥12,346");
    }

    #[test]
    fn negative_amounts_and_garbage() {
        assert_eq!(Currency::EUR.format(-0.5), "-€0.50");
        assert_eq!(Currency::USD.format(-0.001), "$0.00");
        assert_eq!(Currency::USD.format(999.0), "$999.00");
        assert_eq!(usd().box_value(&json!("ten dollars"), &[]), None);
        assert_eq!(usd().box_value(&Value::Null, &[]), None);
    }
}
