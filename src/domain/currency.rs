use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported account currencies. Immutable once an account is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// Numeric currency code the ledger tags accounts with (ISO 4217).
    pub fn code(&self) -> u32 {
        match self {
            Currency::Usd => 840,
            Currency::Eur => 978,
            Currency::Gbp => 826,
        }
    }

    pub fn all() -> [Currency; 3] {
        [Currency::Usd, Currency::Eur, Currency::Gbp]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Currency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            _ => Err(()),
        }
    }
}
