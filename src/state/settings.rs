/// Global financial parameters used by the pricing engine
///
/// A single instance lives in the catalog. It is serialized to JSON and
/// stored under its own key, overwritten wholesale on load and on import.

use serde::{Deserialize, Serialize};

/// All global pricing parameters
///
/// Amounts are in the purchase currency unless noted. Percentages are
/// expressed as whole numbers (4.75 means 4.75%).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Purchase currency units per selling currency unit (must be > 0)
    pub exchange_rate: f64,

    /// Flat sea freight per container
    pub shipping_cost: f64,

    /// Flat inland freight per container
    pub local_freight: f64,

    /// Import duty, percent of purchase cost
    pub duty: f64,

    /// VAT included in retail prices, percent
    pub vat_rate: f64,

    /// Stored and editable, not consumed by any formula
    pub percent_fee: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exchange_rate: 1.1,
            shipping_cost: 5000.0,
            local_freight: 1000.0,
            duty: 4.75,
            vat_rate: 21.0,
            percent_fee: 0.0,
        }
    }
}

/// Identifies one settings field for generic editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ExchangeRate,
    ShippingCost,
    LocalFreight,
    Duty,
    VatRate,
    PercentFee,
}

impl SettingKey {
    pub const ALL: [SettingKey; 6] = [
        SettingKey::ExchangeRate,
        SettingKey::ShippingCost,
        SettingKey::LocalFreight,
        SettingKey::Duty,
        SettingKey::VatRate,
        SettingKey::PercentFee,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingKey::ExchangeRate => "EXCHANGE RATE",
            SettingKey::ShippingCost => "SHIPPING COST",
            SettingKey::LocalFreight => "LOCAL FREIGHT",
            SettingKey::Duty => "DUTY",
            SettingKey::VatRate => "VAT RATE",
            SettingKey::PercentFee => "PERCENT FEE",
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> f64 {
        match key {
            SettingKey::ExchangeRate => self.exchange_rate,
            SettingKey::ShippingCost => self.shipping_cost,
            SettingKey::LocalFreight => self.local_freight,
            SettingKey::Duty => self.duty,
            SettingKey::VatRate => self.vat_rate,
            SettingKey::PercentFee => self.percent_fee,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: f64) {
        let slot = match key {
            SettingKey::ExchangeRate => &mut self.exchange_rate,
            SettingKey::ShippingCost => &mut self.shipping_cost,
            SettingKey::LocalFreight => &mut self.local_freight,
            SettingKey::Duty => &mut self.duty,
            SettingKey::VatRate => &mut self.vat_rate,
            SettingKey::PercentFee => &mut self.percent_fee,
        };
        *slot = value;
    }

    /// Restore every parameter to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
