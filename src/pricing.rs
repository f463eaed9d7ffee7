/// Landed cost and margin calculations
///
/// All functions here are pure. Division by zero is not an error: a product
/// without a usable container quantity yields a non-finite landed price,
/// which callers render as "n/a" instead of propagating.

use crate::state::data::Product;
use crate::state::settings::Settings;

/// Usable cubic metres in a 40ft high-cube container
pub const CONTAINER_CBM: f64 = 67.0;

/// Units per container: the stated quantity, or derived from case volume.
///
/// `cbm == 0` with no stated quantity gives a non-finite (or NaN) result.
pub fn container_qty(product: &Product) -> f64 {
    if product.container_qty_40ft_hq != 0 {
        product.container_qty_40ft_hq as f64
    } else {
        (CONTAINER_CBM / product.cbm).floor() * product.case_pack as f64
    }
}

/// Container quantity as stored on import: 0 when the derivation is not finite
pub fn derived_container_qty(product: &Product) -> u32 {
    let qty = (CONTAINER_CBM / product.cbm).floor() * product.case_pack as f64;
    if qty.is_finite() && qty >= 0.0 {
        qty.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Delivered cost per unit in the selling currency
pub fn landed_price(product: &Product, settings: &Settings) -> f64 {
    let container_qty = container_qty(product);
    let total_purchase_cost = product.fob_price * container_qty;
    let duty_cost = total_purchase_cost * (settings.duty / 100.0);
    let total_cost_purchase = total_purchase_cost
        + duty_cost
        + settings.shipping_cost
        + settings.local_freight;
    let total_cost_selling = total_cost_purchase / settings.exchange_rate;
    total_cost_selling / container_qty
}

/// Margin on the customer SRP after VAT, in percent. Never NaN or infinite.
pub fn profit_percentage(product: &Product, settings: &Settings, landed_price: f64) -> f64 {
    let net_selling_price = product.customer_srp / (1.0 + settings.vat_rate / 100.0);
    let profit = net_selling_price - landed_price;
    let percentage = profit / product.customer_srp * 100.0;
    if percentage.is_finite() {
        percentage
    } else {
        0.0
    }
}

/// Everything the product card shows about cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub container_qty: f64,
    pub landed_price: f64,
    pub profit_percentage: f64,
}

impl Quote {
    pub fn for_product(product: &Product, settings: &Settings) -> Self {
        let landed = landed_price(product, settings);
        Self {
            container_qty: container_qty(product),
            landed_price: landed,
            profit_percentage: profit_percentage(product, settings, landed),
        }
    }

    /// Whole units per container, "n/a" when it cannot be derived
    pub fn container_label(&self) -> String {
        if self.container_qty.is_finite() {
            format!("{:.0}", self.container_qty)
        } else {
            "n/a".to_string()
        }
    }

    pub fn landed_label(&self) -> String {
        money_label(self.landed_price)
    }

    pub fn profit_label(&self) -> String {
        format!("{:.1}%", self.profit_percentage)
    }
}

/// Two-decimal money text, "n/a" for non-finite amounts
pub fn money_label(amount: f64) -> String {
    if amount.is_finite() {
        format!("{:.2}", amount)
    } else {
        "n/a".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario_product() -> Product {
        Product {
            fob_price: 1.85,
            case_pack: 24,
            cbm: 0.0148,
            container_qty_40ft_hq: 0,
            ..Product::blank()
        }
    }

    #[test]
    fn test_scenario_matches_formula() {
        let product = scenario_product();
        let settings = Settings::default();

        let qty = container_qty(&product);
        assert_eq!(qty, 108648.0);
        assert_eq!((67.0_f64 / 0.0148).floor(), 4527.0);

        let expected = ((1.85 * 108648.0) + (1.85 * 108648.0) * (4.75 / 100.0) + 5000.0 + 1000.0)
            / 1.1
            / 108648.0;
        assert_eq!(landed_price(&product, &settings), expected);
        let quote = Quote::for_product(&product, &settings);
        assert_eq!(quote.landed_label(), "1.81");
        assert_eq!(quote.container_label(), "108648");
    }

    #[test]
    fn test_neutral_settings_exact() {
        let settings = Settings {
            exchange_rate: 1.0,
            duty: 0.0,
            shipping_cost: 0.0,
            local_freight: 0.0,
            ..Settings::default()
        };
        let product = Product {
            fob_price: 2.5,
            container_qty_40ft_hq: 1000,
            ..Product::blank()
        };
        assert_eq!(landed_price(&product, &settings), 2.5);
    }

    #[test]
    fn test_stated_container_qty_wins() {
        let product = Product {
            container_qty_40ft_hq: 1000,
            ..scenario_product()
        };
        assert_eq!(container_qty(&product), 1000.0);
    }

    #[test]
    fn test_zero_cbm_is_not_finite() {
        let product = Product {
            fob_price: 2.0,
            case_pack: 10,
            ..Product::blank()
        };
        let landed = landed_price(&product, &Settings::default());
        assert!(!landed.is_finite());
        assert_eq!(money_label(landed), "n/a");
        assert_eq!(Quote::for_product(&product, &Settings::default()).container_label(), "n/a");
    }

    #[test]
    fn test_zero_container_qty_is_not_finite() {
        // cbm set but no units per case: 0 units per container
        let product = Product {
            fob_price: 2.0,
            cbm: 0.5,
            ..Product::blank()
        };
        assert_eq!(container_qty(&product), 0.0);
        assert!(!landed_price(&product, &Settings::default()).is_finite());
    }

    #[test]
    fn test_derived_container_qty_guards() {
        assert_eq!(derived_container_qty(&scenario_product()), 108648);
        assert_eq!(derived_container_qty(&Product { cbm: 0.0, ..scenario_product() }), 0);
    }

    #[test]
    fn test_profit_zero_srp_is_zero() {
        let product = scenario_product();
        let settings = Settings::default();
        let landed = landed_price(&product, &settings);
        assert_eq!(profit_percentage(&product, &settings, landed), 0.0);
        assert_eq!(profit_percentage(&product, &settings, f64::NAN), 0.0);
    }

    #[test]
    fn test_profit_percentage() {
        let product = Product {
            customer_srp: 12.1,
            ..Product::blank()
        };
        let settings = Settings::default();
        let expected = (12.1 / (1.0 + 21.0 / 100.0) - 5.0) / 12.1 * 100.0;
        assert_eq!(profit_percentage(&product, &settings, 5.0), expected);
    }

    proptest! {
        #[test]
        fn prop_stated_qty_ignores_cbm(
            qty in 1u32..200_000,
            fob in 0.0f64..1_000.0,
            cbm_a in 0.0f64..5.0,
            cbm_b in 0.0f64..5.0,
            case_pack in 0u32..500,
        ) {
            let settings = Settings::default();
            let a = Product { container_qty_40ft_hq: qty, fob_price: fob, cbm: cbm_a, case_pack, ..Product::blank() };
            let b = Product { cbm: cbm_b, ..a.clone() };
            prop_assert_eq!(landed_price(&a, &settings), landed_price(&b, &settings));
        }

        #[test]
        fn prop_neutral_settings_return_fob(
            qty in 1u32..200_000,
            fob in 0.0f64..1_000.0,
        ) {
            let settings = Settings {
                exchange_rate: 1.0,
                duty: 0.0,
                shipping_cost: 0.0,
                local_freight: 0.0,
                ..Settings::default()
            };
            let product = Product { container_qty_40ft_hq: qty, fob_price: fob, ..Product::blank() };
            let landed = landed_price(&product, &settings);
            // (fob * q) / q is exact only up to rounding of the product
            prop_assert!((landed - fob).abs() <= fob * f64::EPSILON * 2.0);
        }

        #[test]
        fn prop_profit_is_always_finite(
            srp in 0.0f64..1_000.0,
            vat in 0.0f64..50.0,
            landed in prop::num::f64::ANY,
        ) {
            let settings = Settings { vat_rate: vat, ..Settings::default() };
            let product = Product { customer_srp: srp, ..Product::blank() };
            prop_assert!(profit_percentage(&product, &settings, landed).is_finite());
        }
    }
}
