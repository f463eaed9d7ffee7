/// The order being assembled from the catalog
///
/// Entries are addressed by position. A product's order slot is the index it
/// had in the product list when it was flagged, and removing or reordering
/// products does not touch this list.

use std::collections::HashMap;

use super::data::{parse_decimal_or_zero, parse_int_or_zero, OrderEntry, Product};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderCollection {
    entries: Vec<OrderEntry>,
}

impl OrderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write (or clear) the entry at `index`, then compact.
    ///
    /// Writing past the end leaves empty slots that compaction drops, so the
    /// entry lands at the end of the list rather than at `index`.
    pub fn set_order_at(&mut self, index: usize, order: Option<OrderEntry>) {
        let mut slots: Vec<Option<OrderEntry>> =
            std::mem::take(&mut self.entries).into_iter().map(Some).collect();

        match order {
            Some(entry) => {
                if index >= slots.len() {
                    slots.resize(index + 1, None);
                }
                slots[index] = Some(entry);
            }
            None => {
                if index < slots.len() {
                    slots.remove(index);
                }
            }
        }

        self.entries = slots.into_iter().flatten().collect();
    }

    pub fn entries(&self) -> &[OrderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of `customer_price * order_qty` over all entries
    pub fn total_order_value(&self) -> f64 {
        self.entries.iter().map(OrderEntry::line_total).sum()
    }
}

/// Form state of the "Add to Order" section of one product card
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    pub ordered: bool,
    pub qty: String,
    pub price: String,
    pub notes: String,
}

impl OrderDraft {
    /// The entry this draft describes for `product`; blank numbers are 0
    pub fn to_entry(&self, product: &Product) -> OrderEntry {
        OrderEntry {
            brand: product.brand.clone(),
            item_no: product.item_no.clone(),
            order_qty: parse_int_or_zero(&self.qty),
            customer_price: parse_decimal_or_zero(&self.price),
            notes: self.notes.clone(),
        }
    }

    /// What the order collection should hold for this draft
    pub fn to_order(&self, product: &Product) -> Option<OrderEntry> {
        self.ordered.then(|| self.to_entry(product))
    }
}

/// The "Add to Order" forms of the product cards.
///
/// A form belongs to a card identified by item number and position, so it
/// starts over when either changes.
#[derive(Debug, Clone, Default)]
pub struct OrderForms {
    drafts: HashMap<(String, usize), OrderDraft>,
}

impl OrderForms {
    /// Form state of the card at `index`; blank when it has none
    pub fn draft(&self, index: usize, product: &Product) -> OrderDraft {
        self.drafts
            .get(&(product.item_no.clone(), index))
            .cloned()
            .unwrap_or_default()
    }

    /// Apply `edit` to the card's form.
    ///
    /// Returns the order slot update to apply, or `None` when the form is
    /// unticked and stays unticked.
    pub fn edit(
        &mut self,
        index: usize,
        product: &Product,
        edit: impl FnOnce(&mut OrderDraft),
    ) -> Option<Option<OrderEntry>> {
        let draft = self.drafts.entry((product.item_no.clone(), index)).or_default();
        let was_ordered = draft.ordered;
        edit(&mut *draft);

        (draft.ordered || was_ordered).then(|| draft.to_order(product))
    }

    /// Drop forms whose card no longer exists
    pub fn retain_current(&mut self, products: &[Product]) {
        self.drafts
            .retain(|(item_no, index), _| products.get(*index).is_some_and(|p| &p.item_no == item_no));
    }

    pub fn clear(&mut self) {
        self.drafts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(item_no: &str, qty: u32, price: f64) -> OrderEntry {
        OrderEntry {
            item_no: item_no.to_string(),
            order_qty: qty,
            customer_price: price,
            ..OrderEntry::default()
        }
    }

    fn item_nos(orders: &OrderCollection) -> Vec<&str> {
        orders.entries().iter().map(|e| e.item_no.as_str()).collect()
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut orders = OrderCollection::new();
        orders.set_order_at(0, Some(entry("A", 1, 1.0)));
        orders.set_order_at(1, Some(entry("B", 1, 1.0)));
        orders.set_order_at(0, Some(entry("A", 5, 1.0)));

        assert_eq!(item_nos(&orders), vec!["A", "B"]);
        assert_eq!(orders.entries()[0].order_qty, 5);
    }

    #[test]
    fn test_sparse_write_is_compacted() {
        let mut orders = OrderCollection::new();
        orders.set_order_at(3, Some(entry("D", 1, 1.0)));

        assert_eq!(orders.len(), 1);
        assert_eq!(item_nos(&orders), vec!["D"]);
    }

    #[test]
    fn test_clear_shifts_later_entries() {
        let mut orders = OrderCollection::new();
        for (i, id) in ["A", "B", "C"].into_iter().enumerate() {
            orders.set_order_at(i, Some(entry(id, 1, 1.0)));
        }

        orders.set_order_at(1, None);
        assert_eq!(item_nos(&orders), vec!["A", "C"]);

        // Out-of-range clear is a no-op
        orders.set_order_at(9, None);
        assert_eq!(orders.len(), 2);
    }

    #[test]
    fn test_total_order_value() {
        let mut orders = OrderCollection::new();
        assert_eq!(orders.total_order_value(), 0.0);

        orders.set_order_at(0, Some(entry("A", 2, 3.5)));
        orders.set_order_at(1, Some(entry("B", 10, 1.25)));
        assert_eq!(orders.total_order_value(), 19.5);

        orders.set_order_at(0, None);
        orders.set_order_at(0, None);
        assert!(orders.is_empty());
    }

    #[test]
    fn test_draft_to_order() {
        let product = Product {
            brand: "Acme".into(),
            item_no: "X1".into(),
            ..Product::blank()
        };
        let mut draft = OrderDraft {
            ordered: false,
            qty: "12".into(),
            price: "bad".into(),
            notes: "rush".into(),
        };
        assert_eq!(draft.to_order(&product), None);

        draft.ordered = true;
        let order = draft.to_order(&product).unwrap();
        assert_eq!(order.brand, "Acme");
        assert_eq!(order.item_no, "X1");
        assert_eq!(order.order_qty, 12);
        assert_eq!(order.customer_price, 0.0);
        assert_eq!(order.notes, "rush");
    }

    fn card(item_no: &str) -> Product {
        Product {
            item_no: item_no.into(),
            ..Product::blank()
        }
    }

    #[test]
    fn test_form_follows_item_no_and_position() {
        let products = vec![card("A"), card("B")];
        let mut forms = OrderForms::default();

        let update = forms.edit(1, &products[1], |d| d.ordered = true);
        assert_eq!(update.map(|o| o.map(|e| e.item_no)), Some(Some("B".to_string())));
        assert!(forms.draft(1, &products[1]).ordered);

        // Same position, different item: a fresh form
        assert!(!forms.draft(1, &card("C")).ordered);
        // Same item, different position: a fresh form
        assert!(!forms.draft(0, &products[1]).ordered);
    }

    #[test]
    fn test_unticked_form_leaves_orders_alone() {
        let product = card("A");
        let mut forms = OrderForms::default();

        assert_eq!(forms.edit(0, &product, |d| d.qty = "3".into()), None);
        forms.edit(0, &product, |d| d.ordered = true);
        assert_eq!(forms.edit(0, &product, |d| d.ordered = false), Some(None));
    }

    #[test]
    fn test_retain_current_drops_stale_forms() {
        let mut products = vec![card("A"), card("B")];
        let mut forms = OrderForms::default();
        forms.edit(1, &products[1], |d| d.ordered = true);

        products.remove(0);
        products.push(card(""));
        forms.retain_current(&products);

        assert!(!forms.draft(0, &products[0]).ordered);
        assert!(!forms.draft(1, &products[1]).ordered);
        assert!(forms.drafts.is_empty());

        forms.edit(0, &products[0], |d| d.ordered = true);
        forms.clear();
        assert!(!forms.draft(0, &products[0]).ordered);
    }
}
