//! Order aggregation — groups completed ERP orders per customer.

use campaign_core::types::Order;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

/// Completed orders of a single customer, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerAggregate {
    pub customer_id: String,
    pub orders: Vec<Order>,
    pub total_spend: Decimal,
    pub completed_orders: u32,
}

impl CustomerAggregate {
    fn new(customer_id: String) -> Self {
        Self {
            customer_id,
            orders: Vec::new(),
            total_spend: Decimal::ZERO,
            completed_orders: 0,
        }
    }

    fn push(&mut self, order: Order) {
        self.total_spend += order.total_amount;
        self.completed_orders += 1;
        self.orders.push(order);
    }

    pub fn first_order(&self) -> Option<&Order> {
        self.orders.first()
    }

    pub fn last_order(&self) -> Option<&Order> {
        self.orders.last()
    }

    /// Whole days between the first and last completed order, never below 1.
    pub fn date_range_days(&self) -> i64 {
        match (self.first_order(), self.last_order()) {
            (Some(first), Some(last)) => (last.order_date - first.order_date).num_days().max(1),
            _ => 1,
        }
    }
}

/// Stateless aggregator over a batch of orders.
pub struct OrderAggregator;

impl OrderAggregator {
    /// Drop non-completed orders and group the rest by customer id.
    ///
    /// Customers without a completed order do not appear in the result.
    pub fn aggregate(orders: &[Order]) -> BTreeMap<String, CustomerAggregate> {
        let mut aggregates: BTreeMap<String, CustomerAggregate> = BTreeMap::new();
        let mut skipped = 0usize;

        for order in orders {
            if !order.is_completed() {
                skipped += 1;
                continue;
            }
            aggregates
                .entry(order.customer_id.clone())
                .or_insert_with(|| CustomerAggregate::new(order.customer_id.clone()))
                .push(order.clone());
        }

        for aggregate in aggregates.values_mut() {
            aggregate.orders.sort_by_key(|o| o.order_date);
        }

        debug!(
            orders = orders.len(),
            skipped_non_completed = skipped,
            customers = aggregates.len(),
            "Orders aggregated by customer"
        );

        aggregates
    }
}
