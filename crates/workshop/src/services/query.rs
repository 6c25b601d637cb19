//! Listing queries over cached collections: filtering, sorting and the
//! dashboard summary.

use serde::{Deserialize, Serialize};

use santas_workshop_core::OrderStatus;

use crate::models::{Elf, Order, Toy};

/// Category filter value that matches every toy.
pub const ALL_CATEGORIES: &str = "all";

/// Status filter value that matches every order.
pub const ALL_STATUSES: &str = "All";

/// Static notices shown on the dashboard.
pub const NOTICES: [&str; 5] = [
    "Workshop will be closed on Dec 25th",
    "New toy delivery expected tomorrow",
    "Elf training session at 2 PM",
    "Remember to check stock levels daily",
    "Holiday bonus announced!",
];

/// Sort order for the toy list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToySort {
    /// Case-insensitive by name.
    #[default]
    Name,
    /// Easy, then Medium, then Hard.
    Difficulty,
}

/// Toy list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToyQuery {
    pub category: Option<String>,
    pub in_stock_only: bool,
    pub sort: ToySort,
}

impl ToyQuery {
    /// Filter and sort `toys`.
    #[must_use]
    pub fn apply(&self, toys: Vec<Toy>) -> Vec<Toy> {
        let category = self
            .category
            .as_deref()
            .filter(|category| *category != ALL_CATEGORIES);

        let mut toys: Vec<Toy> = toys
            .into_iter()
            .filter(|toy| category.is_none_or(|category| toy.category == category))
            .filter(|toy| !self.in_stock_only || toy.in_stock)
            .collect();

        match self.sort {
            ToySort::Name => toys.sort_by_cached_key(|toy| toy.name.to_lowercase()),
            ToySort::Difficulty => toys.sort_by_key(|toy| toy.difficulty.rank()),
        }
        toys
    }
}

/// Distinct toy categories in first-seen order.
#[must_use]
pub fn categories(toys: &[Toy]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for toy in toys {
        if !seen.contains(&toy.category) {
            seen.push(toy.category.clone());
        }
    }
    seen
}

/// Order list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderQuery {
    pub status: Option<String>,
}

impl OrderQuery {
    /// The status to filter on; `None` for "All" or no filter.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized value if it is neither "All" nor a status.
    pub fn status_filter(&self) -> Result<Option<OrderStatus>, String> {
        match self.status.as_deref() {
            None | Some(ALL_STATUSES) => Ok(None),
            Some(other) => other.parse().map(Some).map_err(|_| other.to_owned()),
        }
    }
}

/// Keep orders with the given status.
#[must_use]
pub fn filter_orders(orders: Vec<Order>, status: Option<OrderStatus>) -> Vec<Order> {
    match status {
        None => orders,
        Some(status) => orders
            .into_iter()
            .filter(|order| order.status == status)
            .collect(),
    }
}

/// Summary counts for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_toys: usize,
    pub total_orders: usize,
    pub pending_orders: usize,
    pub total_elves: usize,
    pub active_elves: usize,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(toys: &[Toy], orders: &[Order], elves: &[Elf]) -> Self {
        Self {
            total_toys: toys.len(),
            total_orders: orders.len(),
            pending_orders: orders
                .iter()
                .filter(|order| order.status == OrderStatus::Pending)
                .count(),
            total_elves: elves.len(),
            active_elves: elves.iter().filter(|elf| elf.energy.value() > 0).count(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use santas_workshop_core::{Difficulty, ElfId, Energy, OrderId, Priority, ToyId};

    use super::*;

    fn toy(name: &str, category: &str, difficulty: Difficulty, in_stock: bool) -> Toy {
        Toy {
            id: ToyId::new(name),
            name: name.to_string(),
            category: category.to_string(),
            difficulty,
            in_stock,
        }
    }

    fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new("o"),
            child_name: "Mia".to_string(),
            country: "Norway".to_string(),
            toy_id: ToyId::new("t1"),
            priority: Priority::Normal,
            status,
            created_at: None,
            user_id: None,
            session_id: None,
        }
    }

    fn elf(energy: i64) -> Elf {
        Elf {
            id: ElfId::new("e"),
            name: "Buddy".to_string(),
            role: "Builder".to_string(),
            energy: Energy::clamped(energy),
        }
    }

    fn catalogue() -> Vec<Toy> {
        vec![
            toy("robot", "Tech", Difficulty::Hard, true),
            toy("Ball", "Sports", Difficulty::Easy, false),
            toy("drone", "Tech", Difficulty::Medium, true),
            toy("Yo-yo", "Classic", Difficulty::Easy, true),
        ]
    }

    fn names(toys: &[Toy]) -> Vec<&str> {
        toys.iter().map(|toy| toy.name.as_str()).collect()
    }

    #[test]
    fn test_default_query_sorts_by_name_case_insensitively() {
        let toys = ToyQuery::default().apply(catalogue());
        assert_eq!(names(&toys), vec!["Ball", "drone", "robot", "Yo-yo"]);
    }

    #[test]
    fn test_category_and_stock_filters() {
        let query = ToyQuery {
            category: Some("Tech".to_string()),
            in_stock_only: true,
            sort: ToySort::Difficulty,
        };
        assert_eq!(names(&query.apply(catalogue())), vec!["drone", "robot"]);

        let query = ToyQuery {
            category: Some(ALL_CATEGORIES.to_string()),
            in_stock_only: true,
            ..ToyQuery::default()
        };
        assert_eq!(query.apply(catalogue()).len(), 3);
    }

    #[test]
    fn test_categories_keep_first_seen_order() {
        assert_eq!(categories(&catalogue()), vec!["Tech", "Sports", "Classic"]);
    }

    #[test]
    fn test_status_filter() {
        let all = OrderQuery {
            status: Some("All".to_string()),
        };
        assert_eq!(all.status_filter().unwrap(), None);

        let shipped = OrderQuery {
            status: Some("Shipped".to_string()),
        };
        let status = shipped.status_filter().unwrap();
        let orders = vec![order(OrderStatus::Pending), order(OrderStatus::Shipped)];
        assert_eq!(filter_orders(orders, status).len(), 1);

        let bogus = OrderQuery {
            status: Some("Lost".to_string()),
        };
        assert_eq!(bogus.status_filter().unwrap_err(), "Lost");
    }

    #[test]
    fn test_dashboard_stats() {
        let orders = vec![
            order(OrderStatus::Pending),
            order(OrderStatus::Pending),
            order(OrderStatus::Delivered),
        ];
        let elves = vec![elf(0), elf(40), elf(100)];
        let stats = DashboardStats::compute(&catalogue(), &orders, &elves);
        assert_eq!(
            stats,
            DashboardStats {
                total_toys: 4,
                total_orders: 3,
                pending_orders: 2,
                total_elves: 3,
                active_elves: 2,
            }
        );
    }
}
