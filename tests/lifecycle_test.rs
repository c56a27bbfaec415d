//! Full order lifecycle over in-memory ports: place → vendor approves →
//! courier assigns → courier delivers, plus the concurrent-assignment race.
//! The in-memory repository mirrors the conditional-update semantics of the
//! Diesel implementation, so these tests exercise the same decision paths
//! the production wiring takes.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use delivery_order_service::application::order_service::OrderService;
use delivery_order_service::domain::errors::DomainError;
use delivery_order_service::domain::events::OrderEvent;
use delivery_order_service::domain::order::{
    Actor, Order, OrderItemInput, OrderItemView, OrderStatus, Role,
};
use delivery_order_service::domain::ports::{
    CourierDirectory, CourierStanding, NotificationDispatcher, OrderRepository,
};

#[derive(Default)]
struct InMemoryOrders {
    orders: Mutex<HashMap<Uuid, Order>>,
}

impl OrderRepository for InMemoryOrders {
    fn create(
        &self,
        customer_id: Uuid,
        vendor_id: Uuid,
        items: Vec<OrderItemInput>,
        total_price: BigDecimal,
    ) -> Result<Order, DomainError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            customer_id,
            vendor_id,
            courier_id: None,
            status: OrderStatus::PendingVendor,
            total_price,
            created_at: now,
            updated_at: now,
            items: items
                .into_iter()
                .map(|i| OrderItemView {
                    id: Uuid::new_v4(),
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
        };
        self.orders.lock().unwrap().insert(order.id, order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    fn transition_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get_mut(&id) {
            Some(o) if o.status == expected => {
                o.status = next;
                o.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn bind_courier(&self, id: Uuid, courier_id: Uuid) -> Result<bool, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get_mut(&id) {
            Some(o) if o.status == OrderStatus::Approved => {
                o.status = OrderStatus::EnRoute;
                o.courier_id = Some(courier_id);
                o.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn complete_delivery(&self, id: Uuid, courier_id: Uuid) -> Result<bool, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get_mut(&id) {
            Some(o) if o.status == OrderStatus::EnRoute && o.courier_id == Some(courier_id) => {
                o.status = OrderStatus::Delivered;
                o.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

struct StubCouriers {
    standings: HashMap<Uuid, CourierStanding>,
}

#[async_trait]
impl CourierDirectory for StubCouriers {
    async fn fetch_standing(
        &self,
        courier_id: Uuid,
    ) -> Result<Option<CourierStanding>, DomainError> {
        Ok(self.standings.get(&courier_id).copied())
    }
}

struct NullNotifier;

#[async_trait]
impl NotificationDispatcher for NullNotifier {
    async fn dispatch(&self, _event: &OrderEvent) -> Result<(), DomainError> {
        Ok(())
    }
}

fn service_with_couriers(standings: HashMap<Uuid, CourierStanding>) -> OrderService {
    OrderService::new(
        Arc::new(InMemoryOrders::default()),
        Arc::new(StubCouriers { standings }),
        Arc::new(NullNotifier),
    )
}

fn two_items() -> Vec<OrderItemInput> {
    vec![
        OrderItemInput {
            product_id: Uuid::new_v4(),
            quantity: 2,
            price: BigDecimal::from_str("10.00").unwrap(),
        },
        OrderItemInput {
            product_id: Uuid::new_v4(),
            quantity: 1,
            price: BigDecimal::from_str("5.00").unwrap(),
        },
    ]
}

#[tokio::test]
async fn order_travels_the_whole_lifecycle() {
    let courier_id = Uuid::new_v4();
    let mut standings = HashMap::new();
    standings.insert(courier_id, CourierStanding::Approved);
    let service = service_with_couriers(standings);

    let vendor = Actor {
        id: Uuid::new_v4(),
        role: Role::Vendor,
    };
    let courier = Actor {
        id: courier_id,
        role: Role::Courier,
    };

    // Place: 2 × $10 + 1 × $5.
    let order = service
        .create_order(Uuid::new_v4(), vendor.id, two_items())
        .await
        .unwrap();
    assert_eq!(order.total_price, BigDecimal::from_str("25.00").unwrap());
    assert_eq!(order.status, OrderStatus::PendingVendor);

    // Vendor approves.
    let order = service
        .apply_vendor_action(order.id, "approve", vendor)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Approved);

    // Eligible courier assigns.
    let order = service
        .assign_courier(order.id, courier_id, courier)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::EnRoute);
    assert_eq!(order.courier_id, Some(courier_id));

    // Same courier delivers.
    let order = service.mark_delivered(order.id, courier).await.unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);

    // A late assignment attempt bounces off the terminal state.
    let err = service
        .assign_courier(order.id, courier_id, courier)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_STATE");
}

#[tokio::test]
async fn concurrent_assignment_has_exactly_one_winner() {
    let courier_a = Uuid::new_v4();
    let courier_b = Uuid::new_v4();
    let mut standings = HashMap::new();
    standings.insert(courier_a, CourierStanding::Approved);
    standings.insert(courier_b, CourierStanding::Approved);
    let service = service_with_couriers(standings);

    let vendor = Actor {
        id: Uuid::new_v4(),
        role: Role::Vendor,
    };
    let order = service
        .create_order(Uuid::new_v4(), vendor.id, two_items())
        .await
        .unwrap();
    service
        .apply_vendor_action(order.id, "approve", vendor)
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        service.assign_courier(
            order.id,
            courier_a,
            Actor {
                id: courier_a,
                role: Role::Courier
            }
        ),
        service.assign_courier(
            order.id,
            courier_b,
            Actor {
                id: courier_b,
                role: Role::Courier
            }
        ),
    );

    let (winner, loser) = match (&a, &b) {
        (Ok(_), Err(_)) => (a.unwrap(), b.unwrap_err()),
        (Err(_), Ok(_)) => (b.unwrap(), a.unwrap_err()),
        other => panic!("expected exactly one winner, got {other:?}"),
    };
    assert_eq!(winner.status, OrderStatus::EnRoute);
    assert!(winner.courier_id.is_some());
    assert_eq!(loser.code(), "INVALID_STATE");
}

#[tokio::test]
async fn rejected_order_is_terminal() {
    let service = service_with_couriers(HashMap::new());
    let vendor = Actor {
        id: Uuid::new_v4(),
        role: Role::Vendor,
    };

    let order = service
        .create_order(Uuid::new_v4(), vendor.id, two_items())
        .await
        .unwrap();
    let order = service
        .apply_vendor_action(order.id, "reject", vendor)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Rejected);

    let err = service
        .apply_vendor_action(order.id, "approve", vendor)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_STATE");
}
