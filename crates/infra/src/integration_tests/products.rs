use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use stockroom_core::{DomainError, ProductId, StoreResult, UserId};
use stockroom_products::rules::{
    ENTRY_DATE_IN_FUTURE, NAME_REQUIRED, ONLY_CREATOR_MAY_DELETE, QUANTITY_NOT_POSITIVE,
    REGISTERING_USER_REQUIRED,
};
use stockroom_products::{
    NewProduct, Product, ProductChanges, ProductRepository, ProductRules, ProductSearch, ProductView,
};
use stockroom_users::UserRules;
use stockroom_users::rules::user_not_found;

use super::{Fixture, clock, date, fixture, hire, today};
use crate::store::{InMemoryProductRepository, InMemoryUserRepository};

fn new_product(name: &str, quantity: i64, entry_date: NaiveDate, owner: UserId) -> NewProduct {
    NewProduct {
        product_name: Some(name.to_string()),
        quantity: Some(quantity),
        entry_date: Some(entry_date),
        registered_by_user_id: Some(owner),
    }
}

async fn register(fx: &Fixture, name: &str, entry_date: NaiveDate, owner: UserId) -> ProductView {
    fx.products
        .create(new_product(name, 5, entry_date, owner))
        .await
        .unwrap()
}

fn names(views: Vec<ProductView>) -> Vec<String> {
    views.into_iter().map(|v| v.product_name).collect()
}

#[tokio::test]
async fn created_product_projects_the_registering_user() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;

    let created = register(&fx, "Widget", date(2024, 1, 1), alice.id).await;
    assert_eq!(created.product_name, "Widget");
    assert_eq!(created.quantity, 5);
    assert_eq!(created.registered_by_name.as_deref(), Some("Alice"));
    assert_eq!(created.last_modified_by_name, None);
    assert_eq!(created.last_modification_date, None);

    assert_eq!(fx.products.get(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn duplicate_product_name_is_a_conflict() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    register(&fx, "Widget", date(2024, 1, 1), alice.id).await;

    let err = fx
        .products
        .create(new_product("Widget", 9, date(2024, 2, 1), alice.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(fx.product_repo.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn product_names_differing_only_in_case_are_distinct() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    register(&fx, "Widget", date(2024, 1, 1), alice.id).await;

    let upper = fx
        .products
        .create(new_product("WIDGET", 2, date(2024, 1, 1), alice.id))
        .await
        .unwrap();
    assert_eq!(upper.product_name, "WIDGET");
    assert_eq!(names(fx.products.list().await.unwrap()), vec!["Widget", "WIDGET"]);
}

#[tokio::test]
async fn invalid_create_persists_nothing() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    let tomorrow = today().succ_opt().unwrap();

    let cases = [
        (new_product(" ", 1, date(2024, 1, 1), alice.id), NAME_REQUIRED),
        (new_product("Widget", 0, date(2024, 1, 1), alice.id), QUANTITY_NOT_POSITIVE),
        (new_product("Widget", 1, tomorrow, alice.id), ENTRY_DATE_IN_FUTURE),
        (
            NewProduct {
                registered_by_user_id: None,
                ..new_product("Widget", 1, date(2024, 1, 1), alice.id)
            },
            REGISTERING_USER_REQUIRED,
        ),
    ];

    for (input, message) in cases {
        let err = fx.products.create(input).await.unwrap_err();
        assert_eq!(err, DomainError::invalid_input(message));
    }
    assert!(fx.product_repo.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_registering_user_is_not_found() {
    let fx = fixture();
    let ghost = UserId::new();
    let err = fx
        .products
        .create(new_product("Widget", 1, date(2024, 1, 1), ghost))
        .await
        .unwrap_err();
    assert_eq!(err, user_not_found(ghost));
    assert!(fx.product_repo.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_registering_user_may_delete() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    let bob = hire(&fx.users, "Bob").await;
    let widget = register(&fx, "Widget", date(2024, 1, 1), alice.id).await;

    let err = fx.products.delete(widget.id, bob.id).await.unwrap_err();
    assert_eq!(err, DomainError::unauthorized(ONLY_CREATOR_MAY_DELETE));
    assert!(fx.products.get(widget.id).await.is_ok());

    fx.products.delete(widget.id, alice.id).await.unwrap();
    assert!(matches!(
        fx.products.get(widget.id).await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn deleting_a_missing_product_is_not_found() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    let err = fx.products.delete(ProductId::new(), alice.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn update_stamps_modifier_and_time_and_keeps_registrant() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    let bob = hire(&fx.users, "Bob").await;
    let widget = register(&fx, "Widget", date(2024, 1, 1), alice.id).await;

    let updated = fx
        .products
        .update(
            widget.id,
            ProductChanges {
                product_name: Some("Widget Pro".to_string()),
                quantity: Some(12),
                entry_date: Some(date(2024, 2, 1)),
                last_modified_by_user_id: Some(bob.id),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.product_name, "Widget Pro");
    assert_eq!(updated.quantity, 12);
    assert_eq!(updated.entry_date, date(2024, 2, 1));
    assert_eq!(updated.registered_by_name.as_deref(), Some("Alice"));
    assert_eq!(updated.last_modified_by_name.as_deref(), Some("Bob"));
    assert_eq!(updated.last_modification_date, Some(clock().now()));

    // Registrant is still the only one allowed to delete.
    assert!(matches!(
        fx.products.delete(widget.id, bob.id).await,
        Err(DomainError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn update_requires_every_field() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    let widget = register(&fx, "Widget", date(2024, 1, 1), alice.id).await;

    let err = fx
        .products
        .update(
            widget.id,
            ProductChanges {
                product_name: Some("Widget".to_string()),
                quantity: None,
                entry_date: Some(date(2024, 1, 1)),
                last_modified_by_user_id: Some(alice.id),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::invalid_input(QUANTITY_NOT_POSITIVE));
    assert_eq!(fx.products.get(widget.id).await.unwrap(), widget);
}

#[tokio::test]
async fn rename_onto_another_product_is_a_conflict() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    let widget = register(&fx, "Widget", date(2024, 1, 1), alice.id).await;
    register(&fx, "Gadget", date(2024, 1, 1), alice.id).await;

    let err = fx
        .products
        .update(
            widget.id,
            ProductChanges {
                product_name: Some("Gadget".to_string()),
                quantity: Some(1),
                entry_date: Some(date(2024, 1, 1)),
                last_modified_by_user_id: Some(alice.id),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn update_of_missing_product_is_not_found() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    let err = fx
        .products
        .update(
            ProductId::new(),
            ProductChanges {
                product_name: Some("Widget".to_string()),
                quantity: Some(1),
                entry_date: Some(date(2024, 1, 1)),
                last_modified_by_user_id: Some(alice.id),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn search_without_criteria_is_invalid_input() {
    let fx = fixture();
    let err = fx.products.search(ProductSearch::default()).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[tokio::test]
async fn search_by_entry_date() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    register(&fx, "Widget", date(2024, 1, 1), alice.id).await;
    register(&fx, "Gadget", date(2024, 1, 2), alice.id).await;
    register(&fx, "Sprocket", date(2024, 1, 1), alice.id).await;

    let found = fx
        .products
        .search(ProductSearch {
            entry_date: Some(date(2024, 1, 1)),
            ..ProductSearch::default()
        })
        .await
        .unwrap();
    assert_eq!(names(found), vec!["Widget", "Sprocket"]);
}

#[tokio::test]
async fn search_by_user_and_name_fragment() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    let bob = hire(&fx.users, "Bob").await;
    register(&fx, "Widget", date(2024, 1, 1), alice.id).await;
    register(&fx, "Big WIDGET", date(2024, 1, 3), alice.id).await;
    register(&fx, "Widget Mini", date(2024, 1, 1), bob.id).await;
    register(&fx, "Gadget", date(2024, 1, 1), alice.id).await;

    let found = fx
        .products
        .search(ProductSearch {
            user_id: Some(alice.id),
            product_name: Some("wid".to_string()),
            ..ProductSearch::default()
        })
        .await
        .unwrap();
    assert_eq!(names(found), vec!["Widget", "Big WIDGET"]);
}

#[tokio::test]
async fn search_with_all_three_criteria() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    register(&fx, "Widget", date(2024, 1, 1), alice.id).await;
    register(&fx, "Big Widget", date(2024, 1, 3), alice.id).await;

    let found = fx
        .products
        .search(ProductSearch {
            entry_date: Some(date(2024, 1, 3)),
            user_id: Some(alice.id),
            product_name: Some("widget".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(names(found), vec!["Big Widget"]);
}

#[tokio::test]
async fn search_for_unknown_user_is_not_found() {
    let fx = fixture();
    let err = fx
        .products
        .search(ProductSearch {
            user_id: Some(UserId::new()),
            ..ProductSearch::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn removed_user_projects_as_no_name() {
    let fx = fixture();
    let alice = hire(&fx.users, "Alice").await;
    let widget = register(&fx, "Widget", date(2024, 1, 1), alice.id).await;

    fx.users.delete(alice.id).await.unwrap();

    let view = fx.products.get(widget.id).await.unwrap();
    assert_eq!(view.registered_by_name, None);
    assert_eq!(names(fx.products.list().await.unwrap()), vec!["Widget"]);
}

/// Product store that counts every call made to it.
#[derive(Default)]
struct CountingProducts {
    inner: InMemoryProductRepository,
    calls: AtomicUsize,
}

impl CountingProducts {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn take_calls(&self) -> usize {
        self.calls.swap(0, Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductRepository for CountingProducts {
    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        self.hit();
        self.inner.find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        self.hit();
        self.inner.find_by_name(name).await
    }

    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool> {
        self.hit();
        self.inner.exists_by_id(id).await
    }

    async fn save(&self, product: Product) -> StoreResult<Product> {
        self.hit();
        self.inner.save(product).await
    }

    async fn delete_by_id(&self, id: ProductId) -> StoreResult<()> {
        self.hit();
        self.inner.delete_by_id(id).await
    }

    async fn delete(&self, product: &Product) -> StoreResult<()> {
        self.hit();
        self.inner.delete(product).await
    }

    async fn find_by_entry_date(&self, entry_date: NaiveDate) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner.find_by_entry_date(entry_date).await
    }

    async fn find_by_registered_by(&self, user_id: UserId) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner.find_by_registered_by(user_id).await
    }

    async fn find_by_name_containing(&self, name: &str) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner.find_by_name_containing(name).await
    }

    async fn find_by_entry_date_and_registered_by(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
    ) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner
            .find_by_entry_date_and_registered_by(entry_date, user_id)
            .await
    }

    async fn find_by_entry_date_and_name_containing(
        &self,
        entry_date: NaiveDate,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner
            .find_by_entry_date_and_name_containing(entry_date, name)
            .await
    }

    async fn find_by_registered_by_and_name_containing(
        &self,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner
            .find_by_registered_by_and_name_containing(user_id, name)
            .await
    }

    async fn find_by_entry_date_and_registered_by_and_name_containing(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner
            .find_by_entry_date_and_registered_by_and_name_containing(entry_date, user_id, name)
            .await
    }
}

#[tokio::test]
async fn every_filter_combination_issues_one_store_query() {
    let user_repo = Arc::new(InMemoryUserRepository::new());
    let product_repo = Arc::new(CountingProducts::default());
    let users = UserRules::new(user_repo.clone()).with_clock(clock());
    let products = ProductRules::new(product_repo.clone(), user_repo).with_clock(clock());

    let alice = hire(&users, "Alice").await;
    let bob = hire(&users, "Bob").await;
    let jan_first = date(2024, 1, 1);
    let jan_third = date(2024, 1, 3);
    for (name, entry_date, owner) in [
        ("Widget", jan_first, alice.id),
        ("Big WIDGET", jan_third, alice.id),
        ("Gadget", jan_first, alice.id),
        ("Widget Mini", jan_first, bob.id),
        ("Sprocket", jan_third, bob.id),
    ] {
        products
            .create(new_product(name, 1, entry_date, owner))
            .await
            .unwrap();
    }

    // Bit 0: entry date, bit 1: user, bit 2: name fragment.
    let expected: [(u8, &[&str]); 7] = [
        (0b001, &["Widget", "Gadget", "Widget Mini"]),
        (0b010, &["Widget", "Big WIDGET", "Gadget"]),
        (0b011, &["Widget", "Gadget"]),
        (0b100, &["Widget", "Big WIDGET", "Widget Mini"]),
        (0b101, &["Widget", "Widget Mini"]),
        (0b110, &["Widget", "Big WIDGET"]),
        (0b111, &["Widget"]),
    ];

    for (mask, want) in expected {
        let search = ProductSearch {
            entry_date: (mask & 0b001 != 0).then_some(jan_first),
            user_id: (mask & 0b010 != 0).then_some(alice.id),
            product_name: (mask & 0b100 != 0).then(|| "wid".to_string()),
        };
        product_repo.take_calls();

        let found = products.search(search).await.unwrap();

        assert_eq!(product_repo.take_calls(), 1, "filter mask {mask:03b}");
        assert_eq!(names(found), want, "filter mask {mask:03b}");
    }
}
