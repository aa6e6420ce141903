//! Rule-level tests against the in-memory stores.
//!
//! Each test builds fresh repositories and pins the clock to 2024-06-01 so
//! "today" and "the future" are deterministic.

use std::sync::Arc;

use chrono::NaiveDate;

use stockroom_core::{Clock, FixedClock};
use stockroom_products::ProductRules;
use stockroom_users::{UserInput, UserRules, UserView};

use crate::store::{InMemoryProductRepository, InMemoryUserRepository};

mod products;

type Users = Arc<InMemoryUserRepository>;
type Products = Arc<InMemoryProductRepository>;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn today() -> NaiveDate {
    date(2024, 6, 1)
}

pub(crate) fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::at_date(today()))
}

pub(crate) fn user_rules() -> (UserRules<Users>, Users) {
    let repo = Arc::new(InMemoryUserRepository::new());
    (UserRules::new(repo.clone()).with_clock(clock()), repo)
}

pub(crate) struct Fixture {
    pub users: UserRules<Users>,
    pub products: ProductRules<Products, Users>,
    pub product_repo: Products,
}

pub(crate) fn fixture() -> Fixture {
    let user_repo = Arc::new(InMemoryUserRepository::new());
    let product_repo = Arc::new(InMemoryProductRepository::new());
    Fixture {
        users: UserRules::new(user_repo.clone()).with_clock(clock()),
        products: ProductRules::new(product_repo.clone(), user_repo).with_clock(clock()),
        product_repo,
    }
}

pub(crate) fn employee(name: &str) -> UserInput {
    UserInput {
        id: None,
        name: Some(name.to_string()),
        age: Some(30),
        position: Some("Clerk".to_string()),
        hire_date: Some(date(2020, 1, 1)),
    }
}

pub(crate) async fn hire(rules: &UserRules<Users>, name: &str) -> UserView {
    rules.create(employee(name)).await.unwrap()
}
