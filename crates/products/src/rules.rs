//! Product rule component.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use stockroom_core::validate::{require_not_future, require_positive, require_text};
use stockroom_core::{Clock, DomainError, DomainResult, ProductId, SystemClock, UserId};
use stockroom_users::rules::user_not_found;
use stockroom_users::{User, UserRepository};

use crate::filter::{ProductFilter, ProductSearch};
use crate::product::{NewProduct, Product, ProductChanges, ProductView};
use crate::repository::ProductRepository;

pub const NAME_REQUIRED: &str = "product name must not be empty";
pub const QUANTITY_NOT_POSITIVE: &str = "product quantity must be a positive integer";
pub const ENTRY_DATE_IN_FUTURE: &str = "entry date cannot be in the future";
pub const REGISTERING_USER_REQUIRED: &str = "the registering user must be specified";
pub const MODIFYING_USER_REQUIRED: &str = "the modifying user must be specified";
pub const ONLY_CREATOR_MAY_DELETE: &str = "only the user who registered the product can delete it";

fn product_not_found(id: ProductId) -> DomainError {
    DomainError::not_found(format!("product not found with id: {id}"))
}

fn name_taken(name: &str) -> DomainError {
    DomainError::conflict(format!("a product named '{name}' already exists"))
}

/// Fields that passed the shared create/update validator.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidatedFields {
    name: String,
    quantity: i64,
    entry_date: NaiveDate,
}

/// Shared validator: name, then quantity, then entry date. The first
/// violation wins.
fn validate_fields(
    name: Option<&str>,
    quantity: Option<i64>,
    entry_date: Option<NaiveDate>,
    today: NaiveDate,
) -> DomainResult<ValidatedFields> {
    let name = require_text(name, NAME_REQUIRED)?;
    let quantity = require_positive(quantity, QUANTITY_NOT_POSITIVE)?;
    let entry_date = require_not_future(entry_date, today, ENTRY_DATE_IN_FUTURE)?;
    Ok(ValidatedFields {
        name: name.to_owned(),
        quantity,
        entry_date,
    })
}

/// Stateless rule component for products.
///
/// Holds the product and user repositories; users are only ever resolved by
/// id through the repository, never held across calls.
#[derive(Clone)]
pub struct ProductRules<P, U> {
    products: P,
    users: U,
    clock: Arc<dyn Clock>,
}

impl<P, U> ProductRules<P, U>
where
    P: ProductRepository,
    U: UserRepository,
{
    pub fn new(products: P, users: U) -> Self {
        Self {
            products,
            users,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn create(&self, input: NewProduct) -> DomainResult<ProductView> {
        let fields = validate_fields(
            input.product_name.as_deref(),
            input.quantity,
            input.entry_date,
            self.clock.today(),
        )?;
        let user_id = input
            .registered_by_user_id
            .ok_or_else(|| DomainError::invalid_input(REGISTERING_USER_REQUIRED))?;

        if self.products.find_by_name(&fields.name).await?.is_some() {
            return Err(name_taken(&fields.name));
        }
        let registered_by = self.require_user(user_id).await?;

        let product = Product {
            id: ProductId::new(),
            name: fields.name,
            quantity: fields.quantity,
            entry_date: fields.entry_date,
            registered_by: registered_by.id,
            last_modified_by: None,
            last_modified_at: None,
        };
        let saved = self.products.save(product).await?;
        tracing::info!(product_id = %saved.id, user_id = %registered_by.id, "product created");
        self.project(saved).await
    }

    /// Full replacement of name/quantity/entry date, stamped with the
    /// modifying user and the current time. `registered_by` is kept.
    pub async fn update(&self, id: ProductId, changes: ProductChanges) -> DomainResult<ProductView> {
        let mut product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| product_not_found(id))?;

        let fields = validate_fields(
            changes.product_name.as_deref(),
            changes.quantity,
            changes.entry_date,
            self.clock.today(),
        )?;
        let user_id = changes
            .last_modified_by_user_id
            .ok_or_else(|| DomainError::invalid_input(MODIFYING_USER_REQUIRED))?;

        if fields.name != product.name {
            if let Some(other) = self.products.find_by_name(&fields.name).await? {
                if other.id != product.id {
                    return Err(name_taken(&fields.name));
                }
            }
        }
        let modified_by = self.require_user(user_id).await?;

        product.name = fields.name;
        product.quantity = fields.quantity;
        product.entry_date = fields.entry_date;
        product.last_modified_by = Some(modified_by.id);
        product.last_modified_at = Some(self.clock.now());

        let saved = self.products.save(product).await?;
        tracing::info!(product_id = %id, user_id = %modified_by.id, "product updated");
        self.project(saved).await
    }

    /// Delete a product on behalf of `requesting_user`, who must be the user
    /// that registered it.
    pub async fn delete(&self, id: ProductId, requesting_user: UserId) -> DomainResult<()> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| product_not_found(id))?;

        if !product.is_owned_by(requesting_user) {
            tracing::warn!(
                product_id = %id,
                requesting_user = %requesting_user,
                "delete rejected: requester did not register the product"
            );
            return Err(DomainError::unauthorized(ONLY_CREATOR_MAY_DELETE));
        }

        self.products.delete(&product).await?;
        tracing::info!(product_id = %id, user_id = %requesting_user, "product deleted");
        Ok(())
    }

    pub async fn get(&self, id: ProductId) -> DomainResult<ProductView> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| product_not_found(id))?;
        self.project(product).await
    }

    pub async fn list(&self) -> DomainResult<Vec<ProductView>> {
        let products = self.products.find_all().await?;
        self.project_all(products).await
    }

    /// Search by any non-empty combination of entry date, registering user
    /// and case-insensitive name substring.
    ///
    /// Exactly one repository query runs per call. A user criterion must
    /// resolve to an existing user before that query is issued.
    pub async fn search(&self, search: ProductSearch) -> DomainResult<Vec<ProductView>> {
        let filter = ProductFilter::from_search(search)?;
        if let Some(user_id) = filter.user_id() {
            self.require_user(user_id).await?;
        }
        tracing::debug!(filter = filter.label(), "product search");

        let products = match &filter {
            ProductFilter::EntryDate(date) => self.products.find_by_entry_date(*date).await?,
            ProductFilter::RegisteredBy(user) => self.products.find_by_registered_by(*user).await?,
            ProductFilter::NameContains(name) => self.products.find_by_name_containing(name).await?,
            ProductFilter::EntryDateAndRegisteredBy(date, user) => {
                self.products
                    .find_by_entry_date_and_registered_by(*date, *user)
                    .await?
            }
            ProductFilter::EntryDateAndNameContains(date, name) => {
                self.products
                    .find_by_entry_date_and_name_containing(*date, name)
                    .await?
            }
            ProductFilter::RegisteredByAndNameContains(user, name) => {
                self.products
                    .find_by_registered_by_and_name_containing(*user, name)
                    .await?
            }
            ProductFilter::EntryDateAndRegisteredByAndNameContains(date, user, name) => {
                self.products
                    .find_by_entry_date_and_registered_by_and_name_containing(*date, *user, name)
                    .await?
            }
        };

        self.project_all(products).await
    }

    async fn require_user(&self, id: UserId) -> DomainResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    async fn project(&self, product: Product) -> DomainResult<ProductView> {
        let mut names = HashMap::new();
        self.project_with(product, &mut names).await
    }

    async fn project_all(&self, products: Vec<Product>) -> DomainResult<Vec<ProductView>> {
        let mut names = HashMap::new();
        let mut views = Vec::with_capacity(products.len());
        for product in products {
            views.push(self.project_with(product, &mut names).await?);
        }
        Ok(views)
    }

    /// Resolve user references to display names, memoized per call.
    async fn project_with(
        &self,
        product: Product,
        names: &mut HashMap<UserId, Option<String>>,
    ) -> DomainResult<ProductView> {
        let registered_by_name = self.display_name(Some(product.registered_by), names).await?;
        let last_modified_by_name = self.display_name(product.last_modified_by, names).await?;

        Ok(ProductView {
            id: product.id,
            product_name: product.name,
            quantity: product.quantity,
            entry_date: product.entry_date,
            registered_by_name,
            last_modified_by_name,
            last_modification_date: product.last_modified_at,
        })
    }

    async fn display_name(
        &self,
        id: Option<UserId>,
        names: &mut HashMap<UserId, Option<String>>,
    ) -> DomainResult<Option<String>> {
        let Some(id) = id else {
            return Ok(None);
        };
        if let Some(cached) = names.get(&id) {
            return Ok(cached.clone());
        }
        let name = self.users.find_by_id(id).await?.map(|u| u.name);
        names.insert(id, name.clone());
        Ok(name)
    }
}
