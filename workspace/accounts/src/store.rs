//! The account store: every read and write against users and role records.

use std::fmt;

use chrono::{NaiveDate, Utc};
use model::entities::company::ServiceCategory;
use model::entities::{company, customer, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, error, info, instrument, trace, warn};
use validator::Validate;

use crate::error::{AccountsError, FormErrors, Result};
use crate::password;

/// Values for a new identity record. `password_hash` must already be hashed.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_customer: bool,
    pub is_company: bool,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("is_customer", &self.is_customer)
            .field("is_company", &self.is_company)
            .finish_non_exhaustive()
    }
}

/// Values for a company profile attached to an existing user.
#[derive(Debug, Clone, Validate)]
pub struct NewCompany {
    pub field: ServiceCategory,
    #[validate(range(min = 0, max = 5, message = "Ensure this value is between 0 and 5."))]
    pub rating: i32,
}

/// A customer row together with its owning user.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerProfile {
    pub user: user::Model,
    pub customer: customer::Model,
}

impl fmt::Display for CustomerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user.username)
    }
}

/// A company row together with its owning user.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProfile {
    pub user: user::Model,
    pub company: company::Model,
}

impl fmt::Display for CompanyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.user.id, self.user.username)
    }
}

/// Persistent users, customers and companies.
#[derive(Debug, Clone)]
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Starts a transaction. Dropping it without commit rolls back.
    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        trace!("Beginning database transaction");
        Ok(self.db.begin().await?)
    }

    #[instrument(skip(self))]
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn find_user(&self, user_id: i32) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        debug!("Retrieved {} users from database", users.len());
        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn customer_profile(&self, user_id: i32) -> Result<Option<CustomerProfile>> {
        let found = customer::Entity::find_by_id(user_id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?;
        Ok(found.and_then(|(customer, user)| user.map(|user| CustomerProfile { user, customer })))
    }

    #[instrument(skip(self))]
    pub async fn company_profile(&self, user_id: i32) -> Result<Option<CompanyProfile>> {
        let found = company::Entity::find_by_id(user_id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?;
        Ok(found.and_then(|(company, user)| user.map(|user| CompanyProfile { user, company })))
    }

    /// Attaches a company profile to an existing user. Does not touch the
    /// user's role flags.
    #[instrument(skip(self))]
    pub async fn create_company(&self, user_id: i32, new_company: NewCompany) -> Result<CompanyProfile> {
        trace!("Entering create_company for user_id: {}", user_id);
        if let Err(errors) = new_company.validate() {
            warn!("Rejected company profile for user {}", user_id);
            return Err(AccountsError::Validation(FormErrors::from(errors)));
        }

        let Some(owner) = self.find_user(user_id).await? else {
            warn!("User with ID {} not found for company profile", user_id);
            return Err(AccountsError::NotFound(format!("user {}", user_id)));
        };

        let company = company::ActiveModel {
            user_id: Set(owner.id),
            field: Set(new_company.field),
            rating: Set(new_company.rating),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            error!("Failed to create company profile for user {}: {}", user_id, e);
            e
        })?;

        info!(
            "Company profile created for user {} ({})",
            owner.id,
            company.field.label()
        );
        Ok(CompanyProfile {
            user: owner,
            company,
        })
    }

    /// Deletes a user. Role records go with it through the cascading
    /// foreign keys. Returns whether a row was removed.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: i32) -> Result<bool> {
        let result = user::Entity::delete_by_id(user_id).exec(&self.db).await?;
        debug!("Delete operation completed. Rows affected: {}", result.rows_affected);
        if result.rows_affected > 0 {
            info!("User with ID {} deleted", user_id);
            Ok(true)
        } else {
            warn!("User with ID {} not found for deletion", user_id);
            Ok(false)
        }
    }

    /// Stamps `last_login` with the current time.
    #[instrument(skip(self))]
    pub async fn record_login(&self, user_id: i32) -> Result<user::Model> {
        let Some(existing) = self.find_user(user_id).await? else {
            return Err(AccountsError::NotFound(format!("user {}", user_id)));
        };
        let mut active: user::ActiveModel = existing.into();
        active.last_login = Set(Some(Utc::now()));
        Ok(active.update(&self.db).await?)
    }

    /// Returns the active account matching the credentials, or `None`.
    /// Unknown email, wrong password and inactive account are not told apart.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<user::Model>> {
        trace!("Authenticating credentials");
        let Some(user) = self.find_user_by_email(email).await? else {
            // Same hashing cost as the wrong-password path.
            password::hash_password(password).ok();
            debug!("No account for the given email");
            return Ok(None);
        };

        if !password::verify_password(password, &user.password) {
            debug!("Password mismatch for user {}", user.id);
            return Ok(None);
        }
        if !user.is_active {
            debug!("User {} is inactive", user.id);
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Inserts a user on `conn`, which may be a transaction.
    pub async fn insert_user<C: ConnectionTrait>(conn: &C, new_user: NewUser) -> Result<user::Model> {
        trace!("Inserting user {}", new_user.username);
        let model = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password: Set(new_user.password_hash),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            is_company: Set(new_user.is_company),
            is_customer: Set(new_user.is_customer),
            is_active: Set(true),
            is_staff: Set(false),
            is_superuser: Set(false),
            date_joined: Set(Utc::now()),
            last_login: Set(None),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(model)
    }

    /// Inserts the customer row owned by `user_id` on `conn`.
    pub async fn insert_customer<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        date_of_birth: Option<NaiveDate>,
    ) -> Result<customer::Model> {
        trace!("Inserting customer profile for user {}", user_id);
        let model = customer::ActiveModel {
            user_id: Set(user_id),
            address: Set(None),
            phone_number: Set(None),
            date_of_birth: Set(date_of_birth),
        }
        .insert(conn)
        .await?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{insert_user, setup_store, PASSWORD};

    #[tokio::test]
    async fn test_authenticate() {
        let store = setup_store().await;
        let user = insert_user(&store, "alice", "a@x.com").await;

        let found = store.authenticate("a@x.com", PASSWORD).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        assert!(store.authenticate("a@x.com", "wrong").await.unwrap().is_none());
        assert!(store.authenticate("nobody@x.com", PASSWORD).await.unwrap().is_none());
        assert!(store.authenticate("A@X.COM", PASSWORD).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_authenticate() {
        let store = setup_store().await;
        let user = insert_user(&store, "alice", "a@x.com").await;

        let mut active: user::ActiveModel = user.into();
        active.is_active = Set(false);
        active.update(store.connection()).await.unwrap();

        assert!(store.authenticate("a@x.com", PASSWORD).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_company_profile() {
        let store = setup_store().await;
        let user = insert_user(&store, "acme", "acme@x.com").await;

        let profile = store
            .create_company(
                user.id,
                NewCompany {
                    field: ServiceCategory::WaterHeaters,
                    rating: 5,
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.company.rating, 5);
        assert_eq!(profile.to_string(), format!("{} - acme", user.id));

        let reloaded = store.company_profile(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.company.field, ServiceCategory::WaterHeaters);
        // Attaching a profile leaves the role flags alone
        assert!(!reloaded.user.is_company);
    }

    #[tokio::test]
    async fn test_create_company_rejects_out_of_range_rating() {
        let store = setup_store().await;
        let user = insert_user(&store, "acme", "acme@x.com").await;

        for rating in [-1, 6] {
            let error = store
                .create_company(
                    user.id,
                    NewCompany {
                        field: ServiceCategory::Carpentry,
                        rating,
                    },
                )
                .await
                .unwrap_err();
            assert!(error.form_errors().unwrap().has_errors("rating"));
        }
        assert!(store.company_profile(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_company_for_missing_user() {
        let store = setup_store().await;
        let error = store
            .create_company(
                999,
                NewCompany {
                    field: ServiceCategory::Locks,
                    rating: 0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(error, AccountsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user_removes_role_records() {
        let store = setup_store().await;
        let user = insert_user(&store, "bob", "bob@x.com").await;
        AccountStore::insert_customer(store.connection(), user.id, None)
            .await
            .unwrap();

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(store.customer_profile(user.id).await.unwrap().is_none());
        assert!(!store.delete_user(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_record_login() {
        let store = setup_store().await;
        let user = insert_user(&store, "alice", "a@x.com").await;
        assert!(user.last_login.is_none());

        let updated = store.record_login(user.id).await.unwrap();
        assert!(updated.last_login.is_some());
    }
}
