//! Customer provisioning saga.
//!
//! Creates the home address, the identity, and the profile row as one
//! logical unit. The three steps are strictly sequential because each
//! step's compensation depends on the previous step's success.

use sqlx::PgPool;
use tracing::instrument;

use roadcall_core::{Classification, CustomerId, Email, Phone, TempCredential};

use crate::db::{AddressRepository, CustomerRepository, RepositoryError};
use crate::identity::{IdentityClient, IdentityError, IdentityMetadata};
use crate::models::Customer;
use crate::services::saga::Saga;

/// Validated input for customer creation.
#[derive(Debug)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub classification: Classification,
    pub street_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Result of a successful provisioning run.
#[derive(Debug)]
pub struct ProvisionedCustomer {
    pub customer: Customer,
    /// Present only for the legacy self-service flow.
    pub temporary_credential: Option<TempCredential>,
    /// Set for staff-initiated accounts, which activate through the
    /// rate-limited messaging flow instead of a handed-over credential.
    pub needs_activation: bool,
}

/// Errors from the provisioning saga.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    /// The email is already registered with the identity provider.
    #[error("email already registered")]
    DuplicateEmail,

    /// Relational store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Identity provider failure.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The OS random source failed.
    #[error("credential generation failed: {0}")]
    Credential(String),
}

/// Customer provisioning service.
pub struct ProvisioningService<'a> {
    pool: &'a PgPool,
    identity: &'a IdentityClient,
}

impl<'a> ProvisioningService<'a> {
    /// Create a new provisioning service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, identity: &'a IdentityClient) -> Self {
        Self { pool, identity }
    }

    /// Run the provisioning saga.
    ///
    /// Steps, in order, each registering its compensation on success:
    ///
    /// 1. create the home address row
    /// 2. create the identity with a fresh temporary credential
    /// 3. create the profile row keyed by the identity id
    ///
    /// On failure, compensations for completed steps run in reverse order
    /// and the original error is returned. Callers must have already run
    /// the duplicate check for this email.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError::DuplicateEmail`] if the identity
    /// provider reports the email as taken (a duplicate slipped past the
    /// precheck), or the underlying collaborator error otherwise.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_customer(
        &self,
        input: NewCustomer,
        staff_initiated: bool,
    ) -> Result<ProvisionedCustomer, ProvisioningError> {
        // The credential comes from the OS RNG; drawing it up front keeps
        // every pre-write failure compensation-free.
        let credential = TempCredential::generate(&mut rand::rngs::OsRng)
            .map_err(|e| ProvisioningError::Credential(e.to_string()))?;

        let mut saga = Saga::new();

        // Step 1: home address
        let address = AddressRepository::new(self.pool)
            .create(&input.street_address, input.latitude, input.longitude)
            .await?;

        {
            let pool = self.pool.clone();
            let address_id = address.id;
            saga.push("delete provisioning address", async move {
                AddressRepository::new(&pool)
                    .delete(address_id)
                    .await
                    .map_err(Into::into)
            });
        }

        // Step 2: identity
        let metadata = IdentityMetadata {
            name: &input.name,
            phone: input.phone.as_str(),
        };
        let identity_record = match self
            .identity
            .create_identity(&input.email, credential.as_str(), metadata)
            .await
        {
            Ok(record) => record,
            Err(IdentityError::EmailTaken) => {
                saga.unwind().await;
                return Err(ProvisioningError::DuplicateEmail);
            }
            Err(error) => {
                saga.unwind().await;
                return Err(error.into());
            }
        };

        {
            let identity = self.identity.clone();
            let identity_id = identity_record.id;
            saga.push("delete provisioned identity", async move {
                identity
                    .delete_identity(identity_id)
                    .await
                    .map_err(Into::into)
            });
        }

        // Step 3: profile row keyed by the identity id
        let customer = match CustomerRepository::new(self.pool)
            .create(
                CustomerId::new(identity_record.id),
                &input.name,
                &input.phone,
                input.classification,
                address.id,
            )
            .await
        {
            Ok(customer) => customer,
            Err(error) => {
                saga.unwind().await;
                return Err(error.into());
            }
        };

        saga.commit();

        tracing::info!(customer_id = %customer.id, staff_initiated, "customer provisioned");

        Ok(ProvisionedCustomer {
            customer,
            temporary_credential: (!staff_initiated).then_some(credential),
            needs_activation: staff_initiated,
        })
    }
}
