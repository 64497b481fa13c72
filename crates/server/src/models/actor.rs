//! The caller resolved for one request.

use serde::{Deserialize, Serialize};

use roadcall_core::{Classification, CustomerId, Role};

use super::Customer;

/// The authenticated caller, stored in the session at login.
///
/// The role is derived from the two staff flags on demand so there is only
/// one place that combination logic lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentActor {
    pub customer_id: CustomerId,
    pub name: String,
    pub classification: Classification,
    pub administrator: bool,
    pub technician: bool,
}

impl CurrentActor {
    /// Resolved role for this request.
    #[must_use]
    pub const fn role(&self) -> Role {
        Role::resolve(true, self.administrator, self.technician)
    }
}

impl From<&Customer> for CurrentActor {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.id,
            name: customer.name.clone(),
            classification: customer.classification,
            administrator: customer.is_administrator,
            technician: customer.is_technician,
        }
    }
}
