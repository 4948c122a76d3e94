use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use shopfront_core::{CustomerId, DomainError, DomainResult, Entity};

use crate::customer::{Customer, RegisterCustomer};

/// Arena of customer records addressed by [`CustomerId`], one lock each.
#[derive(Debug, Default)]
pub struct CustomerAccounts {
    customers: BTreeMap<CustomerId, Mutex<Customer>>,
}

impl CustomerAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn insert(&mut self, customer: Customer) -> DomainResult<CustomerId> {
        let id = customer.id();
        if self.customers.contains_key(&id) {
            return Err(DomainError::validation(format!(
                "customer {id} already registered"
            )));
        }
        self.customers.insert(id, Mutex::new(customer));
        Ok(id)
    }

    pub fn register(&mut self, cmd: RegisterCustomer) -> DomainResult<CustomerId> {
        self.insert(Customer::register(cmd)?)
    }

    /// Point-in-time copy of a customer.
    pub fn get(&self, id: CustomerId) -> DomainResult<Customer> {
        Ok(self.lock(id)?.clone())
    }

    pub fn lock(&self, id: CustomerId) -> DomainResult<MutexGuard<'_, Customer>> {
        let cell = self
            .customers
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("customer {id}")))?;
        cell.lock()
            .map_err(|_| DomainError::invariant(format!("customer {id} lock poisoned")))
    }
}
