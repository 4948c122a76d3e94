use serde::{Deserialize, Serialize};

use shopfront_core::{CustomerId, DomainError, DomainResult, Entity, Money};

/// Customer with a spendable balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    name: String,
    balance: Money,
}

/// Command: RegisterCustomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCustomer {
    pub customer_id: CustomerId,
    pub name: String,
    pub opening_balance: Money,
}

impl Customer {
    pub fn register(cmd: RegisterCustomer) -> DomainResult<Self> {
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id: cmd.customer_id,
            name: cmd.name,
            balance: cmd.opening_balance,
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn can_afford(&self, amount: Money) -> bool {
        amount <= self.balance
    }

    /// Debit the balance. Fails, leaving the balance untouched, if `amount`
    /// exceeds it.
    pub fn deduct_balance(&mut self, amount: Money) -> DomainResult<()> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(DomainError::InsufficientBalance)?;
        Ok(())
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> CustomerId {
        self.id
    }
}
